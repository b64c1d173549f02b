//! Web capability: route tables, HTTP serving and network fetch
//!
//! - [`WebApp`]: GET/POST route tables keyed by normalized path
//! - [`WebResponse`]: the status, content type and body sent back
//! - [`server`]: a one-request-at-a-time HTTP/1.1 loop over `TcpListener`
//! - [`fetch`]: outbound requests through a `ureq` agent
//!
//! Route handlers are plain values. A callable handler is invoked with no
//! arguments and its result is converted with [`WebResponse::from_value`].

pub mod fetch;
pub mod server;

use crate::memory::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_APP_TITLE: &str = "E++ App";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 5000;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json; charset=utf-8";

const HTML_MARKERS: &[&str] = &[
    "<html", "<head", "<body", "<div", "<span", "<h1", "<h2", "<p", "<a", "<main", "<section",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An html body with its own status, made by `make_html_page`
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub html: String,
    pub status: u16,
}

#[derive(Debug)]
pub struct WebApp {
    title: String,
    get_routes: IndexMap<String, Value>,
    post_routes: IndexMap<String, Value>,
}

impl WebApp {
    pub fn new(title: impl Into<String>) -> Self {
        WebApp {
            title: title.into(),
            get_routes: IndexMap::new(),
            post_routes: IndexMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Register (or replace) the handler for `method path`
    pub fn add_route(&mut self, method: &str, path: &str, handler: Value) -> Result<(), String> {
        let method = Method::parse(method).ok_or_else(|| {
            format!("Unsupported HTTP method '{}'. Use GET or POST.", method)
        })?;
        let path = normalize_path(path);
        self.routes_mut(method).insert(path, handler);
        Ok(())
    }

    /// Handler for a request target; the query string is ignored
    pub fn handler_for(&self, method: &str, target: &str) -> Option<Value> {
        let method = Method::parse(method)?;
        let path = target.split(['?', '#']).next().unwrap_or_default();
        let path = if path.is_empty() { "/" } else { path };
        self.routes(method).get(path).cloned()
    }

    pub fn route_count(&self) -> usize {
        self.get_routes.len() + self.post_routes.len()
    }

    fn routes(&self, method: Method) -> &IndexMap<String, Value> {
        match method {
            Method::Get => &self.get_routes,
            Method::Post => &self.post_routes,
        }
    }

    fn routes_mut(&mut self, method: Method) -> &mut IndexMap<String, Value> {
        match method {
            Method::Get => &mut self.get_routes,
            Method::Post => &mut self.post_routes,
        }
    }
}

/// Leading `/` added; empty becomes `/`
pub fn normalize_path(path: &str) -> String {
    let text = path.trim();
    if text.is_empty() {
        "/".to_string()
    } else if text.starts_with('/') {
        text.to_string()
    } else {
        format!("/{}", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl WebResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        WebResponse {
            status,
            content_type: TEXT_PLAIN.to_string(),
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    /// Convert a handler result into a response
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Page(page) => Ok(WebResponse {
                status: page.status,
                content_type: TEXT_HTML.to_string(),
                body: page.html.clone(),
            }),
            Value::List(_) | Value::Map(_) => {
                let json = value_to_json(value)?;
                Ok(WebResponse {
                    status: 200,
                    content_type: APPLICATION_JSON.to_string(),
                    body: json.to_string(),
                })
            }
            other => {
                let body = other.to_string();
                let content_type = if looks_like_html(&body) {
                    TEXT_HTML
                } else {
                    TEXT_PLAIN
                };
                Ok(WebResponse {
                    status: 200,
                    content_type: content_type.to_string(),
                    body,
                })
            }
        }
    }
}

pub fn looks_like_html(text: &str) -> bool {
    let stripped = text.trim_start().to_lowercase();
    if stripped.starts_with("<!doctype html") {
        return true;
    }
    HTML_MARKERS.iter().any(|marker| stripped.starts_with(marker))
}

/// Route one request. `invoke` runs callable handlers.
pub fn dispatch<F>(app: &RefCell<WebApp>, method: &str, target: &str, invoke: F) -> WebResponse
where
    F: FnOnce(&Value) -> Result<Value, String>,
{
    // Release the borrow before running user code, which may add routes
    let handler = app.borrow().handler_for(method, target);
    let Some(handler) = handler else {
        return WebResponse::not_found();
    };

    let result = if handler.is_callable() {
        match invoke(&handler) {
            Ok(value) => value,
            Err(message) => {
                return WebResponse::text(500, format!("Route handler failed: {}", message))
            }
        }
    } else {
        handler
    };

    WebResponse::from_value(&result)
        .unwrap_or_else(|message| WebResponse::text(500, format!("Route response failed: {}", message)))
}

pub fn value_to_json(value: &Value) -> Result<serde_json::Value, String> {
    to_json(value, &mut Vec::new())
}

/// `open` holds the containers currently being converted.
fn to_json(value: &Value, open: &mut Vec<*const ()>) -> Result<serde_json::Value, String> {
    match value {
        Value::Nothing => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(n) => Ok(serde_json::Value::Number((*n).into())),
        Value::Float(x) => Ok(serde_json::Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)),
        Value::Text(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Page(page) => Ok(serde_json::Value::String(page.html.clone())),
        Value::List(items) => {
            let ptr = Rc::as_ptr(items) as *const ();
            enter(open, ptr)?;
            let array = items
                .borrow()
                .iter()
                .map(|item| to_json(item, open))
                .collect::<Result<Vec<_>, _>>();
            open.pop();
            array.map(serde_json::Value::Array)
        }
        Value::Map(entries) => {
            let ptr = Rc::as_ptr(entries) as *const ();
            enter(open, ptr)?;
            let mut object = serde_json::Map::new();
            for (key, item) in entries.iter() {
                match to_json(item, open) {
                    Ok(json) => {
                        object.insert(key.clone(), json);
                    }
                    Err(message) => {
                        open.pop();
                        return Err(message);
                    }
                }
            }
            open.pop();
            Ok(serde_json::Value::Object(object))
        }
        other => Err(format!("a {} can't be turned into JSON", other.type_name())),
    }
}

fn enter(open: &mut Vec<*const ()>, ptr: *const ()) -> Result<(), String> {
    if open.contains(&ptr) {
        return Err("a list or map that contains itself can't be turned into JSON".to_string());
    }
    open.push(ptr);
    Ok(())
}
