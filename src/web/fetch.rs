//! Outbound HTTP through a shared `ureq` agent

use crate::memory::value::Value;
use crate::web::value_to_json;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::time::Duration;
use ureq::Agent;

pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

const HEADERS_HINT: &str = "Headers must be a dictionary like {\"Authorization\": \"Bearer ...\"}.";

/// One outbound request as the fetch builtins describe it
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    pub body: Value,
    pub headers: Value,
    pub timeout_secs: f64,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        FetchRequest {
            url: url.into(),
            method: "GET".to_string(),
            body: Value::Nothing,
            headers: Value::Nothing,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Perform the request and return the response text
pub fn fetch_text(agent: &Agent, request: &FetchRequest) -> Result<String, String> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err("Please provide a URL to fetch.".to_string());
    }
    let method = match request.method.trim().to_ascii_uppercase() {
        m if m.is_empty() => "GET".to_string(),
        m => m,
    };
    if !(request.timeout_secs.is_finite() && request.timeout_secs > 0.0) {
        return Err("The timeout must be a positive number of seconds.".to_string());
    }

    let mut headers = header_pairs(&request.headers)?;
    let payload = match &request.body {
        Value::Nothing => None,
        body @ (Value::List(_) | Value::Map(_)) => {
            if !headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            {
                headers.push((
                    "Content-Type".to_string(),
                    "application/json; charset=utf-8".to_string(),
                ));
            }
            Some(value_to_json(body)?.to_string())
        }
        other => Some(other.to_string()),
    };

    let mut outbound = agent
        .request(&method, url)
        .timeout(Duration::from_secs_f64(request.timeout_secs));
    for (name, value) in &headers {
        outbound = outbound.set(name, value);
    }

    let result = match payload {
        Some(body) => outbound.send_string(&body),
        None => outbound.call(),
    };

    match result {
        Ok(response) => response
            .into_string()
            .map_err(|e| format!("API request failed: {}", e)),
        Err(ureq::Error::Status(code, response)) => {
            let detail = response.into_string().unwrap_or_default();
            Err(format!("API request failed with HTTP {}: {}", code, detail))
        }
        Err(ureq::Error::Transport(transport)) => Err(format!("API request failed: {}", transport)),
    }
}

/// Perform the request and decode the response as JSON
pub fn fetch_json(agent: &Agent, request: &FetchRequest) -> Result<Value, String> {
    let text = fetch_text(agent, request)?;
    let json: JsonValue = serde_json::from_str(&text)
        .map_err(|_| "The API response was not valid JSON.".to_string())?;
    Ok(json_to_value(&json))
}

fn header_pairs(headers: &Value) -> Result<Vec<(String, String)>, String> {
    match headers {
        Value::Nothing => Ok(Vec::new()),
        Value::Map(entries) => Ok(entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()),
        _ => Err(HEADERS_HINT.to_string()),
    }
}

pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Nothing,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(num) => {
            if let Some(i) = num.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(num.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => Value::list(items.iter().map(json_to_value).collect()),
        JsonValue::Object(map) => {
            let mut entries = IndexMap::new();
            for (key, item) in map {
                entries.insert(key.clone(), json_to_value(item));
            }
            Value::map(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::server::serve;
    use crate::web::WebResponse;
    use std::net::TcpListener;
    use std::thread;

    fn stub_server(status: u16, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/data", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            serve(&listener, Some(1), |_| WebResponse::text(status, body)).unwrap();
        });
        (url, handle)
    }

    #[test]
    fn test_fetch_text() {
        let (url, server) = stub_server(200, "plain-response");
        let text = fetch_text(&Agent::new(), &FetchRequest::get(url)).unwrap();
        server.join().unwrap();
        assert_eq!(text, "plain-response");
    }

    #[test]
    fn test_fetch_json_decodes_objects() {
        let (url, server) = stub_server(200, "{\"status\": \"ok\", \"count\": 2}");
        let value = fetch_json(&Agent::new(), &FetchRequest::get(url)).unwrap();
        server.join().unwrap();
        assert_eq!(value.to_string(), "{\"count\": 2, \"status\": \"ok\"}");
    }

    #[test]
    fn test_http_errors_carry_status_and_detail() {
        let (url, server) = stub_server(404, "missing");
        let err = fetch_text(&Agent::new(), &FetchRequest::get(url)).unwrap_err();
        server.join().unwrap();
        assert_eq!(err, "API request failed with HTTP 404: missing");
    }

    #[test]
    fn test_invalid_json() {
        let (url, server) = stub_server(200, "not json");
        let err = fetch_json(&Agent::new(), &FetchRequest::get(url)).unwrap_err();
        server.join().unwrap();
        assert_eq!(err, "The API response was not valid JSON.");
    }

    #[test]
    fn test_argument_validation() {
        let agent = Agent::new();
        assert_eq!(
            fetch_text(&agent, &FetchRequest::get("  ")),
            Err("Please provide a URL to fetch.".to_string())
        );
        let mut request = FetchRequest::get("http://127.0.0.1:1/");
        request.headers = Value::text("Bearer x");
        assert_eq!(fetch_text(&agent, &request), Err(HEADERS_HINT.to_string()));
    }
}
