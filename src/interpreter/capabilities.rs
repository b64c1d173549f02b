//! Web and display builtins
//!
//! These bind the `flask_*` family (and their plain-English aliases) to
//! [`crate::web`] and the window builtins to [`crate::ui::PixelWindow`].
//! Arguments are coerced the same loose way the core builtins coerce them:
//! anything shown as text is accepted where text is expected.

use crate::interpreter::builtins::{to_float, to_int, Builtin};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::expressions::EvalError;
use crate::memory::value::Value;
use crate::ui::window::{DEFAULT_PIXEL_SIZE, DEFAULT_TITLE};
use crate::web::fetch::{fetch_json, fetch_text, FetchRequest, DEFAULT_TIMEOUT_SECS};
use crate::web::server::{serve, Request};
use crate::web::{dispatch, Page, WebApp, WebResponse, DEFAULT_APP_TITLE, DEFAULT_HOST, DEFAULT_PORT};
use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;

const NOT_AN_APP: &str = "That value is not a Flask app. Create one with 'call flask_app'.";

fn failed(message: impl Into<String>) -> EvalError {
    EvalError::Failed(message.into())
}

fn as_app(value: &Value) -> Result<Rc<RefCell<WebApp>>, EvalError> {
    match value {
        Value::App(app) => Ok(Rc::clone(app)),
        _ => Err(failed(NOT_AN_APP)),
    }
}

/// Text form of an optional argument, or the default
fn text_or(args: &[Value], index: usize, default: &str) -> String {
    args.get(index)
        .map(Value::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn int_or(args: &[Value], index: usize, default: i64) -> Result<i64, EvalError> {
    args.get(index).map_or(Ok(default), to_int)
}

impl Interpreter {
    /// Dispatch a web or display builtin. Arity was checked by the caller.
    pub(crate) fn call_capability(
        &mut self,
        builtin: Builtin,
        args: &[Value],
        line: usize,
    ) -> Result<Value, EvalError> {
        match builtin {
            Builtin::WebApp => {
                let title = text_or(args, 0, DEFAULT_APP_TITLE);
                Ok(Value::App(Rc::new(RefCell::new(WebApp::new(title)))))
            }
            Builtin::WebGet | Builtin::WebPost => {
                let app = as_app(&args[0])?;
                let method = if builtin == Builtin::WebGet { "GET" } else { "POST" };
                app.borrow_mut()
                    .add_route(method, &args[1].to_string(), args[2].clone())
                    .map_err(failed)?;
                Ok(Value::Bool(true))
            }
            Builtin::WebRun => {
                let app = as_app(&args[0])?;
                let host = text_or(args, 1, DEFAULT_HOST);
                let port = int_or(args, 2, DEFAULT_PORT)?;
                self.run_web_server(&app, &host, port, line)
            }
            Builtin::WebTestRequest => {
                let app = as_app(&args[0])?;
                let method = text_or(args, 1, "GET").trim().to_uppercase();
                let path = text_or(args, 2, "/");
                let response = self.dispatch_request(&app, &method, &path, line);
                Ok(Value::Text(response.body))
            }
            Builtin::WebHtml => {
                let status = int_or(args, 1, 200)?;
                let status = u16::try_from(status)
                    .ok()
                    .filter(|code| (100..=599).contains(code))
                    .ok_or_else(|| failed(format!("{} is not a valid HTTP status code.", status)))?;
                Ok(Value::Page(Rc::new(Page {
                    html: args[0].to_string(),
                    status,
                })))
            }
            Builtin::WebFetch => {
                let request = fetch_request(args)?;
                fetch_text(&self.agent, &request).map(Value::Text).map_err(failed)
            }
            Builtin::WebFetchJson => {
                let request = fetch_request(args)?;
                fetch_json(&self.agent, &request).map_err(failed)
            }
            _ => self.call_display(builtin, args),
        }
    }

    fn call_display(&mut self, builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
        use Builtin::*;
        let window = &mut self.window;
        let done = |result: Result<(), String>| result.map(|_| Value::Nothing).map_err(failed);
        match builtin {
            OpenWindow => {
                let (width, height) = (to_int(&args[0])?, to_int(&args[1])?);
                let title = text_or(args, 2, DEFAULT_TITLE);
                let pixel_size = int_or(args, 3, DEFAULT_PIXEL_SIZE)?;
                let background = text_or(args, 4, "black");
                window
                    .open(width, height, &title, pixel_size, &background)
                    .map(Value::Bool)
                    .map_err(failed)
            }
            CloseWindow => {
                window.close();
                Ok(Value::Nothing)
            }
            WindowIsOpen => Ok(Value::Bool(window.is_open())),
            PollWindow => Ok(Value::Bool(window.poll())),
            Present => {
                window.present();
                Ok(Value::Nothing)
            }
            ClearScreen => {
                let background = text_or(args, 0, "black");
                done(window.clear(Some(background.as_str())))
            }
            DrawPixel => {
                let (x, y) = (to_int(&args[0])?, to_int(&args[1])?);
                done(window.draw_pixel(x, y, &text_or(args, 2, "white")))
            }
            DrawRect => {
                let (x, y) = (to_int(&args[0])?, to_int(&args[1])?);
                let (w, h) = (to_int(&args[2])?, to_int(&args[3])?);
                done(window.draw_rect(x, y, w, h, &text_or(args, 4, "white")))
            }
            DrawText => {
                let (x, y) = (to_int(&args[0])?, to_int(&args[1])?);
                let color = text_or(args, 3, "white");
                let size = int_or(args, 4, 12)?;
                done(window.draw_text(x, y, &args[2].to_string(), &color, size))
            }
            KeyDown => Ok(Value::Bool(window.key_down(&args[0].to_string()))),
            KeyPressed => Ok(Value::Bool(window.key_pressed(&args[0].to_string()))),
            SetWindowTitle => done(window.set_title(&args[0].to_string())),
            other => Err(failed(format!("'{}' is not a display function", other.name()))),
        }
    }

    /// Route one request through `app`, running callable handlers with no
    /// arguments.
    pub(crate) fn dispatch_request(
        &mut self,
        app: &RefCell<WebApp>,
        method: &str,
        target: &str,
        line: usize,
    ) -> WebResponse {
        dispatch(app, method, target, |handler| {
            self.call_value(handler, Vec::new(), line)
                .map_err(|err| err.to_string())
        })
    }

    /// Serve `app` until the configured request limit, logging each request
    /// to the console.
    fn run_web_server(
        &mut self,
        app: &Rc<RefCell<WebApp>>,
        host: &str,
        port: i64,
        line: usize,
    ) -> Result<Value, EvalError> {
        let port = u16::try_from(port).map_err(|_| failed(format!("{} is not a valid port.", port)))?;
        let listener = TcpListener::bind((host, port))
            .map_err(|e| failed(format!("I couldn't start the web server on {}:{}: {}", host, port, e)))?;
        let base = format!("http://{}:{}", host, port);

        if self.settings.verbose {
            eprintln!("Serving {} routes at {}", app.borrow().route_count(), base);
        }
        self.console.write_line(&format!("successful {}", base));

        let limit = self.settings.request_limit;
        serve(&listener, limit, |request: &Request| {
            let response = self.dispatch_request(app, &request.method, &request.target, line);
            self.console.write_line(&format!(
                "request {} {}{} -> {}",
                request.method, base, request.target, response.status
            ));
            response
        })
        .map_err(|e| failed(format!("the web server stopped: {}", e)))?;

        Ok(Value::Bool(true))
    }
}

/// `(url, method?, body?, headers?, timeout?)`
fn fetch_request(args: &[Value]) -> Result<FetchRequest, EvalError> {
    let mut request = FetchRequest::get(args[0].to_string());
    request.method = text_or(args, 1, "GET");
    request.body = args.get(2).cloned().unwrap_or(Value::Nothing);
    request.headers = args.get(3).cloned().unwrap_or(Value::Nothing);
    request.timeout_secs = args.get(4).map_or(Ok(DEFAULT_TIMEOUT_SECS), to_float)?;
    Ok(request)
}
