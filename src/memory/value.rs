//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of values an E++
//! program can hold.
//!
//! # Value Types
//!
//! - [`Value::Int`] / [`Value::Float`]: numbers; ints are promoted to floats
//!   only when an operation yields a fraction
//! - [`Value::Text`], [`Value::Bool`], [`Value::Nothing`]
//! - [`Value::List`]: ordered and mutable, shared by reference like the
//!   language's own lists
//! - [`Value::Map`]: string-keyed record produced by JSON and `{...}` literals
//! - [`Value::Function`] / [`Value::Builtin`]: callables
//! - [`Value::App`] / [`Value::Page`]: web capability carriers
//!
//! # Display
//!
//! `say` prints the display form. Inside containers text is quoted, so
//! `["a", 1]` prints exactly like that.

use crate::interpreter::builtins::Builtin;
use crate::parser::ast::Statement;
use crate::web::{Page, WebApp};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable list storage
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// A user-defined function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub line: usize,
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    #[default]
    Nothing,
    List(ListRef),
    Map(Rc<IndexMap<String, Value>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    App(Rc<RefCell<WebApp>>),
    Page(Rc<Page>),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Wrap items in a fresh list
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Value::Map(Rc::new(entries))
    }

    /// Name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "number",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Nothing => "nothing",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) | Value::Builtin(_) => "function",
            Value::App(_) => "website",
            Value::Page(_) => "web page",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Nothing => false,
            Value::List(items) => !items.borrow().is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            _ => true,
        }
    }

    /// Numeric view; booleans count as 0 and 1
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer view for ints and booleans only
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    /// Form used for values nested in lists and maps
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, &mut Vec::new());
        out
    }

    /// A container already on `open` prints as `[...]` or `{...}`.
    fn write_repr(&self, out: &mut String, open: &mut Vec<*const ()>) {
        match self {
            Value::Text(s) => out.push_str(&quote(s)),
            Value::List(items) => {
                let ptr = Rc::as_ptr(items) as *const ();
                if open.contains(&ptr) {
                    out.push_str("[...]");
                    return;
                }
                open.push(ptr);
                out.push('[');
                for (index, item) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out, open);
                }
                out.push(']');
                open.pop();
            }
            Value::Map(entries) => {
                let ptr = Rc::as_ptr(entries) as *const ();
                if open.contains(&ptr) {
                    out.push_str("{...}");
                    return;
                }
                open.push(ptr);
                out.push('{');
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quote(key));
                    out.push_str(": ");
                    item.write_repr(out, open);
                }
                out.push('}');
                open.pop();
            }
            other => out.push_str(&other.to_string()),
        }
    }

    /// Structural equality. A pair of containers already being compared
    /// counts as equal, so self-containing lists terminate.
    fn equals(&self, other: &Value, open: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());
                if open.contains(&pair) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }
                open.push(pair);
                let same = a.iter().zip(b.iter()).all(|(x, y)| x.equals(y, open));
                open.pop();
                same
            }
            (Value::Map(a), Value::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ());
                if open.contains(&pair) {
                    return true;
                }
                if a.len() != b.len() {
                    return false;
                }
                open.push(pair);
                let same = a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| x.equals(y, open)));
                open.pop();
                same
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Nothing, Value::Nothing) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => a.as_f64() == b.as_f64(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::App(a), Value::App(b)) => Rc::ptr_eq(a, b),
            (Value::Page(a), Value::Page(b)) => a == b,
            _ => false,
        }
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Shortest round-trip float text. Plain notation for exponents from -4
/// up to 15, `1e+16` style outside that range, `.0` kept on whole values.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if value == 0.0 || (-4..16).contains(&exponent) {
        let plain = format!("{}", value);
        return if plain.contains('.') { plain } else { format!("{}.0", plain) };
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nothing => write!(f, "nothing"),
            Value::List(_) | Value::Map(_) => f.write_str(&self.repr()),
            Value::Function(func) => write!(f, "<function {}>", func.name),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
            Value::App(app) => write!(f, "<website {}>", app.borrow().title()),
            Value::Page(page) => write!(f, "{}", page.html),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
