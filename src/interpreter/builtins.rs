//! Built-in function registry and core implementations
//!
//! Builtins are consulted after user bindings, so a script may shadow any
//! of them. Several have a second, plain-English alias (`create_web_app`
//! for `flask_app`, ...); both names map to the same [`Builtin`].
//!
//! # Supported Built-ins
//!
//! - Core: `len str int float bool range list abs min max sum round sorted`
//! - Randomness and time: `random random_int random_float choice sleep`
//! - Web and display: see [`crate::interpreter::capabilities`]
//!
//! Failures are reported as [`EvalError::Failed`] with a plain message; the
//! caller decides how to frame it for the user.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::EvalError;
use crate::interpreter::ops::binary::{add, compare};
use crate::interpreter::ops::OpError;
use crate::memory::value::Value;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::time::Duration;

/// Largest list `range` will build
const MAX_RANGE_LEN: i64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Str,
    Int,
    Float,
    Bool,
    Range,
    List,
    Abs,
    Min,
    Max,
    Sum,
    Round,
    Sorted,
    Random,
    RandomInt,
    RandomFloat,
    Choice,
    Sleep,
    WebApp,
    WebGet,
    WebPost,
    WebRun,
    WebTestRequest,
    WebHtml,
    WebFetch,
    WebFetchJson,
    OpenWindow,
    CloseWindow,
    WindowIsOpen,
    PollWindow,
    Present,
    ClearScreen,
    DrawPixel,
    DrawRect,
    DrawText,
    KeyDown,
    KeyPressed,
    SetWindowTitle,
}

/// Every builtin name; the first entry for a builtin is its canonical name.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("len", Builtin::Len),
    ("str", Builtin::Str),
    ("int", Builtin::Int),
    ("float", Builtin::Float),
    ("bool", Builtin::Bool),
    ("range", Builtin::Range),
    ("list", Builtin::List),
    ("abs", Builtin::Abs),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("sum", Builtin::Sum),
    ("round", Builtin::Round),
    ("sorted", Builtin::Sorted),
    ("random", Builtin::Random),
    ("random_int", Builtin::RandomInt),
    ("random_float", Builtin::RandomFloat),
    ("choice", Builtin::Choice),
    ("sleep", Builtin::Sleep),
    ("flask_app", Builtin::WebApp),
    ("flask_get", Builtin::WebGet),
    ("flask_post", Builtin::WebPost),
    ("flask_run", Builtin::WebRun),
    ("flask_test_request", Builtin::WebTestRequest),
    ("flask_html", Builtin::WebHtml),
    ("flask_fetch", Builtin::WebFetch),
    ("flask_fetch_json", Builtin::WebFetchJson),
    ("create_web_app", Builtin::WebApp),
    ("when_someone_visits", Builtin::WebGet),
    ("when_someone_posts", Builtin::WebPost),
    ("start_web_server", Builtin::WebRun),
    ("test_web_request", Builtin::WebTestRequest),
    ("make_html_page", Builtin::WebHtml),
    ("fetch_from_api", Builtin::WebFetch),
    ("fetch_json_from_api", Builtin::WebFetchJson),
    ("open_window", Builtin::OpenWindow),
    ("close_window", Builtin::CloseWindow),
    ("window_is_open", Builtin::WindowIsOpen),
    ("window_open", Builtin::WindowIsOpen),
    ("poll_window", Builtin::PollWindow),
    ("present", Builtin::Present),
    ("clear_screen", Builtin::ClearScreen),
    ("draw_pixel", Builtin::DrawPixel),
    ("draw_rect", Builtin::DrawRect),
    ("draw_text", Builtin::DrawText),
    ("key_down", Builtin::KeyDown),
    ("key_pressed", Builtin::KeyPressed),
    ("set_window_title", Builtin::SetWindowTitle),
];

/// Accepted argument counts, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means no upper bound
    pub max: Option<usize>,
}

impl Arity {
    const fn exact(count: usize) -> Self {
        Arity {
            min: count,
            max: Some(count),
        }
    }

    const fn range(min: usize, max: usize) -> Self {
        Arity {
            min,
            max: Some(max),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    pub fn describe(&self) -> String {
        match self.max {
            Some(max) if max == self.min => max.to_string(),
            Some(max) => format!("{} to {}", self.min, max),
            None => format!("at least {}", self.min),
        }
    }
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, builtin)| *builtin)
    }

    /// All registered names, aliases included
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTINS.iter().map(|(name, _)| *name)
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, builtin)| builtin == self)
            .map(|(name, _)| *name)
            .unwrap_or("builtin")
    }

    pub fn arity(&self) -> Arity {
        use Builtin::*;
        match self {
            Len | Abs | Sorted | Choice | Sleep => Arity::exact(1),
            Str | Int | Float | Bool | List => Arity::range(0, 1),
            Range => Arity::range(1, 3),
            Min | Max => Arity { min: 1, max: None },
            Sum | Round => Arity::range(1, 2),
            Random => Arity::range(0, 2),
            RandomInt | RandomFloat => Arity::exact(2),
            WebApp => Arity::range(0, 1),
            WebGet | WebPost => Arity::exact(3),
            WebRun => Arity::range(1, 3),
            WebTestRequest => Arity::range(1, 4),
            WebHtml => Arity::range(1, 2),
            WebFetch | WebFetchJson => Arity::range(1, 5),
            OpenWindow => Arity::range(2, 5),
            CloseWindow | WindowIsOpen | PollWindow | Present => Arity::exact(0),
            ClearScreen => Arity::range(0, 1),
            DrawPixel => Arity::range(2, 3),
            DrawRect => Arity::range(4, 5),
            DrawText => Arity::range(3, 5),
            KeyDown | KeyPressed | SetWindowTitle => Arity::exact(1),
        }
    }
}

impl Interpreter {
    /// Invoke a builtin with evaluated arguments. `name` is the spelling
    /// the script used, for messages.
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        name: &str,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, EvalError> {
        let arity = builtin.arity();
        if !arity.accepts(args.len()) {
            return Err(EvalError::Runtime(RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: arity.describe(),
                got: args.len(),
                line,
            }));
        }

        use Builtin::*;
        match builtin {
            Len => builtin_len(&args[0]),
            Str => Ok(Value::Text(args.first().map(Value::to_string).unwrap_or_default())),
            Int => args.first().map_or(Ok(0), to_int).map(Value::Int),
            Float => args.first().map_or(Ok(0.0), to_float).map(Value::Float),
            Bool => Ok(Value::Bool(args.first().is_some_and(Value::is_truthy))),
            Range => builtin_range(&args),
            List => match args.first() {
                Some(value) => items_of(value).map(Value::list),
                None => Ok(Value::list(Vec::new())),
            },
            Abs => builtin_abs(&args[0]),
            Min => extreme(&args, Ordering::Less, "min"),
            Max => extreme(&args, Ordering::Greater, "max"),
            Sum => builtin_sum(&args),
            Round => builtin_round(&args),
            Sorted => builtin_sorted(&args[0]),
            Random => builtin_random(&args),
            RandomInt => builtin_random_int(&args[0], &args[1]),
            RandomFloat => {
                let (a, b) = (to_float(&args[0])?, to_float(&args[1])?);
                Ok(Value::Float(a + (b - a) * rand::thread_rng().gen::<f64>()))
            }
            Choice => builtin_choice(&args[0]),
            Sleep => builtin_sleep(&args[0]),
            _ => self.call_capability(builtin, &args, line),
        }
    }
}

fn failed(message: impl Into<String>) -> EvalError {
    EvalError::Failed(message.into())
}

/// `int(...)` coercion: truncates floats, parses text
pub(crate) fn to_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Float(x) if x.is_finite() => Ok(x.trunc() as i64),
        Value::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| failed(format!("I can't turn '{}' into a whole number.", text))),
        other => other
            .as_i64()
            .ok_or_else(|| failed(format!("I can't turn {} into a whole number.", other.repr()))),
    }
}

/// `float(...)` coercion
pub(crate) fn to_float(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| failed(format!("I can't turn '{}' into a number.", text))),
        other => other
            .as_f64()
            .ok_or_else(|| failed(format!("I can't turn {} into a number.", other.repr()))),
    }
}

/// The elements a value yields when iterated
pub(crate) fn items_of(value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items.borrow().clone()),
        Value::Text(text) => Ok(text.chars().map(|c| Value::Text(c.to_string())).collect()),
        Value::Map(entries) => Ok(entries.keys().map(|k| Value::Text(k.clone())).collect()),
        other => Err(failed(format!("a {} can't be looped over", other.type_name()))),
    }
}

fn builtin_len(value: &Value) -> Result<Value, EvalError> {
    let len = match value {
        Value::Text(text) => text.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Map(entries) => entries.len(),
        other => return Err(failed(format!("a {} has no length", other.type_name()))),
    };
    Ok(Value::Int(len as i64))
}

fn whole(value: &Value, what: &str) -> Result<i64, EvalError> {
    value
        .as_i64()
        .ok_or_else(|| failed(format!("{} needs whole numbers, not {}", what, value.type_name())))
}

fn builtin_range(args: &[Value]) -> Result<Value, EvalError> {
    let numbers = args
        .iter()
        .map(|arg| whole(arg, "range"))
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(failed("range needs 1 to 3 numbers")),
    };
    if step == 0 {
        return Err(failed("range step must not be zero"));
    }

    let span = if step > 0 {
        stop.saturating_sub(start)
    } else {
        start.saturating_sub(stop)
    };
    let count = if span <= 0 {
        0
    } else {
        (span - 1) / step.saturating_abs() + 1
    };
    if count > MAX_RANGE_LEN {
        return Err(failed("that range is too large"));
    }

    let items = (0..count).map(|i| Value::Int(start + i * step)).collect();
    Ok(Value::list(items))
}

fn builtin_abs(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Float(x) => Ok(Value::Float(x.abs())),
        other => {
            let n = whole(other, "abs")?;
            n.checked_abs()
                .map(Value::Int)
                .ok_or_else(|| failed("the number is too large"))
        }
    }
}

/// `min`/`max`: one iterable argument or several values
fn extreme(args: &[Value], wanted: Ordering, what: &str) -> Result<Value, EvalError> {
    let items = if args.len() == 1 {
        items_of(&args[0])?
    } else {
        args.to_vec()
    };
    let mut best: Option<Value> = None;
    for item in items {
        best = Some(match best {
            None => item,
            Some(current) => {
                if compare(what, &item, &current)? == wanted {
                    item
                } else {
                    current
                }
            }
        });
    }
    best.ok_or_else(|| failed(format!("{}() of an empty list", what)))
}

fn builtin_sum(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = args.get(1).cloned().unwrap_or(Value::Int(0));
    for item in items_of(&args[0])? {
        total = add(&total, &item)?;
    }
    Ok(total)
}

fn builtin_round(args: &[Value]) -> Result<Value, EvalError> {
    let value = &args[0];
    let digits = args.get(1).map(|d| whole(d, "round")).transpose()?;

    if let Some(n) = value.as_i64() {
        return match digits {
            Some(d) if d < 0 => {
                let scale = 10f64.powi(d.unsigned_abs().min(18) as i32);
                Ok(Value::Int(((n as f64 / scale).round_ties_even() * scale) as i64))
            }
            _ => Ok(Value::Int(n)),
        };
    }

    let x = to_float(value)?;
    match digits {
        None => {
            if !x.is_finite() {
                return Err(failed(format!("I can't round {}", value)));
            }
            Ok(Value::Int(x.round_ties_even() as i64))
        }
        Some(d) => {
            let scale = 10f64.powi(d.clamp(-308, 308) as i32);
            Ok(Value::Float((x * scale).round_ties_even() / scale))
        }
    }
}

fn builtin_sorted(value: &Value) -> Result<Value, EvalError> {
    let mut items = items_of(value)?;
    let mut failure: Option<OpError> = None;
    items.sort_by(|a, b| {
        compare("<", a, b).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(Value::list(items)),
    }
}

/// `random()` is a float in `[0, 1)`; `random(a, b)` picks between the
/// bounds in either order, whole numbers when both are whole.
fn builtin_random(args: &[Value]) -> Result<Value, EvalError> {
    let mut rng = rand::thread_rng();
    match args {
        [] => Ok(Value::Float(rng.gen::<f64>())),
        [low, high] => {
            if let (Some(a), Some(b)) = (low.as_i64(), high.as_i64()) {
                return Ok(Value::Int(rng.gen_range(a.min(b)..=a.max(b))));
            }
            let (a, b) = (to_float(low)?, to_float(high)?);
            let (a, b) = if a > b { (b, a) } else { (a, b) };
            Ok(Value::Float(a + (b - a) * rng.gen::<f64>()))
        }
        _ => Err(failed("random(...) needs either 0 arguments or 2 arguments.")),
    }
}

fn builtin_random_int(low: &Value, high: &Value) -> Result<Value, EvalError> {
    let (a, b) = (whole(low, "random_int")?, whole(high, "random_int")?);
    if a > b {
        return Err(failed(format!("empty range for random_int({}, {})", a, b)));
    }
    Ok(Value::Int(rand::thread_rng().gen_range(a..=b)))
}

fn builtin_choice(value: &Value) -> Result<Value, EvalError> {
    let items = items_of(value)?;
    items
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| failed("Cannot choose from an empty sequence"))
}

fn builtin_sleep(value: &Value) -> Result<Value, EvalError> {
    let seconds = to_float(value)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(failed("sleep length must be non-negative"));
    }
    std::thread::sleep(Duration::from_secs_f64(seconds));
    Ok(Value::Nothing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::settings::{DisplayMode, Settings};

    fn interpreter() -> Interpreter {
        Interpreter::new(Settings::default().with_display(DisplayMode::Headless))
    }

    fn call(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let builtin = Builtin::lookup(name).unwrap();
        interpreter().call_builtin(builtin, name, args, 1)
    }

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|n| Value::Int(*n)).collect())
    }

    #[test]
    fn test_registry_names_and_aliases() {
        let names: Vec<&str> = Builtin::names().collect();
        for expected in ["len", "random", "flask_app", "create_web_app", "open_window", "window_open"] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert_eq!(Builtin::lookup("create_web_app"), Some(Builtin::WebApp));
        assert_eq!(Builtin::WebApp.name(), "flask_app");
        assert_eq!(Builtin::lookup("printf"), None);
    }

    #[test]
    fn test_arity_is_checked() {
        let err = call("len", vec![]).unwrap_err();
        match err {
            EvalError::Runtime(RuntimeError::ArgumentCountMismatch { expected, got, .. }) => {
                assert_eq!((expected.as_str(), got), ("1", 0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(Builtin::Range.arity().describe(), "1 to 3");
        assert_eq!(Builtin::Min.arity().describe(), "at least 1");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call("int", vec![Value::text(" 42 ")]).unwrap(), Value::Int(42));
        assert_eq!(call("int", vec![Value::Float(3.9)]).unwrap(), Value::Int(3));
        assert!(call("int", vec![Value::text("abc")]).is_err());
        assert_eq!(call("float", vec![Value::text("2.5")]).unwrap(), Value::Float(2.5));
        assert_eq!(call("str", vec![Value::Float(2.0)]).unwrap(), Value::text("2.0"));
        assert_eq!(call("bool", vec![Value::text("")]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_range_forms() {
        assert_eq!(call("range", vec![Value::Int(3)]).unwrap(), ints(&[0, 1, 2]));
        assert_eq!(
            call("range", vec![Value::Int(5), Value::Int(0), Value::Int(-2)]).unwrap(),
            ints(&[5, 3, 1])
        );
        assert!(call("range", vec![Value::Int(1), Value::Int(2), Value::Int(0)]).is_err());
    }

    #[test]
    fn test_aggregates() {
        let list = ints(&[3, 1, 2]);
        assert_eq!(call("len", vec![list.clone()]).unwrap(), Value::Int(3));
        assert_eq!(call("min", vec![list.clone()]).unwrap(), Value::Int(1));
        assert_eq!(call("max", vec![Value::Int(4), Value::Int(9)]).unwrap(), Value::Int(9));
        assert_eq!(call("sum", vec![list.clone()]).unwrap(), Value::Int(6));
        assert_eq!(call("sorted", vec![list]).unwrap(), ints(&[1, 2, 3]));
        assert!(call("min", vec![Value::list(vec![])]).is_err());
        assert!(call("sorted", vec![Value::list(vec![Value::Int(1), Value::text("a")])]).is_err());
    }

    #[test]
    fn test_round_uses_bankers_rounding() {
        assert_eq!(call("round", vec![Value::Float(2.5)]).unwrap(), Value::Int(2));
        assert_eq!(call("round", vec![Value::Float(3.5)]).unwrap(), Value::Int(4));
        assert_eq!(
            call("round", vec![Value::Float(3.14159), Value::Int(2)]).unwrap(),
            Value::Float(3.14)
        );
    }

    #[test]
    fn test_random_forms() {
        let value = call("random", vec![]).unwrap();
        assert!(matches!(value, Value::Float(x) if (0.0..1.0).contains(&x)));

        for _ in 0..20 {
            let value = call("random", vec![Value::Int(5), Value::Int(1)]).unwrap();
            assert!(matches!(value, Value::Int(n) if (1..=5).contains(&n)));
        }

        let value = call("random", vec![Value::Float(1.0), Value::Int(2)]).unwrap();
        assert!(matches!(value, Value::Float(x) if (1.0..=2.0).contains(&x)));

        let value = call("random", vec![Value::Bool(false), Value::Bool(true)]).unwrap();
        assert!(matches!(value, Value::Int(0) | Value::Int(1)));

        match call("random", vec![Value::Int(1)]) {
            Err(EvalError::Failed(message)) => {
                assert_eq!(message, "random(...) needs either 0 arguments or 2 arguments.")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_choice() {
        let value = call("choice", vec![ints(&[7])]).unwrap();
        assert_eq!(value, Value::Int(7));
        assert!(call("choice", vec![Value::list(vec![])]).is_err());
    }
}
