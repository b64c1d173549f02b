//! Expression evaluation
//!
//! Statements hand their expressions over as text. Evaluation runs in three
//! steps:
//!
//! 1. **Idioms**: a few English phrasings are rewritten into calls
//!    (`random number between 1 and 6` becomes `random(1, 6)`).
//! 2. **Call phrase**: text of the form `call NAME [with ARGS]` goes through
//!    the same call path as the `call` statement.
//! 3. **Grammar**: anything else is parsed by
//!    [`crate::parser::expressions::parse_expression`] (cached per text) and
//!    walked here.
//!
//! # Names
//!
//! A name resolves to the innermost scope that binds it, then to a builtin.
//! User bindings therefore shadow builtins.
//!
//! # Errors
//!
//! The walk reports [`EvalError`]s, which carry no line. [`Interpreter::evaluate_text`]
//! attaches the line and the original text, turning them into the friendly
//! [`RuntimeError`] forms.

use crate::interpreter::builtins::Builtin;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::access::index;
use crate::interpreter::ops::binary::{binary_op, compare, contains};
use crate::interpreter::ops::unary::unary_op;
use crate::interpreter::ops::OpError;
use crate::memory::value::Value;
use crate::parser::ast::{CompareOp, Condition};
use crate::parser::expressions::{parse_expression, Expr, Literal, LogicalOp};
use crate::parser::patterns::{split_arguments, Phrase};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::OnceLock;

/// Failure inside an expression walk, before a line is attached
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EvalError {
    UnknownName(String),
    Failed(String),
    DivisionByZero,
    /// Already a complete diagnostic (for example from a nested call)
    Runtime(RuntimeError),
}

impl From<OpError> for EvalError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::DivisionByZero => EvalError::DivisionByZero,
            OpError::Invalid(message) => EvalError::Failed(message),
        }
    }
}

impl From<RuntimeError> for EvalError {
    fn from(err: RuntimeError) -> Self {
        EvalError::Runtime(err)
    }
}

/// Idiom rewrites, applied in order: `(pattern, function, argument slots)`
const IDIOM_TABLE: &[(&str, &str, &[&str])] = &[
    ("fetch json from {url}", "fetch_json_from_api", &["url"]),
    ("fetch from {url}", "fetch_from_api", &["url"]),
    ("html|web page {html}", "make_html_page", &["html"]),
    ("random [number]", "random", &[]),
    ("random [number] between {low?} and {high}", "random", &["low", "high"]),
    ("random choice from {items}", "choice", &["items"]),
];

struct Idiom {
    phrase: Phrase,
    function: &'static str,
    slots: &'static [&'static str],
}

fn idioms() -> &'static [Idiom] {
    static IDIOMS: OnceLock<Vec<Idiom>> = OnceLock::new();
    IDIOMS.get_or_init(|| {
        IDIOM_TABLE
            .iter()
            .map(|&(pattern, function, slots)| Idiom {
                phrase: Phrase::compile(pattern),
                function,
                slots,
            })
            .collect()
    })
}

fn call_phrase() -> &'static Phrase {
    static CALL: OnceLock<Phrase> = OnceLock::new();
    CALL.get_or_init(|| Phrase::compile("call|run <name> [with {args}]"))
}

/// Apply the idiom rewrites in order; each sees the previous result.
pub(crate) fn normalize_idioms(text: &str) -> String {
    let mut current = text.trim().to_string();
    for idiom in idioms() {
        let rewritten = idiom.phrase.matches(&current).map(|captures| {
            let args: Vec<String> = idiom.slots.iter().map(|slot| captures.text(slot)).collect();
            format!("{}({})", idiom.function, args.join(", "))
        });
        if let Some(rewritten) = rewritten {
            current = rewritten;
        }
    }
    current
}

impl Interpreter {
    /// Evaluate expression text found on `line`.
    pub(crate) fn evaluate_text(&mut self, text: &str, line: usize) -> Result<Value, RuntimeError> {
        let normalized = normalize_idioms(text);

        let call = call_phrase()
            .matches(&normalized)
            .map(|captures| (captures.text("name"), captures.text("args")));
        if let Some((name, raw_args)) = call {
            let mut args = Vec::new();
            for argument in split_arguments(&raw_args) {
                args.push(self.evaluate_text(&argument, line)?);
            }
            return self.call_function(&name, args, line);
        }

        let expr = self.parse_cached(&normalized).ok_or_else(|| {
            RuntimeError::UnreadableExpression {
                expression: text.trim().to_string(),
                line,
            }
        })?;

        self.eval(&expr, line).map_err(|err| match err {
            EvalError::UnknownName(name) => RuntimeError::UndefinedName { name, line },
            EvalError::Failed(message) => RuntimeError::EvaluationFailed {
                expression: text.trim().to_string(),
                message,
                line,
            },
            EvalError::DivisionByZero => RuntimeError::DivisionByZero { line },
            EvalError::Runtime(err) => err,
        })
    }

    fn parse_cached(&mut self, text: &str) -> Option<Rc<Expr>> {
        if let Some(expr) = self.expr_cache.get(text) {
            return Some(Rc::clone(expr));
        }
        let expr = Rc::new(parse_expression(text).ok()?);
        self.expr_cache.insert(text.to_string(), Rc::clone(&expr));
        Some(expr)
    }

    /// Walk a parsed expression. `line` is only used for nested calls.
    pub(crate) fn eval(&mut self, expr: &Expr, line: usize) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Text(s) => Value::Text(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Nothing => Value::Nothing,
            }),

            Expr::Name(name) => self.resolve_name(name),

            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, line)?);
                }
                Ok(Value::list(values))
            }

            Expr::Map(pairs) => {
                let mut entries = IndexMap::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = match self.eval(key, line)? {
                        Value::Text(text) => text,
                        other => other.to_string(),
                    };
                    let value = self.eval(value, line)?;
                    entries.insert(key, value);
                }
                Ok(Value::map(entries))
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(operand, line)?;
                Ok(unary_op(*op, &value)?)
            }

            Expr::Binary { op, left, right } => {
                let left = self.eval(left, line)?;
                let right = self.eval(right, line)?;
                Ok(binary_op(*op, &left, &right)?)
            }

            // Short-circuit; the deciding operand is the result
            Expr::Logical { op, left, right } => {
                let left = self.eval(left, line)?;
                let decided = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(right, line)
                }
            }

            Expr::Call { callee, args } => {
                let function = self.eval(callee, line)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, line)?);
                }
                match (&function, callee.as_ref()) {
                    (Value::Builtin(builtin), Expr::Name(name)) => {
                        self.call_builtin(*builtin, name, values, line)
                    }
                    (Value::Builtin(builtin), _) => {
                        self.call_builtin(*builtin, builtin.name(), values, line)
                    }
                    (Value::Function(function), _) => {
                        Ok(self.call_user_function(function, values, line)?)
                    }
                    (other, _) => Err(EvalError::Failed(format!(
                        "a {} is not a function",
                        other.type_name()
                    ))),
                }
            }

            Expr::Index { target, index: position } => {
                let target = self.eval(target, line)?;
                let position = self.eval(position, line)?;
                Ok(index(&target, &position)?)
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.scopes.lookup(name) {
            return Ok(value.clone());
        }
        Builtin::lookup(name)
            .map(Value::Builtin)
            .ok_or_else(|| EvalError::UnknownName(name.to_string()))
    }

    /// Decide a parsed condition
    pub(crate) fn evaluate_condition(&mut self, condition: &Condition) -> Result<bool, RuntimeError> {
        let line = condition.line;
        let left = self.evaluate_text(&condition.left, line)?;
        if condition.op == CompareOp::Truthy {
            return Ok(left.is_truthy());
        }
        let right = self.evaluate_text(condition.right.as_deref().unwrap_or_default(), line)?;

        let symbol = condition.op.to_string();
        let outcome = match condition.op {
            CompareOp::Equal => Ok(left == right),
            CompareOp::NotEqual => Ok(left != right),
            CompareOp::Greater => compare(&symbol, &left, &right).map(|o| o == Ordering::Greater),
            CompareOp::Less => compare(&symbol, &left, &right).map(|o| o == Ordering::Less),
            CompareOp::GreaterEqual => compare(&symbol, &left, &right).map(|o| o != Ordering::Less),
            CompareOp::LessEqual => compare(&symbol, &left, &right).map(|o| o != Ordering::Greater),
            CompareOp::Contains => contains(&left, &right),
            CompareOp::NotContains => contains(&left, &right).map(|found| !found),
            CompareOp::Truthy => Ok(left.is_truthy()),
        };

        outcome.map_err(|err| RuntimeError::ConditionFailed {
            message: err.to_string(),
            line,
        })
    }
}
