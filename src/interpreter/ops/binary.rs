use super::OpError;
use crate::memory::value::Value;
use crate::parser::expressions::BinOp;
use std::cmp::Ordering;

const OVERFLOW: &str = "the number is too large";

/// Apply a binary operator. `and`/`or` are handled by the evaluator since
/// they short-circuit.
pub fn binary_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => arithmetic(op, left, right),
        BinOp::Mul => multiply(left, right),
        BinOp::Div => divide(left, right),
        BinOp::FloorDiv | BinOp::Mod | BinOp::Pow => arithmetic(op, left, right),
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::NotEq => Ok(Value::Bool(left != right)),
        BinOp::Less | BinOp::LessEq | BinOp::Greater | BinOp::GreaterEq => {
            let ordering = compare(op.symbol(), left, right)?;
            let result = match op {
                BinOp::Less => ordering == Ordering::Less,
                BinOp::LessEq => ordering != Ordering::Greater,
                BinOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinOp::In => contains(right, left).map(Value::Bool),
        BinOp::NotIn => contains(right, left).map(|found| Value::Bool(!found)),
    }
}

fn unsupported(symbol: &str, left: &Value, right: &Value) -> OpError {
    OpError::invalid(format!(
        "can't use '{}' with {} and {}",
        symbol,
        left.type_name(),
        right.type_name()
    ))
}

/// `+`: numbers add, text and lists concatenate
pub fn add(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        _ => arithmetic(BinOp::Add, left, right),
    }
}

/// Longest text (in bytes) or list a repeat may build
pub const MAX_REPEAT_LEN: usize = 10_000_000;

/// Repeat count for `len`-sized content, refused past [`MAX_REPEAT_LEN`]
fn repeat_count(len: usize, count: &Value) -> Result<usize, OpError> {
    let times = usize::try_from(count.as_i64().unwrap_or(0).max(0)).unwrap_or(usize::MAX);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(OpError::invalid(format!(
            "that would be too big to hold in memory (more than {} items)",
            MAX_REPEAT_LEN
        ))),
    }
}

fn multiply(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (left, right) {
        (Value::Text(text), count) | (count, Value::Text(text)) if count.as_i64().is_some() => {
            let times = repeat_count(text.len(), count)?;
            Ok(Value::Text(text.repeat(times)))
        }
        (Value::List(items), count) | (count, Value::List(items)) if count.as_i64().is_some() => {
            let items = items.borrow();
            let times = repeat_count(items.len(), count)?;
            let repeated: Vec<Value> = items.iter().cloned().cycle().take(items.len() * times).collect();
            Ok(Value::list(repeated))
        }
        _ => arithmetic(BinOp::Mul, left, right),
    }
}

/// `/` stays an integer when the division is exact
fn divide(left: &Value, right: &Value) -> Result<Value, OpError> {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        if b == 0 {
            return Err(OpError::DivisionByZero);
        }
        // i64::MIN / -1 has no integer result and falls through to float
        if a.checked_rem(b) == Some(0) {
            if let Some(quotient) = a.checked_div(b) {
                return Ok(Value::Int(quotient));
            }
        }
        return Ok(Value::Float(a as f64 / b as f64));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Err(OpError::DivisionByZero),
        (Some(a), Some(b)) => Ok(Value::Float(a / b)),
        _ => Err(unsupported("/", left, right)),
    }
}

/// Numeric operators. Two integers stay integral; any float makes a float.
fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return int_arithmetic(op, a, b);
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => float_arithmetic(op, a, b).map(Value::Float),
        _ => Err(unsupported(op.symbol(), left, right)),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, OpError> {
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(OpError::DivisionByZero);
            }
            a.checked_div(b).map(|q| {
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    q - 1
                } else {
                    q
                }
            })
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(OpError::DivisionByZero);
            }
            // wrapping_rem only wraps for i64::MIN % -1, whose remainder is 0
            let r = a.wrapping_rem(b);
            Some(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        BinOp::Pow => {
            if b < 0 {
                return float_arithmetic(op, a as f64, b as f64).map(Value::Float);
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
        _ => None,
    };
    result.map(Value::Int).ok_or_else(|| OpError::invalid(OVERFLOW))
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<f64, OpError> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div => Ok(a / b),
        BinOp::FloorDiv if b == 0.0 => Err(OpError::DivisionByZero),
        BinOp::FloorDiv => Ok((a / b).floor()),
        BinOp::Mod if b == 0.0 => Err(OpError::DivisionByZero),
        BinOp::Mod => Ok(a - b * (a / b).floor()),
        BinOp::Pow if a == 0.0 && b < 0.0 => Err(OpError::DivisionByZero),
        BinOp::Pow => Ok(a.powf(b)),
        _ => Err(OpError::invalid(format!("can't use '{}' on numbers", op.symbol()))),
    }
}

/// Ordering for numbers with numbers and text with text
pub fn compare(symbol: &str, left: &Value, right: &Value) -> Result<Ordering, OpError> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        _ => {
            if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
                return Ok(a.cmp(&b));
            }
            match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => a
                    .partial_cmp(&b)
                    .ok_or_else(|| OpError::invalid("can't compare nan")),
                _ => Err(OpError::invalid(format!(
                    "'{}' not supported between {} and {}",
                    symbol,
                    left.type_name(),
                    right.type_name()
                ))),
            }
        }
    }
}

/// Membership: substring for text, element for lists, key for maps
pub fn contains(container: &Value, item: &Value) -> Result<bool, OpError> {
    match container {
        Value::Text(text) => match item {
            Value::Text(needle) => Ok(text.contains(needle.as_str())),
            other => Err(OpError::invalid(format!(
                "can't look for a {} inside text",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.borrow().iter().any(|element| element == item)),
        Value::Map(entries) => Ok(match item {
            Value::Text(key) => entries.contains_key(key),
            _ => false,
        }),
        other => Err(OpError::invalid(format!(
            "a {} can't contain other values",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(binary_op(BinOp::Add, &int(2), &int(3)), Ok(int(5)));
        assert_eq!(binary_op(BinOp::Div, &int(6), &int(3)), Ok(int(2)));
        assert_eq!(binary_op(BinOp::Div, &int(7), &int(2)), Ok(Value::Float(3.5)));
        assert_eq!(binary_op(BinOp::Pow, &int(2), &int(10)), Ok(int(1024)));
    }

    #[test]
    fn test_floor_division_and_modulo_round_down() {
        assert_eq!(binary_op(BinOp::FloorDiv, &int(-7), &int(2)), Ok(int(-4)));
        assert_eq!(binary_op(BinOp::Mod, &int(-7), &int(3)), Ok(int(2)));
        assert_eq!(binary_op(BinOp::Mod, &int(7), &int(-3)), Ok(int(-2)));
        assert_eq!(
            binary_op(BinOp::FloorDiv, &Value::Float(7.0), &int(2)),
            Ok(Value::Float(3.0))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary_op(BinOp::Div, &int(1), &int(0)),
            Err(OpError::DivisionByZero)
        );
        assert_eq!(
            binary_op(BinOp::Mod, &Value::Float(1.0), &Value::Float(0.0)),
            Err(OpError::DivisionByZero)
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(binary_op(BinOp::Mul, &int(i64::MAX), &int(2)).is_err());
        assert!(binary_op(BinOp::FloorDiv, &int(i64::MIN), &int(-1)).is_err());
    }

    #[test]
    fn test_most_negative_integer_divided_by_minus_one() {
        assert_eq!(
            binary_op(BinOp::Div, &int(i64::MIN), &int(-1)),
            Ok(Value::Float(9.223372036854775808e18))
        );
        assert_eq!(binary_op(BinOp::Mod, &int(i64::MIN), &int(-1)), Ok(int(0)));
        assert_eq!(binary_op(BinOp::Div, &int(i64::MIN), &int(1)), Ok(int(i64::MIN)));
    }

    #[test]
    fn test_huge_repeats_are_refused() {
        let err = binary_op(BinOp::Mul, &Value::text("ab"), &int(i64::MAX)).unwrap_err();
        assert!(err.to_string().contains("too big"), "got {}", err);
        assert!(binary_op(BinOp::Mul, &int(i64::MAX), &Value::list(vec![int(1)])).is_err());
        assert!(binary_op(BinOp::Mul, &Value::text("x"), &int(MAX_REPEAT_LEN as i64 + 1)).is_err());

        // Empty content can be repeated any number of times
        assert_eq!(
            binary_op(BinOp::Mul, &Value::text(""), &int(i64::MAX)),
            Ok(Value::text(""))
        );
        assert_eq!(
            binary_op(BinOp::Mul, &Value::text("ab"), &int(-3)),
            Ok(Value::text(""))
        );
    }

    #[test]
    fn test_text_and_list_combination() {
        assert_eq!(
            binary_op(BinOp::Add, &Value::text("ab"), &Value::text("cd")),
            Ok(Value::text("abcd"))
        );
        assert_eq!(
            binary_op(BinOp::Mul, &Value::text("ab"), &int(3)),
            Ok(Value::text("ababab"))
        );
        let joined = binary_op(
            BinOp::Add,
            &Value::list(vec![int(1)]),
            &Value::list(vec![int(2)]),
        );
        assert_eq!(joined, Ok(Value::list(vec![int(1), int(2)])));
        assert!(binary_op(BinOp::Add, &Value::text("a"), &int(1)).is_err());
    }

    #[test]
    fn test_ordering_rules() {
        assert_eq!(
            binary_op(BinOp::Less, &int(1), &Value::Float(1.5)),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary_op(BinOp::Greater, &Value::text("b"), &Value::text("a")),
            Ok(Value::Bool(true))
        );
        assert!(binary_op(BinOp::Less, &Value::text("a"), &int(1)).is_err());
    }

    #[test]
    fn test_membership() {
        let list = Value::list(vec![int(2), int(5)]);
        assert_eq!(contains(&list, &int(5)), Ok(true));
        assert_eq!(contains(&Value::text("hello"), &Value::text("ell")), Ok(true));
        assert!(contains(&int(5), &int(5)).is_err());
    }
}
