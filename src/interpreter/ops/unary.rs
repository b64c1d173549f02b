use super::OpError;
use crate::memory::value::Value;
use crate::parser::expressions::UnaryOp;

pub fn unary_op(op: UnaryOp, operand: &Value) -> Result<Value, OpError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Value::Float(x) => Ok(Value::Float(-x)),
            other => match other.as_i64() {
                Some(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| OpError::invalid("the number is too large")),
                None => Err(bad_operand("-", other)),
            },
        },
        UnaryOp::Plus => match operand {
            Value::Float(x) => Ok(Value::Float(*x)),
            other => other
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| bad_operand("+", other)),
        },
    }
}

fn bad_operand(symbol: &str, operand: &Value) -> OpError {
    OpError::invalid(format!("can't use '{}' on {}", symbol, operand.type_name()))
}
