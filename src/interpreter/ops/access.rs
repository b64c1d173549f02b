use super::OpError;
use crate::memory::value::Value;

/// `target[index]`. Negative positions count from the end.
pub fn index(target: &Value, index: &Value) -> Result<Value, OpError> {
    match target {
        Value::List(items) => {
            let items = items.borrow();
            let position = resolve_position(index, items.len(), "list")?;
            Ok(items[position].clone())
        }
        Value::Text(text) => {
            let chars: Vec<char> = text.chars().collect();
            let position = resolve_position(index, chars.len(), "text")?;
            Ok(Value::Text(chars[position].to_string()))
        }
        Value::Map(entries) => {
            let key = match index {
                Value::Text(key) => key.clone(),
                other => other.to_string(),
            };
            entries
                .get(&key)
                .cloned()
                .ok_or_else(|| OpError::invalid(format!("there is no key '{}'", key)))
        }
        other => Err(OpError::invalid(format!(
            "a {} can't be indexed",
            other.type_name()
        ))),
    }
}

fn resolve_position(index: &Value, len: usize, what: &str) -> Result<usize, OpError> {
    let raw = index.as_i64().ok_or_else(|| {
        OpError::invalid(format!(
            "{} positions must be whole numbers, not {}",
            what,
            index.type_name()
        ))
    })?;
    let position = if raw < 0 { raw + len as i64 } else { raw };
    if position < 0 || position >= len as i64 {
        return Err(OpError::invalid(format!("{} index out of range", what)));
    }
    Ok(position as usize)
}
