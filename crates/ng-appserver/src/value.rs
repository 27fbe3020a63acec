//! The dynamic value model shared by components and associations.
//!
//! Values are plain [`serde_json::Value`]s. Key paths are dot separated; each
//! segment after the first indexes into an object (or an array, by position).

use serde_json::Map;
pub use serde_json::Value;

use crate::component::Component;

/// Whether a value counts as "true" for conditionals and boolean bindings.
///
/// Null and `false` are false, numbers are true unless zero, everything else is true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text rendered for a value, or `None` for null.
#[must_use]
pub fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read `path` from `component`. Missing segments read as null.
#[must_use]
pub fn value_for_key_path(component: &dyn Component, path: &str) -> Value {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Value::Null;
    };
    let mut value = component.value_for_key(first);
    for segment in segments {
        value = match value {
            Value::Object(mut map) => map.remove(segment).unwrap_or(Value::Null),
            Value::Array(mut items) => match segment.parse::<usize>() {
                Ok(index) if index < items.len() => items.swap_remove(index),
                _ => Value::Null,
            },
            _ => Value::Null,
        };
    }
    value
}

/// Write `value` at `path` on `component`, creating intermediate objects as needed.
pub fn take_value_for_key_path(component: &mut dyn Component, path: &str, value: Value) {
    match path.split_once('.') {
        None => component.take_value_for_key(path, value),
        Some((first, rest)) => {
            let mut head = component.value_for_key(first);
            set_nested(&mut head, rest, value);
            component.take_value_for_key(first, head);
        }
    }
}

fn set_nested(target: &mut Value, path: &str, value: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((first, rest)) => {
            let child = map.entry(first.to_string()).or_insert(Value::Null);
            set_nested(child, rest, value);
        }
    }
}
