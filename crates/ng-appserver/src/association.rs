//! Turning raw binding values into associations.
//!
//! Inline tags and declaration files write bindings differently:
//!
//! | written            | inline                  | declaration file        |
//! |--------------------|-------------------------|-------------------------|
//! | `"text"`           | constant `text`         | constant `text`         |
//! | `"$user.name"`     | key path `user.name`    | constant `$user.name`   |
//! | `user.name`        | key path `user.name`    | key path `user.name`    |
//! | `12` / `-1.5`      | number                  | number                  |
//! | `true`             | `true` (exact case)     | `true`/`yes`, any case  |
//! | `^title`           | binding reference       | binding reference       |
//! | `disabled` (alone) | `true`                  |                         |

use ng_templates::BindingValue;
use serde_json::Number;
use serde_json::Value;

use crate::component::ActionResults;
use crate::error::AssociationError;
use crate::error::EngineError;
use crate::error::StateError;
use crate::scope::ComponentScope;
use crate::value;

#[derive(Clone, Debug, PartialEq)]
pub enum Association {
    Constant(Value),
    KeyPath(String),
    /// Reads and writes the named binding of the current component, as seen
    /// from its parent.
    BindingReference(String),
}

impl Association {
    pub fn from_binding(binding: &BindingValue, is_inline: bool) -> Result<Self, AssociationError> {
        match binding {
            BindingValue::BooleanPresence => Ok(Association::Constant(Value::Bool(true))),
            BindingValue::Quoted(text) => {
                let inner = strip_quotes(text)?;
                match inner.strip_prefix('$') {
                    Some(dynamic) if is_inline => {
                        Self::from_dynamic(strip_valid_marker(dynamic), is_inline)
                    }
                    _ => Ok(Association::Constant(Value::String(apply_escapes(inner)?))),
                }
            }
            BindingValue::Bare(text) => Self::from_dynamic(text, is_inline),
        }
    }

    fn from_dynamic(text: &str, is_inline: bool) -> Result<Self, AssociationError> {
        if is_numeric(text) {
            return Ok(Association::Constant(numeric_value(text)));
        }

        if let Some(boolean) = boolean_literal(text, is_inline) {
            return Ok(Association::Constant(Value::Bool(boolean)));
        }

        match text.strip_prefix('^') {
            Some(binding) => {
                validate_key_path(binding)?;
                Ok(Association::BindingReference(binding.to_string()))
            }
            None => {
                validate_key_path(text)?;
                Ok(Association::KeyPath(text.to_string()))
            }
        }
    }

    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Association::Constant(value.into())
    }

    #[must_use]
    pub fn is_settable(&self) -> bool {
        !matches!(self, Association::Constant(_))
    }

    /// Read the association against the component at `depth` in `scope`.
    #[must_use]
    pub fn value(&self, scope: &ComponentScope<'_>, depth: usize) -> Value {
        match self {
            Association::Constant(value) => value.clone(),
            Association::KeyPath(path) => scope
                .get(depth)
                .map_or(Value::Null, |instance| {
                    value::value_for_key_path(instance.component(), path)
                }),
            Association::BindingReference(name) => match (depth.checked_sub(1), scope.get(depth)) {
                (Some(parent), Some(instance)) => instance
                    .binding(name)
                    .map_or(Value::Null, |binding| binding.value(scope, parent)),
                _ => Value::Null,
            },
        }
    }

    /// Write through the association. Constants silently ignore writes.
    pub fn set_value(
        &self,
        scope: &mut ComponentScope<'_>,
        depth: usize,
        value: Value,
    ) -> Result<(), StateError> {
        match self {
            Association::Constant(_) => Ok(()),
            Association::KeyPath(path) => {
                let instance = scope.get_mut(depth).ok_or(StateError::ScopeUnderflow)?;
                value::take_value_for_key_path(instance.component_mut(), path, value);
                Ok(())
            }
            Association::BindingReference(name) => {
                let Some(parent) = depth.checked_sub(1) else {
                    return Ok(());
                };
                let binding = scope
                    .get(depth)
                    .ok_or(StateError::ScopeUnderflow)?
                    .binding(name)
                    .cloned();
                match binding {
                    Some(binding) => binding.set_value(scope, parent, value),
                    None => Ok(()),
                }
            }
        }
    }

    /// Treat the association as an action and perform it.
    pub fn invoke(
        &self,
        scope: &mut ComponentScope<'_>,
        depth: usize,
    ) -> Result<Option<ActionResults>, EngineError> {
        match self {
            Association::Constant(Value::String(page)) => {
                Ok(Some(ActionResults::PageNamed(page.clone())))
            }
            Association::Constant(_) => Ok(None),
            Association::KeyPath(action) => {
                let instance = scope.get_mut(depth).ok_or(StateError::ScopeUnderflow)?;
                instance.component_mut().invoke_action(action)
            }
            Association::BindingReference(name) => {
                let Some(parent) = depth.checked_sub(1) else {
                    return Ok(None);
                };
                let binding = scope
                    .get(depth)
                    .ok_or(StateError::ScopeUnderflow)?
                    .binding(name)
                    .cloned();
                match binding {
                    Some(binding) => binding.invoke(scope, parent),
                    None => Ok(None),
                }
            }
        }
    }
}

fn strip_quotes(text: &str) -> Result<&str, AssociationError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close => Ok(chars.as_str()),
        (Some('"' | '\''), _) => Err(AssociationError::UnterminatedQuote(text.to_string())),
        _ => Ok(text),
    }
}

/// Drop a trailing `// VALID` marker left by older tooling.
fn strip_valid_marker(text: &str) -> &str {
    let Some(head) = text.strip_suffix("VALID") else {
        return text;
    };
    match head.trim_end().strip_suffix("//") {
        Some(head) => head.trim_end(),
        None => text,
    }
}

fn apply_escapes(text: &str) -> Result<String, AssociationError> {
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some(c @ ('\\' | '"' | '\'' | '$')) => c,
            Some(escape) => {
                return Err(AssociationError::InvalidEscape {
                    value: text.to_string(),
                    escape,
                })
            }
            None => return Err(AssociationError::DanglingEscape(text.to_string())),
        };
        unescaped.push(escaped);
    }
    Ok(unescaped)
}

/// Optional sign or leading dot, then digits with at most one `.`.
fn is_numeric(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in body.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

fn numeric_value(text: &str) -> Value {
    if !text.contains('.') {
        if let Ok(integer) = text.parse::<i64>() {
            return Value::Number(integer.into());
        }
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn boolean_literal(text: &str, is_inline: bool) -> Option<bool> {
    if is_inline {
        return match text {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
    }
    if ["true", "yes"].iter().any(|t| text.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if ["false", "no", "nil", "null"]
        .iter()
        .any(|f| text.eq_ignore_ascii_case(f))
    {
        Some(false)
    } else {
        None
    }
}

fn validate_key_path(path: &str) -> Result<(), AssociationError> {
    let invalid = |reason| {
        Err(AssociationError::InvalidKeyPath {
            path: path.to_string(),
            reason,
        })
    };

    if path.is_empty() {
        return Err(AssociationError::EmptyKeyPath);
    }
    if path.starts_with('.') || path.ends_with('.') {
        return invalid("starts or ends with '.'");
    }
    if path.starts_with(' ') || path.ends_with(' ') {
        return invalid("starts or ends with a space");
    }
    if path.contains("..") {
        return invalid("contains an empty segment");
    }
    if path.contains(". ") || path.contains(" .") {
        return invalid("contains a space next to '.'");
    }
    if path.starts_with('@') || path.contains(".@") {
        return invalid("key path operators are not supported");
    }
    Ok(())
}
