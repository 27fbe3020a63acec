use std::borrow::Cow;
use std::fmt::Write;

use serde_json::Value;

use super::Associations;
use crate::context::Context;
use crate::value::display_string;

#[must_use]
pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// `<name a="1" b>`, or `<name a="1"/>` when `self_closing`.
///
/// Null and `false` attributes are left out, `true` renders the bare name.
#[must_use]
pub(crate) fn start_tag(name: &str, attributes: &[(String, Value)], self_closing: bool) -> String {
    let mut tag = format!("<{name}");
    for (key, value) in attributes {
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => {
                let _ = write!(tag, " {key}");
            }
            other => {
                let text = display_string(other).unwrap_or_default();
                let _ = write!(tag, " {key}=\"{}\"", escape(&text));
            }
        }
    }
    tag.push_str(if self_closing { "/>" } else { ">" });
    tag
}

/// Values of the bindings an element does not use itself, in name order.
pub(crate) fn additional_attributes(
    cx: &Context<'_>,
    additional: &Associations,
) -> Vec<(String, Value)> {
    additional
        .iter()
        .map(|(name, association)| (name.clone(), cx.value(association)))
        .collect()
}
