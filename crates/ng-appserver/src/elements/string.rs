use std::sync::Arc;

use super::html;
use super::required;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::value::display_string;
use crate::value::is_truthy;

/// Renders a value as text.
#[derive(Debug)]
pub struct StringElement {
    value: Association,
    value_when_empty: Option<Association>,
    escape_html: Option<Association>,
}

impl StringElement {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            value: required(&mut associations, name, "value")?,
            value_when_empty: associations.remove("valueWhenEmpty"),
            escape_html: associations.remove("escapeHTML"),
        })
    }
}

impl DynamicElement for StringElement {
    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let mut value = cx.value(&self.value);
        let is_empty = value.is_null() || value.as_str().is_some_and(str::is_empty);
        if is_empty {
            if let Some(fallback) = &self.value_when_empty {
                value = cx.value(fallback);
            }
        }

        let Some(text) = display_string(&value) else {
            return Ok(());
        };

        let escape = self
            .escape_html
            .as_ref()
            .is_none_or(|association| is_truthy(&cx.value(association)));
        if escape {
            cx.append_content_string(&html::escape(&text));
        } else {
            cx.append_content_string(&text);
        }
        Ok(())
    }
}
