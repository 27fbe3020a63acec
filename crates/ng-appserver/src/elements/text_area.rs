use std::sync::Arc;

use serde_json::Value;

use super::html;
use super::required;
use super::single_form_value;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::value::display_string;
use crate::value::is_truthy;

/// `<textarea>` bound to a value. Submits like [`super::TextField`].
#[derive(Debug)]
pub struct TextArea {
    value: Association,
    name: Option<Association>,
    disabled: Option<Association>,
    attributes: Associations,
}

impl TextArea {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            value: required(&mut associations, name, "value")?,
            name: associations.remove("name"),
            disabled: associations.remove("disabled"),
            attributes: associations,
        })
    }

    fn name(&self, cx: &Context<'_>) -> String {
        self.name
            .as_ref()
            .and_then(|name| display_string(&cx.value(name)))
            .unwrap_or_else(|| cx.element_path().to_string())
    }

    fn disabled(&self, cx: &Context<'_>) -> bool {
        self.disabled
            .as_ref()
            .is_some_and(|disabled| is_truthy(&cx.value(disabled)))
    }
}

impl DynamicElement for TextArea {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        if self.disabled(cx) {
            return Ok(());
        }
        let name = self.name(cx);
        if let Some(value) = single_form_value(cx, &name)? {
            cx.set_value(&self.value, value)?;
        }
        Ok(())
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let mut attributes = vec![("name".to_string(), Value::String(self.name(cx)))];
        if self.disabled(cx) {
            attributes.push(("disabled".to_string(), Value::Bool(true)));
        }
        attributes.extend(html::additional_attributes(cx, &self.attributes));

        let text = display_string(&cx.value(&self.value)).unwrap_or_default();
        cx.append_content_string(&html::start_tag("textarea", &attributes, false));
        cx.append_content_string(&html::escape(&text));
        cx.append_content_string("</textarea>");
        Ok(())
    }
}
