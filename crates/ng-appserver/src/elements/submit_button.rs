use std::sync::Arc;

use serde_json::Value;

use super::html;
use super::required;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;

/// `<input type="submit">` named after its element path.
///
/// The enclosing form is the sender of the request, so the button fires when
/// its name shows up in the submitted values instead.
#[derive(Debug)]
pub struct SubmitButton {
    action: Association,
    value: Option<Association>,
    attributes: Associations,
}

impl SubmitButton {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            action: required(&mut associations, name, "action")?,
            value: associations.remove("value"),
            attributes: associations,
        })
    }
}

impl DynamicElement for SubmitButton {
    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        let name = cx.element_path().to_string();
        if cx.request().has_form_value(&name) {
            return cx.invoke(&self.action);
        }
        Ok(None)
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let value = self
            .value
            .as_ref()
            .map_or(Value::Null, |value| cx.value(value));
        let mut attributes = vec![
            ("type".to_string(), Value::from("submit")),
            ("name".to_string(), Value::String(cx.element_path().to_string())),
            ("value".to_string(), value),
        ];
        attributes.extend(html::additional_attributes(cx, &self.attributes));
        cx.append_content_string(&html::start_tag("input", &attributes, true));
        Ok(())
    }
}
