use std::sync::Arc;

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
use crate::value::display_string;

/// An HTML element whose name and attributes come from bindings.
#[derive(Debug)]
pub struct GenericContainer {
    element_name: Association,
    attributes: Associations,
    content: Option<Arc<Element>>,
}

impl GenericContainer {
    pub fn new(
        name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            element_name: required(&mut associations, name, "elementName")?,
            attributes: associations,
            content,
        })
    }
}

impl DynamicElement for GenericContainer {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self.content.as_deref() {
            Some(content) => content.take_values(cx),
            None => Ok(()),
        }
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        match self.content.as_deref() {
            Some(content) => content.invoke_action(cx),
            None => Ok(None),
        }
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let element_name = display_string(&cx.value(&self.element_name));
        if let Some(element_name) = &element_name {
            let attributes = html::additional_attributes(cx, &self.attributes);
            cx.append_content_string(&html::start_tag(element_name, &attributes, false));
        }
        if let Some(content) = self.content.as_deref() {
            content.append_to_response(cx)?;
        }
        if let Some(element_name) = &element_name {
            cx.append_content_string(&format!("</{element_name}>"));
        }
        Ok(())
    }
}
