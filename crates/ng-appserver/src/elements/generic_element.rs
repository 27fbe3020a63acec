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

/// A self-closing HTML element whose name and attributes come from bindings.
///
/// Content is ignored. Use [`super::GenericContainer`] for elements with a
/// body.
#[derive(Debug)]
pub struct GenericElement {
    element_name: Association,
    attributes: Associations,
}

impl GenericElement {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            element_name: required(&mut associations, name, "elementName")?,
            attributes: associations,
        })
    }
}

impl DynamicElement for GenericElement {
    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        if let Some(element_name) = display_string(&cx.value(&self.element_name)) {
            let attributes = html::additional_attributes(cx, &self.attributes);
            cx.append_content_string(&html::start_tag(&element_name, &attributes, true));
        }
        Ok(())
    }
}
