use std::sync::Arc;

use super::required;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::value::is_truthy;

#[derive(Debug)]
pub struct Conditional {
    condition: Association,
    negate: Option<Association>,
    content: Option<Arc<Element>>,
}

impl Conditional {
    pub fn new(
        name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            condition: required(&mut associations, name, "condition")?,
            negate: associations.remove("negate"),
            content,
        })
    }

    fn visible_content(&self, cx: &Context<'_>) -> Option<&Element> {
        let condition = is_truthy(&cx.value(&self.condition));
        let negate = self
            .negate
            .as_ref()
            .is_some_and(|negate| is_truthy(&cx.value(negate)));
        if condition == negate {
            return None;
        }
        self.content.as_deref()
    }
}

impl DynamicElement for Conditional {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self.visible_content(cx) {
            Some(content) => content.take_values(cx),
            None => Ok(()),
        }
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        match self.visible_content(cx) {
            Some(content) => content.invoke_action(cx),
            None => Ok(None),
        }
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self.visible_content(cx) {
            Some(content) => content.append_to_response(cx),
            None => Ok(()),
        }
    }

    fn is_structural(&self) -> bool {
        true
    }
}
