use std::sync::Arc;

use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;

/// Stands in for whatever the calling template wrapped the current
/// component's tag around.
///
/// The wrapped content belongs to the caller, so it is visited in the
/// caller's scope. On a page, which has no caller, it renders nothing.
#[derive(Debug)]
pub struct ComponentContent;

impl ComponentContent {
    pub fn new(
        _name: &str,
        _associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self)
    }

    fn in_parent<R: Default>(
        cx: &mut Context<'_>,
        visit: impl FnOnce(&Element, &mut Context<'_>) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        if cx.components().depth() == 0 {
            return Ok(R::default());
        }
        let Some(content) = cx.components().current().content().cloned() else {
            return Ok(R::default());
        };

        cx.components_mut().suspend()?;
        let result = visit(content.as_ref(), cx);
        cx.components_mut().resume()?;
        result
    }
}

impl DynamicElement for ComponentContent {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        Self::in_parent(cx, |content, cx| content.take_values(cx))
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        Self::in_parent(cx, |content, cx| content.invoke_action(cx))
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        Self::in_parent(cx, |content, cx| content.append_to_response(cx))
    }

    fn is_structural(&self) -> bool {
        true
    }
}
