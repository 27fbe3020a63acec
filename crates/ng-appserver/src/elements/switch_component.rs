use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ng_source::FxDashMap;

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

/// Embeds the component named by `componentName`, chosen per request.
///
/// Each name gets its own index, and the component is visited under a branch
/// set to that index, so two components swapped in at the same place never
/// share child state.
#[derive(Debug)]
pub struct SwitchComponent {
    component_name: Association,
    bindings: Arc<Associations>,
    content: Option<Arc<Element>>,
    indexes: FxDashMap<String, u32>,
    next_index: AtomicU32,
}

impl SwitchComponent {
    pub fn new(
        name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        let component_name = required(&mut associations, name, "componentName")?;
        Ok(Self {
            component_name,
            bindings: Arc::new(associations),
            content,
            indexes: FxDashMap::default(),
            next_index: AtomicU32::new(0),
        })
    }

    fn index_for(&self, name: &str) -> u32 {
        if let Some(index) = self.indexes.get(name) {
            return *index;
        }
        *self
            .indexes
            .entry(name.to_string())
            .or_insert_with(|| self.next_index.fetch_add(1, Ordering::Relaxed))
    }

    fn with_component<R: Default>(
        &self,
        cx: &mut Context<'_>,
        visit: impl FnOnce(&Element, &mut Context<'_>) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let Some(name) = display_string(&cx.value(&self.component_name)) else {
            tracing::debug!("componentName resolved to null, nothing to switch to");
            return Ok(R::default());
        };

        cx.element_path_mut().add_branch_and_set(self.index_for(&name));
        let result = cx.in_component(&name, &self.bindings, self.content.as_ref(), visit);
        cx.element_path_mut().remove_branch()?;
        result
    }
}

impl DynamicElement for SwitchComponent {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        self.with_component(cx, |root, cx| root.take_values(cx))
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        self.with_component(cx, |root, cx| root.invoke_action(cx))
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        self.with_component(cx, |root, cx| root.append_to_response(cx))
    }

    fn is_structural(&self) -> bool {
        true
    }
}
