use std::sync::Arc;

use serde_json::Value;

use crate::association::Association;
use crate::component::ActionResults;
use crate::element_path::ElementPath;
use crate::elements::Associations;
use crate::elements::Element;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::error::StateError;
use crate::request::Request;
use crate::request::Response;
use crate::scope::ComponentScope;
use crate::session::ContextIds;

/// Everything one walk over a page needs: where it is, who it is acting
/// for, and where output goes.
#[derive(Debug)]
pub struct Context<'r> {
    engine: &'r Engine,
    request: &'r Request,
    context_ids: &'r mut ContextIds,
    response: Response,
    element_path: ElementPath,
    sender_id: Option<ElementPath>,
    context_id: Option<String>,
    components: ComponentScope<'r>,
    in_form: bool,
}

impl<'r> Context<'r> {
    pub fn new(
        engine: &'r Engine,
        request: &'r Request,
        context_ids: &'r mut ContextIds,
        components: ComponentScope<'r>,
    ) -> Self {
        Self {
            engine,
            request,
            context_ids,
            response: Response::new(),
            element_path: ElementPath::new(),
            sender_id: None,
            context_id: None,
            components,
            in_form: false,
        }
    }

    #[must_use]
    pub fn with_sender_id(mut self, sender_id: ElementPath) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &'r Engine {
        self.engine
    }

    #[must_use]
    pub fn request(&self) -> &'r Request {
        self.request
    }

    #[must_use]
    pub fn element_path(&self) -> &ElementPath {
        &self.element_path
    }

    pub fn element_path_mut(&mut self) -> &mut ElementPath {
        &mut self.element_path
    }

    #[must_use]
    pub fn sender_id(&self) -> Option<&ElementPath> {
        self.sender_id.as_ref()
    }

    /// Whether the element being visited is the one the request was sent from.
    #[must_use]
    pub fn current_element_is_sender(&self) -> bool {
        self.sender_id.as_ref() == Some(&self.element_path)
    }

    /// The id this response is known by. Allocated on first use, which also
    /// marks the page for saving in the page cache.
    pub fn context_id(&mut self) -> &str {
        let context_ids = &mut *self.context_ids;
        self.context_id.get_or_insert_with(|| context_ids.next_id())
    }

    #[must_use]
    pub fn allocated_context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// URL that routes a request back to the element currently being visited.
    pub fn component_action_url(&mut self) -> String {
        let path = self.element_path.to_string();
        format!("/wo/{}.{path}", self.context_id())
    }

    #[must_use]
    pub fn in_form(&self) -> bool {
        self.in_form
    }

    pub fn set_in_form(&mut self, in_form: bool) {
        self.in_form = in_form;
    }

    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn append_content_string(&mut self, text: &str) {
        self.response.append_content_string(text);
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    #[must_use]
    pub fn components(&self) -> &ComponentScope<'r> {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentScope<'r> {
        &mut self.components
    }

    /// Read an association against the current component.
    #[must_use]
    pub fn value(&self, association: &Association) -> Value {
        association.value(&self.components, self.components.depth())
    }

    pub fn set_value(&mut self, association: &Association, value: Value) -> Result<(), StateError> {
        let depth = self.components.depth();
        association.set_value(&mut self.components, depth, value)
    }

    pub fn invoke(&mut self, association: &Association) -> Result<Option<ActionResults>, EngineError> {
        let depth = self.components.depth();
        association.invoke(&mut self.components, depth)
    }

    /// Visit the template of the component `name` placed at the current path.
    ///
    /// The instance is reused when the current component already has one at
    /// this path, and created otherwise. Bound values are pulled into it
    /// before `visit` runs and pushed back afterwards.
    pub(crate) fn in_component<R>(
        &mut self,
        name: &str,
        bindings: &Arc<Associations>,
        content: Option<&Arc<Element>>,
        visit: impl FnOnce(&Element, &mut Self) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let key = self.element_path.to_string();
        let instance = match self.components.take_child(&key) {
            Some(instance) if instance.name() == name => instance,
            _ => self
                .engine
                .instantiate(name)?
                .with_bindings(Arc::clone(bindings))
                .with_content(content.cloned()),
        };

        let template = Arc::clone(instance.template());
        self.components.enter(key, instance);
        let result = self.visit_entered(template.root(), visit);
        self.components.leave()?;
        result
    }

    fn visit_entered<R>(
        &mut self,
        root: &Element,
        visit: impl FnOnce(&Element, &mut Self) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        self.pull_bindings()?;
        let result = visit(root, self)?;
        if self
            .components
            .current()
            .component()
            .synchronizes_variables_with_bindings()
        {
            self.push_bindings()?;
        }
        Ok(result)
    }

    fn pull_bindings(&mut self) -> Result<(), StateError> {
        let depth = self.components.depth();
        let parent = depth.checked_sub(1).ok_or(StateError::ScopeUnderflow)?;
        let bindings = Arc::clone(self.components.current().bindings());
        for (name, association) in bindings.iter() {
            let value = association.value(&self.components, parent);
            self.components
                .current_mut()
                .component_mut()
                .take_value_for_key(name, value);
        }
        Ok(())
    }

    fn push_bindings(&mut self) -> Result<(), StateError> {
        let depth = self.components.depth();
        let parent = depth.checked_sub(1).ok_or(StateError::ScopeUnderflow)?;
        let bindings = Arc::clone(self.components.current().bindings());
        for (name, association) in bindings.iter().filter(|(_, a)| a.is_settable()) {
            let value = self.components.current().component().value_for_key(name);
            association.set_value(&mut self.components, parent, value)?;
        }
        Ok(())
    }
}
