use std::fmt;
use std::sync::Arc;

use ng_source::FxHashMap;
use serde_json::Map;
use serde_json::Value;

use crate::association::Association;
use crate::elements::Associations;
use crate::elements::Element;
use crate::error::EngineError;
use crate::error::LookupError;
use crate::request::Response;
use crate::template::Template;

/// Application state behind a template.
///
/// Key-value access is the only way elements and associations see a
/// component; they never know its concrete type.
pub trait Component: Send + fmt::Debug {
    fn value_for_key(&self, key: &str) -> Value;

    fn take_value_for_key(&mut self, key: &str, value: Value);

    fn invoke_action(&mut self, action: &str) -> Result<Option<ActionResults>, EngineError> {
        Err(LookupError::Action {
            component: std::any::type_name::<Self>().to_string(),
            action: action.to_string(),
        }
        .into())
    }

    /// Whether bound values are copied back to the parent after each phase.
    fn synchronizes_variables_with_bindings(&self) -> bool {
        true
    }
}

/// A component that is nothing but a bag of values.
///
/// Used for template-only components and in tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapComponent {
    values: Map<String, Value>,
}

impl MapComponent {
    /// Non-object values produce an empty component.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl Component for MapComponent {
    fn value_for_key(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or(Value::Null)
    }

    fn take_value_for_key(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

/// What an action hands back to the request handler.
#[derive(Debug)]
pub enum ActionResults {
    Page(ComponentInstance),
    PageNamed(String),
    Response(Response),
}

/// One live component: its state, its template, and the instances of the
/// components it has placed on the page so far.
///
/// Child instances are keyed by the element path of the reference that
/// created them, so the same reference finds the same child again in every
/// phase and in later requests against a cached page.
#[derive(Debug)]
pub struct ComponentInstance {
    name: String,
    component: Box<dyn Component>,
    template: Arc<Template>,
    pub(crate) children: FxHashMap<String, ComponentInstance>,
    bindings: Arc<Associations>,
    content: Option<Arc<Element>>,
}

impl ComponentInstance {
    #[must_use]
    pub fn new(name: &str, component: Box<dyn Component>, template: Arc<Template>) -> Self {
        Self {
            name: name.to_string(),
            component,
            template,
            children: FxHashMap::default(),
            bindings: Arc::new(Associations::new()),
            content: None,
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Arc<Associations>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: Option<Arc<Element>>) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    #[must_use]
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    #[must_use]
    pub fn bindings(&self) -> &Arc<Associations> {
        &self.bindings
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Association> {
        self.bindings.get(name)
    }

    #[must_use]
    pub fn content(&self) -> Option<&Arc<Element>> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn child(&self, key: &str) -> Option<&ComponentInstance> {
        self.children.get(key)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
