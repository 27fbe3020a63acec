//! The element tree a template is turned into, and the built-in dynamic
//! elements.

mod component_content;
mod action_url;
mod conditional;
mod form;
mod generic_container;
mod generic_element;
pub(crate) mod html;
mod hyperlink;
mod pop_up_button;
mod repetition;
mod string;
mod submit_button;
mod switch_component;
mod text_area;
mod text_field;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use action_url::ActionUrl;
pub use component_content::ComponentContent;
pub use conditional::Conditional;
pub use form::Form;
pub use generic_container::GenericContainer;
pub use generic_element::GenericElement;
pub use hyperlink::Hyperlink;
pub use pop_up_button::PopUpButton;
pub use repetition::Repetition;
pub use string::StringElement;
pub use submit_button::SubmitButton;
pub use switch_component::SwitchComponent;
pub use text_area::TextArea;
pub use text_field::TextField;

use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::error::StateError;

pub type Associations = BTreeMap<String, Association>;

/// Behaviour of a dynamic tag in each of the three request phases.
pub trait DynamicElement: Send + Sync + fmt::Debug {
    fn take_values(&self, _cx: &mut Context<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    fn invoke_action(&self, _cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        Ok(None)
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError>;

    /// Structural elements only decide whether and how often their content is
    /// visited. They produce no markup of their own.
    fn is_structural(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub enum Element {
    Text(String),
    /// Children visited in order, each one path segment further along.
    Group(Vec<Element>),
    Dynamic(Box<dyn DynamicElement>),
    Component(ComponentReference),
}

impl Element {
    /// Wrap parsed children as the content of an element.
    #[must_use]
    pub fn content(mut children: Vec<Element>) -> Option<Arc<Element>> {
        match children.len() {
            0 => None,
            1 => children.pop().map(Arc::new),
            _ => Some(Arc::new(Element::Group(children))),
        }
    }

    pub fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self {
            Element::Text(_) => Ok(()),
            Element::Group(children) => {
                cx.element_path_mut().add_branch();
                for child in children {
                    child.take_values(cx)?;
                    cx.element_path_mut().increment();
                }
                cx.element_path_mut().remove_branch()?;
                Ok(())
            }
            Element::Dynamic(element) => element.take_values(cx),
            Element::Component(reference) => reference.take_values(cx),
        }
    }

    pub fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        match self {
            Element::Text(_) => Ok(None),
            Element::Group(children) => {
                cx.element_path_mut().add_branch();
                for child in children {
                    if let Some(results) = child.invoke_action(cx)? {
                        cx.element_path_mut().remove_branch()?;
                        return Ok(Some(results));
                    }
                    cx.element_path_mut().increment();
                }
                cx.element_path_mut().remove_branch()?;
                Ok(None)
            }
            Element::Dynamic(element) => element.invoke_action(cx),
            Element::Component(reference) => reference.invoke_action(cx),
        }
    }

    pub fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self {
            Element::Text(text) => {
                cx.append_content_string(text);
                Ok(())
            }
            Element::Group(children) => {
                cx.element_path_mut().add_branch();
                for child in children {
                    child.append_to_response(cx)?;
                    cx.element_path_mut().increment();
                }
                cx.element_path_mut().remove_branch()?;
                Ok(())
            }
            Element::Dynamic(element) => element.append_to_response(cx),
            Element::Component(reference) => reference.append_to_response(cx),
        }
    }

    /// Number of dynamic elements and component references in the tree.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        match self {
            Element::Text(_) => 0,
            Element::Group(children) => children.iter().map(Element::dynamic_count).sum(),
            Element::Dynamic(_) | Element::Component(_) => 1,
        }
    }
}

/// A place in a template where another component is embedded.
#[derive(Debug)]
pub struct ComponentReference {
    name: String,
    bindings: Arc<Associations>,
    content: Option<Arc<Element>>,
}

impl ComponentReference {
    #[must_use]
    pub fn new(name: &str, bindings: Associations, content: Option<Arc<Element>>) -> Self {
        Self {
            name: name.to_string(),
            bindings: Arc::new(bindings),
            content,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        cx.in_component(&self.name, &self.bindings, self.content.as_ref(), |root, cx| {
            root.take_values(cx)
        })
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        cx.in_component(&self.name, &self.bindings, self.content.as_ref(), |root, cx| {
            root.invoke_action(cx)
        })
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        cx.in_component(&self.name, &self.bindings, self.content.as_ref(), |root, cx| {
            root.append_to_response(cx)
        })
    }
}

/// Remove a binding an element cannot do without.
pub(crate) fn required(
    associations: &mut Associations,
    element: &str,
    binding: &'static str,
) -> Result<Association, BindingConfigurationError> {
    associations
        .remove(binding)
        .ok_or_else(|| BindingConfigurationError::Missing {
            element: element.to_string(),
            binding,
        })
}

/// The single value submitted under `name`. Empty strings read as null.
pub(crate) fn single_form_value(
    cx: &Context<'_>,
    name: &str,
) -> Result<Option<serde_json::Value>, StateError> {
    match cx.request().form_values(name) {
        [] => Ok(None),
        [value] if value.is_empty() => Ok(Some(serde_json::Value::Null)),
        [value] => Ok(Some(serde_json::Value::String(value.clone()))),
        values => Err(StateError::MultipleFormValues {
            name: name.to_string(),
            count: values.len(),
        }),
    }
}

/// Remove the bindings of a group where exactly one must be bound.
pub(crate) fn exactly_one_of<const N: usize>(
    associations: &mut Associations,
    element: &str,
    names: [&'static str; N],
    listed: &'static str,
) -> Result<[Option<Association>; N], BindingConfigurationError> {
    let found = names.map(|name| associations.remove(name));
    match found.iter().filter(|a| a.is_some()).count() {
        0 => Err(BindingConfigurationError::MissingOneOf {
            element: element.to_string(),
            bindings: listed,
        }),
        1 => Ok(found),
        _ => Err(BindingConfigurationError::Conflicting {
            element: element.to_string(),
            bindings: listed,
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_wrapping() {
        assert!(Element::content(Vec::new()).is_none());

        let single = Element::content(vec![Element::Text("a".to_string())]).unwrap();
        assert!(matches!(*single, Element::Text(_)));

        let many = Element::content(vec![
            Element::Text("a".to_string()),
            Element::Text("b".to_string()),
        ])
        .unwrap();
        assert!(matches!(&*many, Element::Group(children) if children.len() == 2));
    }

    #[test]
    fn test_exactly_one_of() {
        let mut associations = Associations::new();
        let result = exactly_one_of(&mut associations, "Repetition", ["list", "count"], "list, count");
        assert!(matches!(result, Err(BindingConfigurationError::MissingOneOf { .. })));

        associations.insert("list".to_string(), Association::constant(1));
        associations.insert("count".to_string(), Association::constant(1));
        let result = exactly_one_of(&mut associations, "Repetition", ["list", "count"], "list, count");
        assert!(matches!(result, Err(BindingConfigurationError::Conflicting { .. })));
    }
}
