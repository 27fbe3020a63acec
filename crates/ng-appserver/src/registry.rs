use std::fmt;
use std::sync::Arc;

use ng_source::FxHashMap;
use ng_templates::DECLARATION_NAMESPACE;

use crate::component::Component;
use crate::component::MapComponent;
use crate::elements::ActionUrl;
use crate::elements::Associations;
use crate::elements::ComponentContent;
use crate::elements::Conditional;
use crate::elements::DynamicElement;
use crate::elements::Element;
use crate::elements::Form;
use crate::elements::GenericContainer;
use crate::elements::GenericElement;
use crate::elements::Hyperlink;
use crate::elements::PopUpButton;
use crate::elements::Repetition;
use crate::elements::StringElement;
use crate::elements::SubmitButton;
use crate::elements::SwitchComponent;
use crate::elements::TextArea;
use crate::elements::TextField;
use crate::error::BindingConfigurationError;

pub type ElementFactory = fn(
    &str,
    Associations,
    Option<Arc<Element>>,
) -> Result<Box<dyn DynamicElement>, BindingConfigurationError>;

pub type ComponentFactory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Maps tag names to dynamic elements and components.
///
/// Element names are looked up per namespace. Aliases are plain entries that
/// share a factory.
pub struct ElementRegistry {
    elements: FxHashMap<(String, String), ElementFactory>,
    components: FxHashMap<String, ComponentFactory>,
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<_> = self.components.keys().collect();
        components.sort();
        f.debug_struct("ElementRegistry")
            .field("elements", &self.elements.len())
            .field("components", &components)
            .finish()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }
}

impl ElementRegistry {
    /// A registry without the built-in elements.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            elements: FxHashMap::default(),
            components: FxHashMap::default(),
        }
    }

    fn register_builtins(&mut self) {
        fn boxed<E: DynamicElement + 'static>(
            element: Result<E, BindingConfigurationError>,
        ) -> Result<Box<dyn DynamicElement>, BindingConfigurationError> {
            Ok(Box::new(element?))
        }

        let builtins: [(&[&str], ElementFactory); 14] = [
            (&["String", "str"], |n, a, c| boxed(StringElement::new(n, a, c))),
            (&["Conditional", "if"], |n, a, c| boxed(Conditional::new(n, a, c))),
            (&["Repetition", "repetition"], |n, a, c| boxed(Repetition::new(n, a, c))),
            (&["SwitchComponent", "switch"], |n, a, c| {
                boxed(SwitchComponent::new(n, a, c))
            }),
            (&["ComponentContent", "content"], |n, a, c| {
                boxed(ComponentContent::new(n, a, c))
            }),
            (&["GenericContainer", "container"], |n, a, c| {
                boxed(GenericContainer::new(n, a, c))
            }),
            (&["Hyperlink", "link"], |n, a, c| boxed(Hyperlink::new(n, a, c))),
            (&["Form", "form"], |n, a, c| boxed(Form::new(n, a, c))),
            (&["SubmitButton", "submit"], |n, a, c| boxed(SubmitButton::new(n, a, c))),
            (&["TextField", "textfield"], |n, a, c| boxed(TextField::new(n, a, c))),
            (&["Text", "text"], |n, a, c| boxed(TextArea::new(n, a, c))),
            (&["PopUpButton", "popUpButton", "popup"], |n, a, c| {
                boxed(PopUpButton::new(n, a, c))
            }),
            (&["GenericElement", "element"], |n, a, c| boxed(GenericElement::new(n, a, c))),
            (&["ActionURL", "actionURL"], |n, a, c| boxed(ActionUrl::new(n, a, c))),
        ];

        for (names, factory) in builtins {
            for name in names {
                self.register_element(DECLARATION_NAMESPACE, name, factory);
            }
        }
    }

    pub fn register_element(&mut self, namespace: &str, name: &str, factory: ElementFactory) {
        self.elements
            .insert((namespace.to_string(), name.to_string()), factory);
    }

    /// Register a component class. Its template is loaded as `<name>.html`.
    pub fn register_component<C, F>(&mut self, name: &str, factory: F)
    where
        C: Component + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.components.insert(
            name.to_string(),
            Arc::new(move || Box::new(factory()) as Box<dyn Component>),
        );
    }

    #[must_use]
    pub fn element(&self, namespace: &str, name: &str) -> Option<ElementFactory> {
        self.elements
            .get(&(namespace.to_string(), name.to_string()))
            .copied()
    }

    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// A fresh component of class `name`. Names without a registered class
    /// get a [`MapComponent`].
    #[must_use]
    pub fn create_component(&self, name: &str) -> Box<dyn Component> {
        match self.components.get(name) {
            Some(factory) => factory(),
            None => Box::new(MapComponent::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serde_json::Value;

    use super::*;
    use crate::association::Association;

    #[derive(Debug, Default)]
    struct Counter {
        count: i64,
    }

    impl Component for Counter {
        fn value_for_key(&self, key: &str) -> Value {
            match key {
                "count" => json!(self.count),
                _ => Value::Null,
            }
        }

        fn take_value_for_key(&mut self, key: &str, value: Value) {
            if key == "count" {
                self.count = value.as_i64().unwrap_or_default();
            }
        }
    }

    #[test]
    fn test_aliases_share_factories() {
        let registry = ElementRegistry::default();
        for name in [
            "String", "str", "if", "repetition", "switch", "content", "container", "link", "form",
            "submit", "textfield", "Text", "text", "PopUpButton", "popUpButton", "popup",
            "GenericElement", "element", "ActionURL", "actionURL",
        ] {
            assert!(registry.element("wo", name).is_some(), "{name}");
        }
        assert!(registry.element("wo", "Missing").is_none());
        assert!(registry.element("other", "String").is_none());
    }

    #[test]
    fn test_factory_checks_bindings() {
        let registry = ElementRegistry::default();
        let factory = registry.element("wo", "str").unwrap();
        assert_eq!(
            factory("str", Associations::new(), None).unwrap_err(),
            BindingConfigurationError::Missing {
                element: "str".to_string(),
                binding: "value",
            }
        );

        let mut associations = Associations::new();
        associations.insert("value".to_string(), Association::constant("x"));
        assert!(factory("str", associations, None).is_ok());
    }

    #[test]
    fn test_components() {
        let mut registry = ElementRegistry::empty();
        registry.register_component("Counter", Counter::default);
        assert!(registry.has_component("Counter"));

        let mut counter = registry.create_component("Counter");
        counter.take_value_for_key("count", json!(4));
        assert_eq!(counter.value_for_key("count"), json!(4));

        let fallback = registry.create_component("Unregistered");
        assert_eq!(fallback.value_for_key("count"), Value::Null);
    }
}
