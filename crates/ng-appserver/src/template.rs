use ng_templates::ElementNode;
use ng_templates::Node;
use ng_templates::NodeTree;

use crate::association::Association;
use crate::elements::Associations;
use crate::elements::ComponentReference;
use crate::elements::Element;
use crate::engine::Engine;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::error::LookupError;

/// A compiled template, resolved into elements. Shared by every instance of
/// its component.
#[derive(Debug)]
pub struct Template {
    name: String,
    root: Element,
}

impl Template {
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: Element::Group(Vec::new()),
        }
    }

    /// Resolve every element node of `tree` through the engine's registry.
    pub fn build(name: &str, tree: &NodeTree, engine: &Engine) -> Result<Self, EngineError> {
        let children = build_children(tree.children(), engine)?;
        let template = Self {
            name: name.to_string(),
            root: Element::Group(children),
        };
        tracing::debug!(
            template = name,
            dynamic = template.root.dynamic_count(),
            structural = template.structural_count(),
            "built template"
        );
        Ok(template)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always a group, so every page starts with a branch of its own.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Number of elements that only steer traversal.
    #[must_use]
    pub fn structural_count(&self) -> usize {
        fn count(element: &Element) -> usize {
            match element {
                Element::Group(children) => children.iter().map(count).sum(),
                Element::Dynamic(element) => usize::from(element.is_structural()),
                Element::Text(_) | Element::Component(_) => 0,
            }
        }
        count(&self.root)
    }
}

fn build_children(nodes: &[Node], engine: &Engine) -> Result<Vec<Element>, EngineError> {
    let mut elements = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text { text, .. } | Node::Raw { text, .. } => {
                elements.push(Element::Text(text.clone()));
            }
            Node::Comment { text, .. } => {
                elements.push(Element::Text(format!("<!--{text}-->")));
            }
            Node::Element(element) => elements.push(build_element(element, engine)?),
            Node::Root { children, .. } => elements.extend(build_children(children, engine)?),
        }
    }
    Ok(elements)
}

fn build_element(node: &ElementNode, engine: &Engine) -> Result<Element, EngineError> {
    let mut associations = Associations::new();
    for (binding, value) in &node.bindings {
        let association = Association::from_binding(value, node.is_inline).map_err(|source| {
            BindingConfigurationError::Association {
                element: node.type_name.clone(),
                binding: binding.clone(),
                source,
            }
        })?;
        associations.insert(binding.clone(), association);
    }

    let content = Element::content(build_children(&node.children, engine)?);

    if let Some(factory) = engine.registry().element(&node.namespace, &node.type_name) {
        return Ok(Element::Dynamic(factory(&node.type_name, associations, content)?));
    }

    if engine.has_component(&node.type_name) {
        return Ok(Element::Component(ComponentReference::new(
            &node.type_name,
            associations,
            content,
        )));
    }

    Err(LookupError::Element {
        namespace: node.namespace.clone(),
        name: node.type_name.clone(),
    }
    .into())
}
