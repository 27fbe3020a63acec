use std::collections::BTreeMap;

use ng_source::Span;

/// The raw right-hand side of a binding, exactly as written.
///
/// Quoted values keep their surrounding quotes. Interpreting them is left to
/// whoever turns bindings into associations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingValue {
    Quoted(String),
    Bare(String),
    BooleanPresence,
}

impl BindingValue {
    /// The written text with any surrounding quotes removed.
    #[must_use]
    pub fn unquoted(&self) -> Option<&str> {
        match self {
            BindingValue::Quoted(text) => Some(strip_quotes(text)),
            BindingValue::Bare(text) => Some(text),
            BindingValue::BooleanPresence => None,
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close => chars.as_str(),
        _ => text,
    }
}

pub type Bindings = BTreeMap<String, BindingValue>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementNode {
    pub namespace: String,
    pub type_name: String,
    pub bindings: Bindings,
    pub children: Vec<Node>,
    pub is_inline: bool,
    pub declared_name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Root { children: Vec<Node>, span: Span },
    Text { text: String, span: Span },
    Comment { text: String, span: Span },
    Raw { text: String, span: Span },
    Element(ElementNode),
}

impl Node {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Node::Root { span, .. }
            | Node::Text { span, .. }
            | Node::Comment { span, .. }
            | Node::Raw { span, .. }
            | Node::Element(ElementNode { span, .. }) => *span,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root { children, .. } | Node::Element(ElementNode { children, .. }) => children,
            Node::Text { .. } | Node::Comment { .. } | Node::Raw { .. } => &[],
        }
    }
}

/// The compiled form of one template. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeTree {
    root: Node,
}

impl NodeTree {
    pub(crate) fn new(children: Vec<Node>, span: Span) -> Self {
        Self {
            root: Node::Root { children, span },
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.root.children()
    }

    /// Depth-first, document-order walk over every node below the root.
    pub fn descendants(&self) -> impl Iterator<Item = &Node> {
        let mut stack: Vec<&Node> = self.children().iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }
}
