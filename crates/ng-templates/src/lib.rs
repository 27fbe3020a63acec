//! Template compilation for ng.
//!
//! A template is HTML interleaved with dynamic tags. Dynamic tags come in two
//! forms:
//!
//! - inline: `<wo:String value="$name" />`, bindings written on the tag itself
//! - legacy: `<wo name="greeting"></wo>`, bindings looked up by name in a
//!   separate declaration source
//!
//! [`compile`] turns both sources into an immutable [`NodeTree`]. Nothing is
//! evaluated here: binding values are kept exactly as written and interpreted
//! later, when the tree is turned into elements.
//!
//! ```
//! use ng_templates::{compile, Node};
//!
//! let tree = compile("<p><wo:String value=\"$name\" /></p>", "").unwrap();
//! assert_eq!(tree.children().len(), 3);
//! assert!(matches!(tree.children()[1], Node::Element(_)));
//! ```

mod declarations;
mod error;
mod nodes;
mod parser;

pub use declarations::parse_declarations;
pub use declarations::Declaration;
pub use declarations::Declarations;
pub use declarations::DECLARATION_NAMESPACE;
pub use error::FormatError;
pub use error::FormatErrorKind;
pub use error::SourceKind;
pub use nodes::BindingValue;
pub use nodes::Bindings;
pub use nodes::ElementNode;
pub use nodes::Node;
pub use nodes::NodeTree;
pub use parser::Parser;

/// Compile a template and its declarations into a node tree.
pub fn compile(html: &str, declarations: &str) -> Result<NodeTree, FormatError> {
    let declarations = parse_declarations(declarations)?;
    parse_template(html, &declarations)
}

pub fn parse_template(html: &str, declarations: &Declarations) -> Result<NodeTree, FormatError> {
    Parser::new(html, declarations).parse()
}
