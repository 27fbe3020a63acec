//! A component-oriented web page engine.
//!
//! Pages are trees of components. Each component pairs a template, compiled
//! once through [`ng_templates`] and shared, with per-instance state. A
//! request to a component action URL (`/wo/<contextID>.<senderID>`) restores
//! the page it was rendered from and runs three traversals of the element
//! tree, in order:
//!
//! 1. take values: form fields write the submitted values into components
//! 2. invoke action: the element whose path matches the sender performs its
//!    action, which may produce the next page
//! 3. append to response: the resulting page renders itself
//!
//! Every traversal computes the same [`ElementPath`] for the same element, so
//! a path printed into a form field name or link during rendering identifies
//! that element again on the next request.

mod association;
mod component;
mod context;
mod element_path;
mod elements;
mod engine;
mod error;
mod loader;
pub mod logging;
mod page_cache;
mod registry;
mod request;
mod scope;
mod session;
mod template;
mod value;

pub use association::Association;
pub use component::ActionResults;
pub use component::Component;
pub use component::ComponentInstance;
pub use component::MapComponent;
pub use context::Context;
pub use element_path::ElementPath;
pub use elements::ActionUrl;
pub use elements::Associations;
pub use elements::ComponentContent;
pub use elements::ComponentReference;
pub use elements::Conditional;
pub use elements::DynamicElement;
pub use elements::Element;
pub use elements::Form;
pub use elements::GenericContainer;
pub use elements::GenericElement;
pub use elements::Hyperlink;
pub use elements::PopUpButton;
pub use elements::Repetition;
pub use elements::StringElement;
pub use elements::SubmitButton;
pub use elements::SwitchComponent;
pub use elements::TextArea;
pub use elements::TextField;
pub use engine::parse_component_action_url;
pub use engine::Engine;
pub use engine::EngineBuilder;
pub use error::AssociationError;
pub use error::BindingConfigurationError;
pub use error::EngineError;
pub use error::LookupError;
pub use error::StateError;
pub use loader::DirectoryLoader;
pub use loader::MemoryLoader;
pub use loader::ResourceLoader;
pub use loader::TEMPLATE_NAMESPACE;
pub use page_cache::PageCache;
pub use registry::ComponentFactory;
pub use registry::ElementFactory;
pub use registry::ElementRegistry;
pub use request::Request;
pub use request::Response;
pub use scope::ComponentScope;
pub use session::ContextIds;
pub use session::Page;
pub use session::Session;
pub use session::SessionStore;
pub use template::Template;
pub use value::display_string;
pub use value::is_truthy;
pub use value::take_value_for_key_path;
pub use value::value_for_key_path;
pub use value::Value;
