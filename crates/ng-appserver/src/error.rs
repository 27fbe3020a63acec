use ng_templates::FormatError;
use thiserror::Error;

/// A binding value that cannot be turned into an association.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssociationError {
    #[error("Empty key path")]
    EmptyKeyPath,

    #[error("Invalid key path '{path}': {reason}")]
    InvalidKeyPath { path: String, reason: &'static str },

    #[error("Quoted value {0} is missing its closing quote")]
    UnterminatedQuote(String),

    #[error("Invalid escape sequence '\\{escape}' in {value}")]
    InvalidEscape { value: String, escape: char },

    #[error("Dangling '\\' at the end of {0}")]
    DanglingEscape(String),
}

/// An element was declared without a binding it cannot work without, or with
/// bindings that contradict each other.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BindingConfigurationError {
    #[error("<{element}> requires the '{binding}' binding")]
    Missing {
        element: String,
        binding: &'static str,
    },

    #[error("<{element}> requires one of [{bindings}]")]
    MissingOneOf {
        element: String,
        bindings: &'static str,
    },

    #[error("<{element}> accepts only one of [{bindings}]")]
    Conflicting {
        element: String,
        bindings: &'static str,
    },

    #[error("Binding '{binding}' on <{element}>: {source}")]
    Association {
        element: String,
        binding: String,
        #[source]
        source: AssociationError,
    },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("No dynamic element or component named '{namespace}:{name}'")]
    Element { namespace: String, name: String },

    #[error("No template found for component '{0}'")]
    Template(String),

    #[error("Component '{component}' has no action named '{action}'")]
    Action { component: String, action: String },
}

/// An internal invariant was broken. Never swallowed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Page cache already contains an entry for context '{0}'")]
    DuplicateKey(String),

    #[error("Page cache has no entry for context '{0}'")]
    MissingKey(String),

    #[error("No page stored for context '{0}'")]
    PageNotFound(String),

    #[error("Element path popped past its root")]
    PathUnderflow,

    #[error("Component scope popped past the page")]
    ScopeUnderflow,

    #[error("The request contains {count} form values named '{name}', expected at most one")]
    MultipleFormValues { name: String, count: usize },

    #[error("Form value '{value}' for '{name}' does not select an item of the list")]
    InvalidSelection { name: String, value: String },

    #[error("Invalid component action URL '{0}'")]
    InvalidActionUrl(String),

    #[error("No session with id '{0}'")]
    UnknownSession(String),

    #[error("A lock was poisoned by a panicking request")]
    Poisoned,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    BindingConfiguration(#[from] BindingConfigurationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error("Failed to read template resource '{path}': {message}")]
    Io { path: String, message: String },
}

impl EngineError {
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            EngineError::Format(error) => error.diagnostic_code(),
            EngineError::BindingConfiguration(_) => "B100",
            EngineError::Association(_) => "B101",
            EngineError::Lookup(LookupError::Element { .. }) => "L100",
            EngineError::Lookup(LookupError::Template(_)) => "L101",
            EngineError::Lookup(LookupError::Action { .. }) => "L102",
            EngineError::State(_) => "S100",
            EngineError::Io { .. } => "E900",
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StateError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StateError::Poisoned
    }
}

impl<T> From<std::sync::PoisonError<T>> for EngineError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        EngineError::State(StateError::Poisoned)
    }
}
