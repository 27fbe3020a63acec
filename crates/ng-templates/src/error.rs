use std::fmt;
use std::sync::Arc;

use ng_source::ByteOffset;
use ng_source::Diagnostic;
use ng_source::DiagnosticRenderer;
use ng_source::LineCol;
use ng_source::LineIndex;
use ng_source::Span;
use thiserror::Error;

/// Which of the two inputs to `compile` an error points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Template,
    Declarations,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("Unexpected end of template, expected '{0}'")]
    UnexpectedEnd(char),

    #[error("Expected '{expected}' but found '{found}'")]
    Expected { expected: char, found: char },

    #[error("Unexpected end of template. Expected closing tag </{0}>")]
    UnclosedElement(String),

    #[error("Unexpected closing tag. Expected </{0}>")]
    MismatchedClosingTag(String),

    #[error("Unexpected closing tag </{0}>")]
    UnopenedClosingTag(String),

    #[error("Unexpected space after '</' in closing tag")]
    SpaceAfterClosingBracket,

    #[error("Unexpected space after ':' in namespaced tag")]
    SpaceAfterNamespace,

    #[error("Unclosed parser directive <p:{0}>")]
    UnclosedDirective(String),

    #[error("Expected element type after '{0}:'")]
    MissingElementType(String),

    #[error("Expected binding key")]
    ExpectedBindingKey,

    #[error("Expected binding value")]
    ExpectedBindingValue,

    #[error("Unclosed quoted binding value")]
    UnclosedQuotedValue,

    #[error("Missing 'name' attribute on <{0}> tag")]
    MissingLegacyName(String),

    #[error("No declaration for dynamic element (or component) named '{0}'")]
    UndeclaredElement(String),

    #[error("Missing ':' for declaration")]
    MissingColon,

    #[error("Missing tag name")]
    MissingTagName,

    #[error("Missing element name")]
    MissingTypeName,

    #[error("Duplicate tag name '{0}'")]
    DuplicateTagName(String),

    #[error("Missing '{{' for declaration")]
    MissingBlock,

    #[error("Unclosed declaration block")]
    UnclosedBlock,

    #[error("Unclosed comment")]
    UnclosedComment,

    #[error("Unclosed quoted string")]
    UnclosedString,

    #[error("Invalid line. No equal in line")]
    MissingEquals,

    #[error("Missing binding in line")]
    MissingBindingKey,

    #[error("Missing value in line")]
    MissingBindingValue,
}

impl FormatErrorKind {
    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            Self::UnexpectedEnd(_) | Self::Expected { .. } => "F100",
            Self::UnclosedElement(_) => "F101",
            Self::MismatchedClosingTag(_) | Self::UnopenedClosingTag(_) => "F102",
            Self::SpaceAfterClosingBracket | Self::SpaceAfterNamespace => "F103",
            Self::UnclosedDirective(_) => "F104",
            Self::MissingElementType(_) => "F105",
            Self::ExpectedBindingKey | Self::ExpectedBindingValue | Self::UnclosedQuotedValue => {
                "F106"
            }
            Self::MissingLegacyName(_) => "F107",
            Self::UndeclaredElement(_) => "F108",
            Self::MissingColon | Self::MissingTagName | Self::MissingTypeName | Self::MissingBlock => {
                "F200"
            }
            Self::DuplicateTagName(_) => "F201",
            Self::UnclosedBlock | Self::UnclosedComment | Self::UnclosedString => "F202",
            Self::MissingEquals | Self::MissingBindingKey | Self::MissingBindingValue => "F203",
        }
    }
}

/// A syntax error in a template or declaration source.
///
/// Only the byte offset is recorded while parsing. Line and column are derived
/// from the retained source when the error is displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatError {
    kind: FormatErrorKind,
    offset: usize,
    source_kind: SourceKind,
    source: Arc<str>,
}

impl FormatError {
    pub(crate) fn new(
        kind: FormatErrorKind,
        offset: usize,
        source_kind: SourceKind,
        source: &str,
    ) -> Self {
        Self {
            kind,
            offset: offset.min(source.len()),
            source_kind,
            source: Arc::from(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn diagnostic_code(&self) -> &'static str {
        self.kind.diagnostic_code()
    }

    #[must_use]
    pub fn span(&self) -> Span {
        let end = self
            .source
            .get(self.offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(self.offset, |c| self.offset + c.len_utf8());
        Span::from_bounds(self.offset, end)
    }

    #[must_use]
    pub fn line_col(&self) -> LineCol {
        LineIndex::from_text(&self.source).to_line_col(ByteOffset::from_usize(self.offset))
    }

    /// Render the error against its source with a caret under the offending position.
    #[must_use]
    pub fn render(&self, path: &str) -> String {
        let message = self.kind.to_string();
        let diagnostic = Diagnostic::error(
            &self.source,
            path,
            self.diagnostic_code(),
            &message,
            self.span(),
        );
        DiagnosticRenderer::plain().render(&diagnostic)
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.line_col();
        write!(
            f,
            "{} (line {}, column {})",
            self.kind,
            position.line(),
            position.column()
        )
    }
}

impl std::error::Error for FormatError {}
