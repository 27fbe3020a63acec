//! Parser for declaration files (`.wod`).
//!
//! ```text
//! /* block comments */
//! greeting : String {
//!     value = "Hello \"world\""; // line comment
//!     escapeHTML = false;
//! }
//! ```
//!
//! Comments and quoted literals are masked out before any structure is looked
//! for, so `{`, `;` or `//` inside a string never confuse the splitter. The mask
//! keeps every byte at its original offset, which lets errors point into the
//! unmodified source.

use std::ops::Range;

use ng_source::FxHashMap;

use crate::error::FormatError;
use crate::error::FormatErrorKind;
use crate::error::SourceKind;
use crate::nodes::BindingValue;
use crate::nodes::Bindings;

/// Namespace given to every element declared in a declaration file.
pub const DECLARATION_NAMESPACE: &str = "wo";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub namespace: String,
    pub type_name: String,
    pub bindings: Bindings,
    pub is_inline: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations {
    by_name: FxHashMap<String, Declaration>,
}

impl Declarations {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.by_name.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.by_name.values()
    }
}

pub fn parse_declarations(source: &str) -> Result<Declarations, FormatError> {
    DeclarationParser::new(source)?.parse()
}

struct DeclarationParser<'a> {
    source: &'a str,
    /// Same length as `source`; comments blanked, literal contents replaced with `_`.
    masked: String,
    /// Byte ranges of quoted literals, quotes included, in source order.
    literals: Vec<Range<usize>>,
}

impl<'a> DeclarationParser<'a> {
    fn new(source: &'a str) -> Result<Self, FormatError> {
        let mut masked = String::with_capacity(source.len());
        let mut literals = Vec::new();
        let mut chars = source.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            match c {
                '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                    chars.next();
                    masked.push_str("  ");
                    let mut closed = false;
                    while let Some((_, inner)) = chars.next() {
                        if inner == '*' && chars.peek().is_some_and(|&(_, next)| next == '/') {
                            chars.next();
                            masked.push_str("  ");
                            closed = true;
                            break;
                        }
                        blank(&mut masked, inner);
                    }
                    if !closed {
                        return Err(error(FormatErrorKind::UnclosedComment, idx, source));
                    }
                }
                '/' if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                    masked.push(' ');
                    while let Some(&(_, inner)) = chars.peek() {
                        if inner == '\n' {
                            break;
                        }
                        blank(&mut masked, inner);
                        chars.next();
                    }
                }
                '"' => {
                    masked.push('"');
                    let mut end = None;
                    while let Some((inner_idx, inner)) = chars.next() {
                        match inner {
                            '\\' => {
                                fill(&mut masked, inner);
                                if let Some((_, escaped)) = chars.next() {
                                    fill(&mut masked, escaped);
                                }
                            }
                            '"' => {
                                masked.push('"');
                                end = Some(inner_idx + 1);
                                break;
                            }
                            _ => fill(&mut masked, inner),
                        }
                    }
                    let Some(end) = end else {
                        return Err(error(FormatErrorKind::UnclosedString, idx, source));
                    };
                    literals.push(idx..end);
                }
                _ => masked.push(c),
            }
        }

        Ok(Self {
            source,
            masked,
            literals,
        })
    }

    fn parse(&self) -> Result<Declarations, FormatError> {
        let mut declarations = Declarations::default();
        let mut cursor = 0;

        while cursor < self.masked.len() {
            let Some(open) = self.find(b'{', cursor) else {
                let (range, _) = self.trimmed_header(cursor..self.masked.len());
                if !range.is_empty() {
                    return Err(self.error(FormatErrorKind::MissingBlock, range.start));
                }
                break;
            };
            let close = self
                .find(b'}', open)
                .ok_or_else(|| self.error(FormatErrorKind::UnclosedBlock, open))?;

            let declaration = self.parse_declaration(cursor..open, open + 1..close)?;
            if declarations.by_name.contains_key(&declaration.name) {
                let (range, _) = self.trimmed_header(cursor..open);
                return Err(self.error(
                    FormatErrorKind::DuplicateTagName(declaration.name),
                    range.start,
                ));
            }
            declarations
                .by_name
                .insert(declaration.name.clone(), declaration);

            cursor = close + 1;
        }

        tracing::trace!("parsed {} declarations", declarations.len());
        Ok(declarations)
    }

    fn parse_declaration(
        &self,
        header: Range<usize>,
        body: Range<usize>,
    ) -> Result<Declaration, FormatError> {
        let (header, header_text) = self.trimmed_header(header);
        let colon = header_text
            .find(':')
            .ok_or_else(|| self.error(FormatErrorKind::MissingColon, header.start))?;

        let name = header_text[..colon].trim();
        if name.is_empty() {
            return Err(self.error(FormatErrorKind::MissingTagName, header.start));
        }
        let type_name = header_text[colon + 1..].trim();
        if type_name.is_empty() {
            return Err(self.error(FormatErrorKind::MissingTypeName, header.start + colon));
        }

        Ok(Declaration {
            name: name.to_string(),
            namespace: DECLARATION_NAMESPACE.to_string(),
            type_name: type_name.to_string(),
            bindings: self.parse_bindings(body)?,
            is_inline: false,
        })
    }

    fn parse_bindings(&self, body: Range<usize>) -> Result<Bindings, FormatError> {
        let mut bindings = Bindings::new();
        let mut start = body.start;

        for line_end in self.masked[body.clone()]
            .match_indices(';')
            .map(|(idx, _)| body.start + idx)
            .chain(std::iter::once(body.end))
        {
            let line = trim_range(&self.masked, start..line_end);
            start = line_end + 1;
            if line.is_empty() {
                continue;
            }

            let equals = self
                .find(b'=', line.start)
                .filter(|&idx| idx < line.end)
                .ok_or_else(|| self.error(FormatErrorKind::MissingEquals, line.start))?;

            let key = trim_range(&self.masked, line.start..equals);
            if key.is_empty() {
                return Err(self.error(FormatErrorKind::MissingBindingKey, line.start));
            }
            let value = trim_range(&self.masked, equals + 1..line.end);
            if value.is_empty() {
                return Err(self.error(FormatErrorKind::MissingBindingValue, equals));
            }

            let value = if self.literals.contains(&value) {
                BindingValue::Quoted(self.source[value].to_string())
            } else {
                BindingValue::Bare(self.restore(value))
            };
            bindings.insert(self.restore(key), value);
        }

        Ok(bindings)
    }

    /// Header text without surrounding whitespace or leftover `;` separators.
    fn trimmed_header(&self, range: Range<usize>) -> (Range<usize>, &str) {
        let mut range = trim_range(&self.masked, range);
        while self.masked.as_bytes().get(range.start) == Some(&b';') {
            range = trim_range(&self.masked, range.start + 1..range.end);
        }
        (range.clone(), &self.masked[range])
    }

    /// Masked text for `range` with any literals inside it put back.
    fn restore(&self, range: Range<usize>) -> String {
        let mut restored = String::with_capacity(range.len());
        let mut cursor = range.start;
        for literal in self
            .literals
            .iter()
            .filter(|literal| literal.start >= range.start && literal.end <= range.end)
        {
            restored.push_str(&self.masked[cursor..literal.start]);
            restored.push_str(&self.source[literal.clone()]);
            cursor = literal.end;
        }
        restored.push_str(&self.masked[cursor..range.end]);
        restored
    }

    fn find(&self, byte: u8, from: usize) -> Option<usize> {
        self.masked.as_bytes()[from..]
            .iter()
            .position(|&b| b == byte)
            .map(|idx| from + idx)
    }

    fn error(&self, kind: FormatErrorKind, offset: usize) -> FormatError {
        error(kind, offset, self.source)
    }
}

fn error(kind: FormatErrorKind, offset: usize, source: &str) -> FormatError {
    FormatError::new(kind, offset, SourceKind::Declarations, source)
}

fn blank(masked: &mut String, c: char) {
    if c == '\n' {
        masked.push('\n');
    } else {
        masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

fn fill(masked: &mut String, c: char) {
    masked.extend(std::iter::repeat_n('_', c.len_utf8()));
}

fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if leading == slice.len() {
        return range.start..range.start;
    }
    range.start + leading..range.end - trailing
}
