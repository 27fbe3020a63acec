use ng_source::Span;

use crate::declarations::Declarations;
use crate::error::FormatError;
use crate::error::FormatErrorKind;
use crate::error::SourceKind;
use crate::nodes::BindingValue;
use crate::nodes::Bindings;
use crate::nodes::ElementNode;
use crate::nodes::Node;
use crate::nodes::NodeTree;

/// Parser directives whose content is never parsed.
const DIRECTIVES: [Directive; 2] = [Directive::Raw, Directive::Comment];

/// Keywords of the legacy `<wo name="...">` form, matched without regard to case.
const LEGACY_KEYWORDS: [&str; 2] = ["webobject", "wo"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Raw,
    Comment,
}

impl Directive {
    fn name(self) -> &'static str {
        match self {
            Directive::Raw => "raw",
            Directive::Comment => "comment",
        }
    }
}

/// The tag a child sequence is waiting for.
#[derive(Clone, Debug)]
struct Closer {
    name: String,
    ignore_case: bool,
}

/// A position in the template source. Copied freely; never shared between parses.
#[derive(Clone, Copy, Debug)]
struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(self) -> &'a str {
        &self.source[self.pos..]
    }

    fn rest_bytes(self) -> &'a [u8] {
        &self.source.as_bytes()[self.pos..]
    }

    fn is_at_end(self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_at(self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn starts_with(self, prefix: &str) -> bool {
        self.rest_bytes().starts_with(prefix.as_bytes())
    }

    fn starts_with_ignore_case(self, prefix: &str) -> bool {
        self.rest_bytes()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
    }

    fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.source.len());
    }

    fn skip_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(|b| b.is_ascii_whitespace());
    }

    /// Consume bytes while `predicate` holds and return them.
    fn take_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        self.skip_while(predicate);
        &self.source[start..self.pos]
    }
}

/// Length of a `name:` prefix at `bytes`, if it starts with one.
fn namespace_prefix_len(bytes: &[u8]) -> Option<usize> {
    let letters = bytes.iter().take_while(|b| b.is_ascii_alphabetic()).count();
    (letters > 0 && bytes.get(letters) == Some(&b':')).then_some(letters + 1)
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn is_directive_terminator(b: Option<u8>) -> bool {
    matches!(b, Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r'))
}

fn is_closing_terminator(b: Option<u8>) -> bool {
    b.is_some_and(|b| b == b'>' || b.is_ascii_whitespace())
}

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    declarations: &'a Declarations,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(source: &'a str, declarations: &'a Declarations) -> Self {
        Self {
            cursor: Cursor { source, pos: 0 },
            declarations,
        }
    }

    pub fn parse(mut self) -> Result<NodeTree, FormatError> {
        let children = self.parse_children(None, 0)?;
        Ok(NodeTree::new(
            children,
            Span::from_bounds(0, self.cursor.source.len()),
        ))
    }

    fn error(&self, kind: FormatErrorKind, offset: usize) -> FormatError {
        FormatError::new(kind, offset, SourceKind::Template, self.cursor.source)
    }

    fn parse_children(
        &mut self,
        closer: Option<&Closer>,
        opened_at: usize,
    ) -> Result<Vec<Node>, FormatError> {
        let mut children = Vec::new();
        let mut text_start = self.cursor.pos;

        loop {
            if self.cursor.is_at_end() {
                if let Some(closer) = closer {
                    return Err(self.error(
                        FormatErrorKind::UnclosedElement(closer.name.clone()),
                        opened_at,
                    ));
                }
                self.flush_text(&mut children, text_start);
                return Ok(children);
            }

            if self.cursor.peek() != Some(b'<') {
                self.cursor.advance(1);
                continue;
            }

            let tag_start = self.cursor.pos;

            if self.cursor.starts_with("</") {
                if let Some(closer) = closer {
                    if self.matches_closing_tag(closer) {
                        self.flush_text(&mut children, text_start);
                        self.consume_closing_tag(closer)?;
                        return Ok(children);
                    }
                }
                self.check_closing_tag(closer)?;
                self.cursor.advance(2);
                continue;
            }

            if let Some(directive) = self.directive_at() {
                self.flush_text(&mut children, text_start);
                children.push(self.parse_directive(directive)?);
            } else if let Some(prefix) = namespace_prefix_len(&self.cursor.rest_bytes()[1..]) {
                if self
                    .cursor
                    .peek_at(1 + prefix)
                    .is_some_and(|b| b.is_ascii_whitespace())
                {
                    return Err(self.error(FormatErrorKind::SpaceAfterNamespace, tag_start));
                }
                if !self.cursor.peek_at(1 + prefix).is_some_and(|b| b.is_ascii_alphanumeric()) {
                    self.cursor.advance(1);
                    continue;
                }
                self.flush_text(&mut children, text_start);
                children.push(self.parse_element()?);
            } else if let Some(keyword) = self.legacy_keyword_at() {
                self.flush_text(&mut children, text_start);
                children.push(self.parse_legacy_element(keyword)?);
            } else {
                self.cursor.advance(1);
                continue;
            }

            text_start = self.cursor.pos;
        }
    }

    fn flush_text(&self, children: &mut Vec<Node>, start: usize) {
        let end = self.cursor.pos;
        if end > start {
            children.push(Node::Text {
                text: self.cursor.source[start..end].to_string(),
                span: Span::from_bounds(start, end),
            });
        }
    }

    /// Reject closing tags that are almost certainly typos rather than text.
    fn check_closing_tag(&self, closer: Option<&Closer>) -> Result<(), FormatError> {
        let after_slash = &self.cursor.rest_bytes()[2..];

        let spaces = after_slash
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        if spaces > 0 && namespace_prefix_len(&after_slash[spaces..]).is_some() {
            return Err(self.error(FormatErrorKind::SpaceAfterClosingBracket, self.cursor.pos));
        }

        if let Some(prefix) = namespace_prefix_len(after_slash) {
            let name_len = prefix
                + after_slash[prefix..]
                    .iter()
                    .take_while(|&&b| is_identifier_byte(b))
                    .count();
            let name = &self.cursor.rest()[2..2 + name_len];
            let kind = match closer {
                Some(closer) => FormatErrorKind::MismatchedClosingTag(closer.name.clone()),
                None => FormatErrorKind::UnopenedClosingTag(name.to_string()),
            };
            return Err(self.error(kind, self.cursor.pos));
        }

        Ok(())
    }

    fn matches_closing_tag(&self, closer: &Closer) -> bool {
        let mut cursor = self.cursor;
        cursor.advance(2);
        let matches = if closer.ignore_case {
            cursor.starts_with_ignore_case(&closer.name)
        } else {
            cursor.starts_with(&closer.name)
        };
        matches && is_closing_terminator(cursor.peek_at(closer.name.len()))
    }

    fn consume_closing_tag(&mut self, closer: &Closer) -> Result<(), FormatError> {
        self.cursor.advance(2 + closer.name.len());
        self.cursor.skip_whitespace();
        self.expect(b'>')
    }

    fn expect(&mut self, expected: u8) -> Result<(), FormatError> {
        match self.cursor.peek() {
            Some(b) if b == expected => {
                self.cursor.advance(1);
                Ok(())
            }
            Some(_) => {
                let found = self.cursor.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                Err(self.error(
                    FormatErrorKind::Expected {
                        expected: char::from(expected),
                        found,
                    },
                    self.cursor.pos,
                ))
            }
            None => Err(self.error(
                FormatErrorKind::UnexpectedEnd(char::from(expected)),
                self.cursor.pos,
            )),
        }
    }

    fn directive_at(&self) -> Option<Directive> {
        DIRECTIVES.into_iter().find(|directive| {
            let opener = format!("<p:{}", directive.name());
            self.cursor.starts_with_ignore_case(&opener)
                && is_directive_terminator(self.cursor.peek_at(opener.len()))
        })
    }

    /// Scan a `<p:raw>`/`<p:comment>` block verbatim, honouring nested blocks of the same name.
    fn parse_directive(&mut self, directive: Directive) -> Result<Node, FormatError> {
        let start = self.cursor.pos;
        let opener = format!("<p:{}", directive.name());
        let closer = format!("</p:{}", directive.name());
        let unclosed =
            |parser: &Self| parser.error(FormatErrorKind::UnclosedDirective(directive.name().to_string()), start);

        if self.skip_tag()? {
            return Ok(Self::directive_node(directive, String::new(), start, self.cursor.pos));
        }

        let content_start = self.cursor.pos;
        let mut depth = 1usize;

        while !self.cursor.is_at_end() {
            if self.cursor.starts_with_ignore_case(&closer)
                && is_closing_terminator(self.cursor.peek_at(closer.len()))
            {
                depth -= 1;
                if depth == 0 {
                    let content_end = self.cursor.pos;
                    self.cursor.advance(closer.len());
                    self.cursor.skip_whitespace();
                    if self.cursor.peek() != Some(b'>') {
                        return Err(unclosed(self));
                    }
                    self.cursor.advance(1);
                    let text = self.cursor.source[content_start..content_end].to_string();
                    return Ok(Self::directive_node(directive, text, start, self.cursor.pos));
                }
                self.cursor.advance(closer.len());
            } else if self.cursor.starts_with_ignore_case(&opener)
                && is_directive_terminator(self.cursor.peek_at(opener.len()))
            {
                if !self.skip_tag()? {
                    depth += 1;
                }
            } else {
                self.cursor.advance(1);
            }
        }

        Err(unclosed(self))
    }

    /// Move past the `>` that ends the tag under the cursor. Returns whether it was self-closing.
    fn skip_tag(&mut self) -> Result<bool, FormatError> {
        let start = self.cursor.pos;
        let Some(end) = self.cursor.rest().find('>') else {
            return Err(self.error(FormatErrorKind::UnexpectedEnd('>'), start));
        };
        self.cursor.advance(end + 1);
        Ok(end > 0 && self.cursor.source.as_bytes()[self.cursor.pos - 2] == b'/')
    }

    fn directive_node(directive: Directive, text: String, start: usize, end: usize) -> Node {
        let span = Span::from_bounds(start, end);
        match directive {
            Directive::Raw => Node::Raw { text, span },
            Directive::Comment => Node::Comment { text, span },
        }
    }

    /// `<ns:Type bindings>children</ns:Type>` or `<ns:Type bindings />`.
    fn parse_element(&mut self) -> Result<Node, FormatError> {
        let start = self.cursor.pos;
        self.cursor.advance(1);
        let namespace = self.cursor.take_while(|b| b.is_ascii_alphabetic());
        self.cursor.advance(1);
        let type_name = self.cursor.take_while(is_identifier_byte);
        if type_name.is_empty() {
            return Err(self.error(
                FormatErrorKind::MissingElementType(namespace.to_string()),
                self.cursor.pos,
            ));
        }

        let bindings = self.parse_bindings()?;
        let closer = Closer {
            name: format!("{namespace}:{type_name}"),
            ignore_case: false,
        };
        let children = self.parse_element_body(&closer, start)?;

        Ok(Node::Element(ElementNode {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            bindings,
            children,
            is_inline: true,
            declared_name: type_name.to_string(),
            span: Span::from_bounds(start, self.cursor.pos),
        }))
    }

    fn legacy_keyword_at(&self) -> Option<&'static str> {
        let mut cursor = self.cursor;
        cursor.advance(1);
        LEGACY_KEYWORDS.into_iter().find(|keyword| {
            cursor.starts_with_ignore_case(keyword)
                && cursor
                    .peek_at(keyword.len())
                    .is_some_and(|b| b.is_ascii_whitespace())
        })
    }

    /// `<wo name="X">children</wo>`, where `X` names an entry in the declarations.
    fn parse_legacy_element(&mut self, keyword: &str) -> Result<Node, FormatError> {
        let start = self.cursor.pos;
        self.cursor.advance(1);
        let written_keyword = self.cursor.take_while(|b| b.is_ascii_alphabetic());

        let attributes = self.parse_bindings()?;
        let name = attributes
            .get("name")
            .and_then(BindingValue::unquoted)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                self.error(
                    FormatErrorKind::MissingLegacyName(written_keyword.to_string()),
                    start,
                )
            })?
            .to_string();

        let Some(declaration) = self.declarations.get(&name) else {
            return Err(self.error(FormatErrorKind::UndeclaredElement(name), start));
        };

        let closer = Closer {
            name: keyword.to_string(),
            ignore_case: true,
        };
        let children = self.parse_element_body(&closer, start)?;

        Ok(Node::Element(ElementNode {
            namespace: declaration.namespace.clone(),
            type_name: declaration.type_name.clone(),
            bindings: declaration.bindings.clone(),
            children,
            is_inline: false,
            declared_name: name,
            span: Span::from_bounds(start, self.cursor.pos),
        }))
    }

    /// Everything after the bindings: `/>`, or `>` followed by children up to `closer`.
    fn parse_element_body(&mut self, closer: &Closer, start: usize) -> Result<Vec<Node>, FormatError> {
        self.cursor.skip_whitespace();
        if self.cursor.peek() == Some(b'/') {
            self.cursor.advance(1);
            self.expect(b'>')?;
            return Ok(Vec::new());
        }
        self.expect(b'>')?;
        self.parse_children(Some(closer), start)
    }

    fn parse_bindings(&mut self) -> Result<Bindings, FormatError> {
        let mut bindings = Bindings::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Err(self.error(FormatErrorKind::UnexpectedEnd('>'), self.cursor.pos)),
                Some(b'>' | b'/') => return Ok(bindings),
                Some(_) => {}
            }

            let key_start = self.cursor.pos;
            let key = self
                .cursor
                .take_while(|b| !(b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/')));
            if key.is_empty() {
                return Err(self.error(FormatErrorKind::ExpectedBindingKey, key_start));
            }

            self.cursor.skip_whitespace();
            let value = if self.cursor.peek() == Some(b'=') {
                self.cursor.advance(1);
                self.cursor.skip_whitespace();
                self.parse_binding_value()?
            } else {
                BindingValue::BooleanPresence
            };

            bindings.insert(key.to_string(), value);
        }
    }

    fn parse_binding_value(&mut self) -> Result<BindingValue, FormatError> {
        let start = self.cursor.pos;

        if let Some(quote @ (b'"' | b'\'')) = self.cursor.peek() {
            self.cursor.advance(1);
            loop {
                match self.cursor.peek() {
                    None => return Err(self.error(FormatErrorKind::UnclosedQuotedValue, start)),
                    Some(b'\\') => self.cursor.advance(2),
                    Some(b) if b == quote => {
                        self.cursor.advance(1);
                        break;
                    }
                    Some(_) => self.cursor.advance(1),
                }
            }
            return Ok(BindingValue::Quoted(
                self.cursor.source[start..self.cursor.pos].to_string(),
            ));
        }

        let value = self
            .cursor
            .take_while(|b| !(b.is_ascii_whitespace() || matches!(b, b'>' | b'/')));
        if value.is_empty() {
            return Err(self.error(FormatErrorKind::ExpectedBindingValue, start));
        }
        Ok(BindingValue::Bare(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_declarations;

    fn parse(source: &str) -> NodeTree {
        Parser::new(source, &Declarations::default()).parse().unwrap()
    }

    fn parse_err(source: &str) -> FormatError {
        Parser::new(source, &Declarations::default())
            .parse()
            .unwrap_err()
    }

    fn element(node: &Node) -> &ElementNode {
        match node {
            Node::Element(element) => element,
            other => panic!("expected element, got {other:?}"),
        }
    }

    mod text {
        use super::*;

        #[test]
        fn test_plain_html_is_one_text_node() {
            let source = "<div>Hello</div>";
            let tree = parse(source);
            assert_eq!(
                tree.children(),
                [Node::Text {
                    text: source.to_string(),
                    span: Span::from_bounds(0, source.len()),
                }]
            );
            assert_eq!(tree.root().span(), Span::from_bounds(0, 16));
        }

        #[test]
        fn test_empty_template() {
            assert!(parse("").children().is_empty());
        }

        #[test]
        fn test_lookalikes_stay_text() {
            let source = "<a href=\"x:y\">a < b</a> <wo:> </wo> <b:>";
            let tree = parse(source);
            assert_eq!(tree.children().len(), 1);
        }

        #[test]
        fn test_non_ascii_text_around_elements() {
            let tree = parse("Blóm <wo:String value=\"ævi\" /> ☃");
            assert_eq!(tree.children().len(), 3);
            let Node::Text { text, .. } = &tree.children()[2] else {
                panic!("expected text");
            };
            assert_eq!(text, " ☃");
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn test_inline_self_closing() {
            let tree = parse("<wo:String value=\"$name\" />");
            let node = element(&tree.children()[0]);
            assert_eq!(node.namespace, "wo");
            assert_eq!(node.type_name, "String");
            assert_eq!(node.declared_name, "String");
            assert!(node.is_inline);
            assert!(node.children.is_empty());
            assert_eq!(
                node.bindings["value"],
                BindingValue::Quoted("\"$name\"".to_string())
            );
            assert_eq!(node.span, Span::from_bounds(0, 27));
        }

        #[test]
        fn test_binding_forms() {
            let tree = parse("<wo:TextField value=$name size=20 disabled name='x y' />");
            let bindings = &element(&tree.children()[0]).bindings;
            assert_eq!(bindings["value"], BindingValue::Bare("$name".to_string()));
            assert_eq!(bindings["size"], BindingValue::Bare("20".to_string()));
            assert_eq!(bindings["disabled"], BindingValue::BooleanPresence);
            assert_eq!(bindings["name"], BindingValue::Quoted("'x y'".to_string()));
        }

        #[test]
        fn test_escaped_quote_in_value() {
            let tree = parse(r#"<wo:String value="say \"hi\" > there"/>"#);
            assert_eq!(
                element(&tree.children()[0]).bindings["value"],
                BindingValue::Quoted(r#""say \"hi\" > there""#.to_string())
            );
        }

        #[test]
        fn test_nested_children() {
            let source = "<ul><wo:Repetition count=\"$n\"><li><wo:String value=\"$i\"/></li></wo:Repetition></ul>";
            let tree = parse(source);
            assert_eq!(tree.children().len(), 3);
            let repetition = element(&tree.children()[1]);
            assert_eq!(repetition.type_name, "Repetition");
            assert_eq!(repetition.children.len(), 3);
            assert_eq!(repetition.span.slice(source), Some(&source[4..source.len() - 5]));
        }

        #[test]
        fn test_closing_tag_allows_whitespace() {
            let tree = parse("<wo:if condition=$a>x</wo:if >");
            assert_eq!(element(&tree.children()[0]).children.len(), 1);
        }

        #[test]
        fn test_same_type_nesting() {
            let tree = parse("<wo:if condition=$a><wo:if condition=$b>x</wo:if></wo:if>");
            let outer = element(&tree.children()[0]);
            let inner = element(&outer.children[0]);
            assert_eq!(inner.children.len(), 1);
        }
    }

    mod legacy {
        use super::*;

        #[test]
        fn test_legacy_element_uses_declaration() {
            let declarations =
                parse_declarations("greeting : String { value = name; }").unwrap();
            let tree = Parser::new("<webobject name=\"greeting\"></webobject>", &declarations)
                .parse()
                .unwrap();
            let node = element(&tree.children()[0]);
            assert_eq!(node.namespace, "wo");
            assert_eq!(node.type_name, "String");
            assert_eq!(node.declared_name, "greeting");
            assert!(!node.is_inline);
            assert_eq!(node.bindings["value"], BindingValue::Bare("name".to_string()));
        }

        #[test]
        fn test_legacy_short_form_nesting_and_case() {
            let declarations =
                parse_declarations("a : Conditional { condition = x; } b : String { value = y; }")
                    .unwrap();
            let tree = Parser::new(
                "<WO name=a><wo name=b/> text </Wo>",
                &declarations,
            )
            .parse()
            .unwrap();
            let outer = element(&tree.children()[0]);
            assert_eq!(outer.type_name, "Conditional");
            assert_eq!(outer.children.len(), 2);
            assert_eq!(element(&outer.children[0]).declared_name, "b");
        }

        #[test]
        fn test_undeclared_name_is_an_error() {
            let error = parse_err("<webobject name=\"Missing\"></webobject>");
            assert_eq!(
                error.kind(),
                &FormatErrorKind::UndeclaredElement("Missing".to_string())
            );
        }

        #[test]
        fn test_missing_name() {
            let error = parse_err("<wo id=\"x\"></wo>");
            assert_eq!(
                error.kind(),
                &FormatErrorKind::MissingLegacyName("wo".to_string())
            );
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn test_raw_content_is_not_parsed() {
            let tree = parse("<p:raw><wo:String value=\"$x\" /></p:raw>");
            assert_eq!(
                tree.children(),
                [Node::Raw {
                    text: "<wo:String value=\"$x\" />".to_string(),
                    span: Span::from_bounds(0, 39),
                }]
            );
        }

        #[test]
        fn test_comment_directive() {
            let tree = parse("a<P:Comment class=\"x\">hidden <wo:if></P:COMMENT>b");
            assert_eq!(tree.children().len(), 3);
            assert!(
                matches!(&tree.children()[1], Node::Comment { text, .. } if text == "hidden <wo:if>")
            );
        }

        #[test]
        fn test_nested_raw() {
            let tree = parse("<p:raw>a<p:raw>b</p:raw>c</p:raw>");
            assert!(
                matches!(&tree.children()[0], Node::Raw { text, .. } if text == "a<p:raw>b</p:raw>c")
            );
        }

        #[test]
        fn test_self_closing_directive_is_empty() {
            let tree = parse("<p:raw/>x");
            assert!(matches!(&tree.children()[0], Node::Raw { text, .. } if text.is_empty()));
            assert_eq!(tree.children().len(), 2);
        }

        #[test]
        fn test_unclosed_directive() {
            let error = parse_err("<p:raw>never closed");
            assert_eq!(
                error.kind(),
                &FormatErrorKind::UnclosedDirective("raw".to_string())
            );
            assert_eq!(error.offset(), 0);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_unclosed_element_reports_opening_position() {
            let error = parse_err("<p>\n  <wo:if condition=$a>\n text");
            insta::assert_snapshot!(
                error.to_string(),
                @"Unexpected end of template. Expected closing tag </wo:if> (line 2, column 3)"
            );
        }

        #[test]
        fn test_mismatched_closing_tag() {
            let error = parse_err("<wo:if condition=$a></wo:else>");
            assert_eq!(
                error.kind(),
                &FormatErrorKind::MismatchedClosingTag("wo:if".to_string())
            );
            assert_eq!(error.offset(), 20);
        }

        #[test]
        fn test_stray_closing_tag() {
            let error = parse_err("text</wo:if>");
            assert_eq!(
                error.kind(),
                &FormatErrorKind::UnopenedClosingTag("wo:if".to_string())
            );
        }

        #[test]
        fn test_space_after_closing_bracket() {
            let error = parse_err("<wo:if condition=$a></ wo:if>");
            assert_eq!(error.kind(), &FormatErrorKind::SpaceAfterClosingBracket);
        }

        #[test]
        fn test_space_after_namespace() {
            let error = parse_err("<wo: String value=$x/>");
            assert_eq!(error.kind(), &FormatErrorKind::SpaceAfterNamespace);
        }

        #[test]
        fn test_binding_errors() {
            assert_eq!(
                parse_err("<wo:String value=/>").kind(),
                &FormatErrorKind::ExpectedBindingValue
            );
            assert_eq!(
                parse_err("<wo:String value=\"abc />").kind(),
                &FormatErrorKind::UnclosedQuotedValue
            );
            assert_eq!(
                parse_err("<wo:String =x />").kind(),
                &FormatErrorKind::ExpectedBindingKey
            );
            assert_eq!(
                parse_err("<wo:String value=$x").kind(),
                &FormatErrorKind::UnexpectedEnd('>')
            );
        }

        #[test]
        fn test_slash_must_close_tag() {
            insta::assert_snapshot!(
                parse_err("<wo:String value=$x /x>").to_string(),
                @"Expected '>' but found 'x' (line 1, column 22)"
            );
        }
    }

    mod invariants {
        use super::*;

        fn assert_spans_within(nodes: &[Node], len: usize) {
            for node in nodes {
                assert!(node.span().end_usize() <= len, "{node:?} exceeds {len}");
                assert_spans_within(node.children(), len);
            }
        }

        #[test]
        fn test_spans_never_exceed_input() {
            let sources = [
                "<div>Hello</div>",
                "<wo:if condition=$a>x<wo:String value=$b/>y</wo:if>",
                "<p:raw>a</p:raw><p:comment/>",
                "a<wo:Repetition list=$l item=$i>\n<wo:String value=$i/>\n</wo:Repetition>b",
            ];
            for source in sources {
                let tree = parse(source);
                assert_spans_within(tree.children(), source.len());
            }
        }

        #[test]
        fn test_unbalanced_input_is_always_an_error() {
            for source in [
                "<wo:if condition=$a>",
                "<wo:if condition=$a><wo:if condition=$b></wo:if>",
                "<wo:if condition=$a></wo:String>",
                "<wo:String",
            ] {
                assert!(Parser::new(source, &Declarations::default()).parse().is_err(), "{source}");
            }
        }
    }
}
