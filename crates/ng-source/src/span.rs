use crate::position::ByteOffset;
use crate::position::LineCol;
use crate::position::LineIndex;

/// A half-open `[start, start + length)` byte range into a template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn from_parts(start: usize, length: usize) -> Self {
        let start_u32 = u32::try_from(start).unwrap_or(u32::MAX);
        let length_u32 = u32::try_from(length).unwrap_or(u32::MAX.saturating_sub(start_u32));
        Span::new(start_u32, length_u32)
    }

    /// Construct a span from integer bounds expressed as byte offsets.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::from_parts(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    #[must_use]
    pub fn length(self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn length_usize(self) -> usize {
        self.length as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn start_offset(&self) -> ByteOffset {
        ByteOffset::new(self.start)
    }

    #[must_use]
    pub fn end_offset(&self) -> ByteOffset {
        ByteOffset::new(self.end())
    }

    /// Slice the text this span covers, if the span lies within `source`.
    #[must_use]
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start_usize()..self.end_usize())
    }

    /// Convert this span to start and end line/column positions using the given line index.
    #[must_use]
    pub fn to_line_col(&self, line_index: &LineIndex) -> (LineCol, LineCol) {
        let start = line_index.to_line_col(self.start_offset());
        let end = line_index.to_line_col(self.end_offset());
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bounds() {
        let span = Span::from_bounds(3, 10);
        assert_eq!(span.start(), 3);
        assert_eq!(span.length(), 7);
        assert_eq!(span.end(), 10);
    }

    #[test]
    fn test_from_bounds_inverted_is_empty() {
        let span = Span::from_bounds(10, 3);
        assert_eq!(span.start(), 10);
        assert!(span.is_empty());
    }

    #[test]
    fn test_slice() {
        let source = "<div>Hello</div>";
        assert_eq!(Span::from_bounds(5, 10).slice(source), Some("Hello"));
        assert_eq!(Span::from_bounds(5, 100).slice(source), None);
    }

    #[test]
    fn test_to_line_col() {
        let source = "one\ntwo\nthree";
        let index = LineIndex::from_text(source);
        let (start, end) = Span::from_bounds(4, 9).to_line_col(&index);
        assert_eq!(start, LineCol::new(2, 1));
        assert_eq!(end, LineCol::new(3, 2));
    }
}
