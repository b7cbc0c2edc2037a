use std::ops::Range;

/// Byte range of a tag in the text it was scanned from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Range of this span after earlier edits moved the text by `drift` bytes.
    pub(crate) fn shifted(&self, drift: isize) -> Range<usize> {
        let start = self.start.saturating_add_signed(drift);
        start..start + self.len()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}
