use crate::source_map::Range;
use crate::span::Span;

pub const W_TAG_UNMATCHED_OPEN: &str = "W_TAG_UNMATCHED_OPEN";
pub const W_TAG_UNMATCHED_CLOSE: &str = "W_TAG_UNMATCHED_CLOSE";

/// A tag that was left as literal text because it could not be paired.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub range: Range,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, range: Range, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            span,
            range,
            code,
            message: message.into(),
        }
    }
}
