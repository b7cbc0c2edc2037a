mod diagnostic;
mod matcher;
mod rewrite;
mod source_map;
mod span;
mod tokenizer;
mod vocabulary;

pub use diagnostic::{Diagnostic, W_TAG_UNMATCHED_CLOSE, W_TAG_UNMATCHED_OPEN};
pub use matcher::{InvalidTagPos, MatchResult, MatchingTag, match_tags};
pub use rewrite::{
    Conversion, RenderOptions, bbcode_to_html, bbcode_to_html_sanitized, convert, sanitize_html,
};
pub use source_map::{Position, Range, SourceMap};
pub use span::Span;
pub use tokenizer::{Param, Token, TokenKind, tokenize};
pub use vocabulary::{BbCode, Vocabulary, VocabularyError, default_vocabulary};
