use crate::span::Span;
use crate::vocabulary::Vocabulary;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Open,
    Close,
}

/// A `key=value` pair written inside an opening tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub name: String,
    /// Value without its surrounding quotes.
    pub value: String,
    /// The pair exactly as written, quotes included.
    pub raw: String,
}

/// An opening or closing bracket tag found in the source text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
    /// Vocabulary keyword, lowercased.
    pub keyword: String,
    /// Element name the keyword is rewritten into.
    pub tag: String,
    pub params: Vec<Param>,
}

impl Token {
    pub fn is_open(&self) -> bool {
        self.kind == TokenKind::Open
    }

    pub fn length_difference(&self) -> isize {
        self.tag.len() as isize - self.keyword.len() as isize
    }

    /// Parameters re-joined as they appear inside a tag, each preceded by a space.
    pub fn param_string(&self) -> String {
        self.params
            .iter()
            .map(|param| format!(" {}", param.raw))
            .collect()
    }
}

/// Scans `text` for opening and closing tags of the vocabulary, in text order.
pub fn tokenize(text: &str, vocabulary: &Vocabulary) -> Vec<Token> {
    let Some(patterns) = vocabulary.patterns() else {
        return Vec::new();
    };

    let mut tokens = Vec::new();
    for caps in patterns.open.captures_iter(text) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(entry) = vocabulary.lookup(keyword.as_str()) else {
            continue;
        };
        let params: Vec<Param> = caps
            .get(2)
            .map(|run| {
                patterns
                    .param
                    .captures_iter(run.as_str())
                    .filter_map(|param| parse_param(&param))
                    .collect()
            })
            .unwrap_or_default();
        tokens.push(Token {
            span: Span::from(whole.range()),
            kind: TokenKind::Open,
            keyword: entry.bb.clone(),
            tag: entry.tag.clone(),
            params,
        });
    }

    let open_count = tokens.len();
    for caps in patterns.close.captures_iter(text) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let span = Span::from(whole.range());
        // A closing tag quoted inside a parameter value is part of that opening tag.
        if tokens[..open_count]
            .iter()
            .any(|open| open.span.contains(span))
        {
            continue;
        }
        let Some(entry) = vocabulary.lookup(keyword.as_str()) else {
            continue;
        };
        tokens.push(Token {
            span,
            kind: TokenKind::Close,
            keyword: entry.bb.clone(),
            tag: entry.tag.clone(),
            params: Vec::new(),
        });
    }

    tokens.sort_by_key(|token| token.span.start);
    tracing::trace!(count = tokens.len(), "tokenized bracket tags");
    tokens
}

fn parse_param(caps: &regex::Captures<'_>) -> Option<Param> {
    let raw = caps.get(0)?.as_str();
    let name = caps.get(1)?.as_str();
    let quoted = caps.get(2)?.as_str();
    Some(Param {
        name: name.to_string(),
        value: unquote(quoted).to_string(),
        raw: raw.to_string(),
    })
}

fn unquote(quoted: &str) -> &str {
    let mut chars = quoted.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => quoted,
    }
}
