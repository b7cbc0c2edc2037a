use crate::tokenizer::Token;

/// Where unmatched tags are assumed to sit when pairing is ambiguous.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum InvalidTagPos {
    /// Closing tags left to right, each taking the innermost open tag.
    #[default]
    Outer,
    /// Closing tags right to left, each taking the outermost open tag.
    MiddleTag,
}

/// An open tag and its closing tag, as indices into the token list.
///
/// Either side is `None` for a tag the matcher had to drop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchingTag {
    pub keyword: String,
    pub open: Option<usize>,
    pub close: Option<usize>,
}

impl MatchingTag {
    fn is_finalized(&self) -> bool {
        self.open.is_some() && self.close.is_some()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchResult {
    /// Finalized pairs, ordered by open index.
    pub pairs: Vec<MatchingTag>,
    /// Unmatched closes first (in scan order), then unclosed opens.
    pub invalid: Vec<MatchingTag>,
}

impl MatchResult {
    /// Whether the token at `index` belongs to a finalized pair.
    pub fn is_paired(&self, index: usize) -> bool {
        self.pairs
            .iter()
            .any(|pair| pair.open == Some(index) || pair.close == Some(index))
    }
}

/// Pairs closing tags with open tags of the same keyword.
pub fn match_tags(tokens: &[Token], policy: InvalidTagPos) -> MatchResult {
    let mut matching: Vec<MatchingTag> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is_open())
        .map(|(idx, token)| MatchingTag {
            keyword: token.keyword.clone(),
            open: Some(idx),
            close: None,
        })
        .collect();
    let mut invalid = Vec::new();

    let closes: Vec<usize> = match policy {
        InvalidTagPos::Outer => (0..tokens.len()).collect(),
        InvalidTagPos::MiddleTag => (0..tokens.len()).rev().collect(),
    };

    for close in closes {
        let token = &tokens[close];
        if token.is_open() {
            continue;
        }

        let candidate = {
            let compatible = |&m: &usize| {
                let possible = &matching[m];
                possible.close.is_none()
                    && possible.keyword == token.keyword
                    && possible.open.is_some_and(|open| {
                        open < close && is_valid_nesting(tokens, &matching, open, close)
                    })
            };
            match policy {
                InvalidTagPos::Outer => (0..matching.len()).rev().find(compatible),
                InvalidTagPos::MiddleTag => (0..matching.len()).find(compatible),
            }
        };

        match candidate {
            Some(m) => matching[m].close = Some(close),
            None => {
                tracing::debug!(
                    keyword = %token.keyword,
                    offset = token.span.start,
                    "dropping unmatched closing tag"
                );
                invalid.push(MatchingTag {
                    keyword: token.keyword.clone(),
                    open: None,
                    close: Some(close),
                });
            }
        }
    }

    let (pairs, unclosed): (Vec<_>, Vec<_>) =
        matching.into_iter().partition(MatchingTag::is_finalized);
    for tag in &unclosed {
        if let Some(open) = tag.open {
            tracing::debug!(
                keyword = %tag.keyword,
                offset = tokens[open].span.start,
                "dropping unclosed opening tag"
            );
        }
    }
    invalid.extend(unclosed);
    tracing::trace!(pairs = pairs.len(), invalid = invalid.len(), "matched tags");

    MatchResult { pairs, invalid }
}

/// Rejects `open..close` when it would cross a pair that is already finalized.
///
/// Only the two crossing shapes below are checked; a stray open that could be
/// re-paired to rescue a later tag is not reconsidered in middle mode.
fn is_valid_nesting(tokens: &[Token], matching: &[MatchingTag], open: usize, close: usize) -> bool {
    let open_at = tokens[open].span.start;
    let close_at = tokens[close].span.start;
    matching.iter().all(|nesting| {
        let (Some(n_open), Some(n_close)) = (nesting.open, nesting.close) else {
            return true;
        };
        let n_open_at = tokens[n_open].span.start;
        let n_close_at = tokens[n_close].span.start;
        let closes_inside = n_open_at < open_at && n_close_at > open_at && n_close_at < close_at;
        let opens_inside = n_close_at > close_at && n_open_at < close_at && n_open_at > open_at;
        !(closes_inside || opens_inside)
    })
}
