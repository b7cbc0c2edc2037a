use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Parameter grammar shared by the opening-tag pattern and the parameter scan.
pub(crate) const PARAM_PATTERN: &str = r#"([0-9A-Za-z_]*?)=("[^"]*?"|'[^']*?'|„[^„“]*?“)"#;

const DEFAULT_BB_CODES: &[(&str, Option<&str>)] = &[
    ("b", None),
    ("strong", None),
    ("i", None),
    ("em", None),
    ("u", None),
    ("s", None),
    ("p", None),
    ("span", None),
    ("h1", None),
    ("h2", None),
    ("h3", None),
    ("h4", None),
    ("h5", None),
    ("h6", None),
    ("ul", None),
    ("ol", None),
    ("li", None),
    ("link", Some("a")),
    ("lc_mention", None),
];

static DEFAULT_VOCABULARY: Lazy<Vocabulary> = Lazy::new(|| {
    let entries = DEFAULT_BB_CODES.iter().map(|&(bb, tag)| match tag {
        Some(tag) => BbCode::with_tag(bb, tag),
        None => BbCode::new(bb),
    });
    Vocabulary::new(entries).unwrap_or_else(|err| {
        tracing::error!(%err, "default vocabulary rejected");
        Vocabulary::empty()
    })
});

/// The built-in keyword table used by the rich-text input.
pub fn default_vocabulary() -> &'static Vocabulary {
    &DEFAULT_VOCABULARY
}

/// Maps a bracket keyword (`link`) to the element it is rewritten into (`a`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BbCode {
    pub bb: String,
    pub tag: String,
}

impl BbCode {
    /// An entry whose element name equals its keyword.
    pub fn new(bb: impl Into<String>) -> Self {
        let bb = bb.into();
        Self {
            tag: bb.clone(),
            bb,
        }
    }

    pub fn with_tag(bb: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            bb: bb.into(),
            tag: tag.into(),
        }
    }

    /// Element name length minus keyword length, in bytes.
    pub fn length_difference(&self) -> isize {
        self.tag.len() as isize - self.bb.len() as isize
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("empty bracket keyword")]
    EmptyKeyword,

    #[error("invalid bracket keyword: {0:?}")]
    InvalidKeyword(String),

    #[error("invalid tag name {tag:?} for keyword {bb:?}")]
    InvalidTagName { bb: String, tag: String },

    #[error("duplicate bracket keyword: {0:?}")]
    DuplicateKeyword(String),

    #[error("tag pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Clone, Debug)]
pub(crate) struct Patterns {
    pub(crate) open: Regex,
    pub(crate) close: Regex,
    pub(crate) param: Regex,
}

/// An immutable, ordered keyword table with its compiled tag patterns.
///
/// Keywords are stored lowercased and resolved case-insensitively. The
/// declaration order decides which alternative the patterns try first.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    entries: Vec<BbCode>,
    patterns: Option<Patterns>,
}

impl Vocabulary {
    pub fn new(entries: impl IntoIterator<Item = BbCode>) -> Result<Self, VocabularyError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::new();
        for entry in entries {
            let entry = validate_entry(entry)?;
            if !seen.insert(entry.bb.clone()) {
                return Err(VocabularyError::DuplicateKeyword(entry.bb));
            }
            validated.push(entry);
        }
        let patterns = if validated.is_empty() {
            None
        } else {
            Some(compile_patterns(&validated)?)
        };
        Ok(Self {
            entries: validated,
            patterns,
        })
    }

    /// A vocabulary that recognizes nothing; conversions return their input.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            patterns: None,
        }
    }

    pub fn entries(&self) -> &[BbCode] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, keyword: &str) -> Option<&BbCode> {
        let keyword = keyword.to_lowercase();
        self.entries.iter().find(|entry| entry.bb == keyword)
    }

    pub(crate) fn patterns(&self) -> Option<&Patterns> {
        self.patterns.as_ref()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        default_vocabulary().clone()
    }
}

fn validate_entry(entry: BbCode) -> Result<BbCode, VocabularyError> {
    if entry.bb.is_empty() {
        return Err(VocabularyError::EmptyKeyword);
    }
    let keyword_ok = entry.bb.chars().all(|ch| {
        !ch.is_whitespace() && !matches!(ch, '[' | ']' | '/' | '=' | '"' | '\'' | '„' | '“')
    });
    if !keyword_ok {
        return Err(VocabularyError::InvalidKeyword(entry.bb));
    }
    let tag_ok = !entry.tag.is_empty()
        && entry
            .tag
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !tag_ok {
        return Err(VocabularyError::InvalidTagName {
            bb: entry.bb,
            tag: entry.tag,
        });
    }
    Ok(BbCode {
        bb: entry.bb.to_lowercase(),
        tag: entry.tag,
    })
}

fn compile_patterns(entries: &[BbCode]) -> Result<Patterns, regex::Error> {
    let keywords = entries
        .iter()
        .map(|entry| regex::escape(&entry.bb))
        .collect::<Vec<_>>()
        .join("|");
    // Only the keyword is case-insensitive; parameter text is kept as written.
    let open = format!(r"\[(?i:({keywords}))((?: {PARAM_PATTERN})*)\]");
    let close = format!(r"\[/(?i:({keywords}))\]");
    Ok(Patterns {
        open: Regex::new(&open)?,
        close: Regex::new(&close)?,
        param: Regex::new(PARAM_PATTERN)?,
    })
}
