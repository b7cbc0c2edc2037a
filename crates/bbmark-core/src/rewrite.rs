use crate::diagnostic::{Diagnostic, W_TAG_UNMATCHED_CLOSE, W_TAG_UNMATCHED_OPEN};
use crate::matcher::{InvalidTagPos, MatchingTag, match_tags};
use crate::source_map::SourceMap;
use crate::tokenizer::{Token, TokenKind, tokenize};
use crate::vocabulary::Vocabulary;
use ammonia::Builder;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderOptions {
    /// Keep the bracket syntax visible next to the generated markup.
    pub show_bb_tags: bool,
    /// Attributes placed on the visible bracket spans, e.g. `style="color: gray"`.
    pub bb_tag_styles: String,
    pub invalid_tag_pos: InvalidTagPos,
    /// Emit empty `<span class="open">`/`<span class="close">` markers when the
    /// bracket syntax is hidden.
    pub marker_spans: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_bb_tags: false,
            bb_tag_styles: String::new(),
            invalid_tag_pos: InvalidTagPos::Outer,
            marker_spans: true,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conversion {
    pub html: String,
    pub tokens: Vec<Token>,
    pub pairs: Vec<MatchingTag>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrites every paired bracket tag in `text` into markup.
pub fn bbcode_to_html(text: &str, vocabulary: &Vocabulary, options: &RenderOptions) -> String {
    convert(text, vocabulary, options).html
}

/// Like [`bbcode_to_html`], then cleaned against an allow-list built from the vocabulary.
pub fn bbcode_to_html_sanitized(
    text: &str,
    vocabulary: &Vocabulary,
    options: &RenderOptions,
) -> String {
    sanitize_html(&bbcode_to_html(text, vocabulary, options), vocabulary)
}

/// Keeps only the elements a vocabulary can produce, plus the bracket spans.
pub fn sanitize_html(raw_html: &str, vocabulary: &Vocabulary) -> String {
    // ammonia strips the contents of these itself and refuses to also allow them.
    let tags: HashSet<&str> = vocabulary
        .entries()
        .iter()
        .map(|entry| entry.tag.as_str())
        .chain(["span"])
        .filter(|tag| !matches!(*tag, "script" | "style"))
        .collect();

    let generic_attributes: HashSet<&str> = ["class", "id", "title"].into_iter().collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("span", ["style"].into_iter().collect::<HashSet<_>>());
    // Link targets arrive as `[link url="..."]` and are copied through as `url`.
    tag_attributes.insert("a", ["url", "href", "target"].into_iter().collect());

    Builder::default()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .clean(raw_html)
        .to_string()
}

/// Tokenizes, matches and rewrites `text`, keeping the intermediate results.
pub fn convert(text: &str, vocabulary: &Vocabulary, options: &RenderOptions) -> Conversion {
    let tokens = tokenize(text, vocabulary);
    let matched = match_tags(&tokens, options.invalid_tag_pos);
    // The drift is how far earlier replacements moved the rest of the text.
    let (html, _drift) = tokens
        .iter()
        .enumerate()
        .filter(|&(idx, _)| matched.is_paired(idx))
        .fold((text.to_string(), 0isize), |(mut html, drift), (_, token)| {
            let replacement = replacement_for(token, options);
            html.replace_range(token.span.shifted(drift), &replacement);
            let drift = drift + replacement.len() as isize - token.span.len() as isize;
            (html, drift)
        });

    let source_map = SourceMap::new(text);
    let mut diagnostics: Vec<Diagnostic> = matched
        .invalid
        .iter()
        .filter_map(|tag| {
            let index = tag.open.or(tag.close)?;
            let token = tokens.get(index)?;
            Some(unmatched_diagnostic(token, &source_map))
        })
        .collect();
    diagnostics.sort_by_key(|diagnostic| diagnostic.span.start);

    Conversion {
        html,
        tokens,
        pairs: matched.pairs,
        diagnostics,
    }
}

fn replacement_for(token: &Token, options: &RenderOptions) -> String {
    match token.kind {
        TokenKind::Open => {
            let params = token.param_string();
            let marker = bracket_span(
                "open",
                &format!("[{}{}]", token.keyword, params),
                options,
            );
            format!("{}<{}{}>", marker, token.tag, params)
        }
        TokenKind::Close => {
            let marker = bracket_span("close", &format!("[/{}]", token.keyword), options);
            format!("</{}>{}", token.tag, marker)
        }
    }
}

fn bracket_span(class: &str, bracket: &str, options: &RenderOptions) -> String {
    if options.show_bb_tags {
        let styles = options.bb_tag_styles.trim();
        if styles.is_empty() {
            format!("<span class=\"{}\">{}</span>", class, bracket)
        } else {
            format!("<span class=\"{}\" {}>{}</span>", class, styles, bracket)
        }
    } else if options.marker_spans {
        format!("<span class=\"{}\"></span>", class)
    } else {
        String::new()
    }
}

fn unmatched_diagnostic(token: &Token, source_map: &SourceMap<'_>) -> Diagnostic {
    let (code, message) = match token.kind {
        TokenKind::Open => (
            W_TAG_UNMATCHED_OPEN,
            format!("[{}] is never closed and stays as text", token.keyword),
        ),
        TokenKind::Close => (
            W_TAG_UNMATCHED_CLOSE,
            format!("[/{}] has no opening tag to close", token.keyword),
        ),
    };
    Diagnostic::new(token.span, source_map.range(token.span), code, message)
}

#[cfg(test)]
mod tests {
    use super::{RenderOptions, bbcode_to_html, convert};
    use crate::matcher::InvalidTagPos;
    use crate::vocabulary::{BbCode, Vocabulary, default_vocabulary};

    fn plain() -> RenderOptions {
        RenderOptions {
            marker_spans: false,
            ..Default::default()
        }
    }

    #[test]
    fn balanced_tag_with_marker_spans() {
        let html = bbcode_to_html("[b]Hi[/b]", default_vocabulary(), &RenderOptions::default());
        assert_eq!(
            html,
            "<span class=\"open\"></span><b>Hi</b><span class=\"close\"></span>"
        );
    }

    #[test]
    fn balanced_tag_without_markers() {
        let html = bbcode_to_html("[b]Hi[/b]", default_vocabulary(), &plain());
        assert_eq!(html, "<b>Hi</b>");
    }

    #[test]
    fn visible_brackets_carry_styles() {
        let options = RenderOptions {
            show_bb_tags: true,
            bb_tag_styles: "style=\"color: gray\"".to_string(),
            ..Default::default()
        };
        let html = bbcode_to_html("[b]Hi[/b]", default_vocabulary(), &options);
        assert_eq!(
            html,
            "<span class=\"open\" style=\"color: gray\">[b]</span><b>Hi</b>\
             <span class=\"close\" style=\"color: gray\">[/b]</span>"
        );
    }

    #[test]
    fn keyword_and_element_lengths_differ() {
        let text = "x[link url=\"http://x\"]A[/link]y[b]B[/b]";
        let html = bbcode_to_html(text, default_vocabulary(), &plain());
        assert_eq!(html, "x<a url=\"http://x\">A</a>y<b>B</b>");
    }

    #[test]
    fn longer_element_names_shift_later_tags() {
        let vocabulary = Vocabulary::new([
            BbCode::with_tag("q", "blockquote"),
            BbCode::new("b"),
        ]);
        let vocabulary = match vocabulary {
            Ok(vocabulary) => vocabulary,
            Err(err) => panic!("unexpected error: {err}"),
        };
        let html = bbcode_to_html("[q]a[b]b[/b][/q][b]c[/b]", &vocabulary, &plain());
        assert_eq!(html, "<blockquote>a<b>b</b></blockquote><b>c</b>");
    }

    #[test]
    fn multibyte_text_keeps_offsets() {
        let text = "ä[b]„ö“[/b]ß[link t=„ü“]é[/link]";
        let html = bbcode_to_html(text, default_vocabulary(), &plain());
        assert_eq!(html, "ä<b>„ö“</b>ß<a t=„ü“>é</a>");
    }

    #[test]
    fn unmatched_tags_stay_literal_and_are_reported() {
        let conversion = convert("[i]Hi[/b] [b]x[/b]", default_vocabulary(), &plain());
        assert_eq!(conversion.html, "[i]Hi[/b] <b>x</b>");
        let codes: Vec<_> = conversion
            .diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.code, diagnostic.span.start))
            .collect();
        assert_eq!(
            codes,
            vec![("W_TAG_UNMATCHED_OPEN", 0), ("W_TAG_UNMATCHED_CLOSE", 5)]
        );
    }

    #[test]
    fn crossing_tags_follow_policy() {
        let text = "[h1]A[b]B[/h1]C[/b]";
        let outer = bbcode_to_html(text, default_vocabulary(), &plain());
        let middle = bbcode_to_html(
            text,
            default_vocabulary(),
            &RenderOptions {
                invalid_tag_pos: InvalidTagPos::MiddleTag,
                ..plain()
            },
        );
        assert_eq!(outer, "<h1>A[b]B</h1>C[/b]");
        assert_eq!(middle, "[h1]A<b>B[/h1]C</b>");
    }

    #[test]
    fn repeated_calls_do_not_share_drift() {
        let first = bbcode_to_html("[link]a[/link]", default_vocabulary(), &plain());
        let second = bbcode_to_html("[link]a[/link]", default_vocabulary(), &plain());
        assert_eq!(first, "<a>a</a>");
        assert_eq!(first, second);
    }
}
