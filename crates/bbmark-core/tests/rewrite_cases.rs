use bbmark_core::{
    BbCode, InvalidTagPos, RenderOptions, Vocabulary, bbcode_to_html, bbcode_to_html_sanitized,
    default_vocabulary,
};

fn plain(policy: InvalidTagPos) -> RenderOptions {
    RenderOptions {
        invalid_tag_pos: policy,
        marker_spans: false,
        ..Default::default()
    }
}

fn both_policies() -> [RenderOptions; 2] {
    [plain(InvalidTagPos::Outer), plain(InvalidTagPos::MiddleTag)]
}

#[test]
fn balanced_simple_case() {
    let html = bbcode_to_html("[b]Hi[/b]", default_vocabulary(), &plain(InvalidTagPos::Outer));
    assert_eq!(html, "<b>Hi</b>");

    let shown = RenderOptions {
        show_bb_tags: true,
        ..Default::default()
    };
    let html = bbcode_to_html("[b]Hi[/b]", default_vocabulary(), &shown);
    assert_eq!(
        html,
        "<span class=\"open\">[b]</span><b>Hi</b><span class=\"close\">[/b]</span>"
    );
}

#[test]
fn unknown_tags_pass_through() {
    for options in both_policies() {
        let html = bbcode_to_html("[zz]Hi[/zz]", default_vocabulary(), &options);
        assert_eq!(html, "[zz]Hi[/zz]");
    }
}

#[test]
fn unmatched_close_is_left_literal() {
    for options in both_policies() {
        assert_eq!(bbcode_to_html("Hi[/b]", default_vocabulary(), &options), "Hi[/b]");
    }
}

#[test]
fn policies_diverge_on_crossing_tags() {
    let text = "[h1]A[b]B[/h1]C[/b]";
    let [outer, middle] = both_policies();
    assert_eq!(
        bbcode_to_html(text, default_vocabulary(), &outer),
        "<h1>A[b]B</h1>C[/b]"
    );
    assert_eq!(
        bbcode_to_html(text, default_vocabulary(), &middle),
        "[h1]A<b>B[/h1]C</b>"
    );
}

#[test]
fn parameters_are_copied_into_attributes() {
    let html = bbcode_to_html(
        "[link url=\"http://x\"]A[/link]",
        default_vocabulary(),
        &plain(InvalidTagPos::Outer),
    );
    assert_eq!(html, "<a url=\"http://x\">A</a>");

    let shown = RenderOptions {
        show_bb_tags: true,
        ..Default::default()
    };
    let html = bbcode_to_html("[link url=\"http://x\"]A[/link]", default_vocabulary(), &shown);
    assert!(html.starts_with("<span class=\"open\">[link url=\"http://x\"]</span><a url=\"http://x\">"));
}

#[test]
fn nested_tags_pair_under_both_policies() {
    for options in both_policies() {
        let html = bbcode_to_html("[b][h1]A[/h1][/b]", default_vocabulary(), &options);
        assert_eq!(html, "<b><h1>A</h1></b>");
    }
}

#[test]
fn empty_vocabulary_is_a_no_op() {
    let text = "[b]Hi[/b] [link url=\"x\"]y[/link]";
    let html = bbcode_to_html(text, &Vocabulary::empty(), &RenderOptions::default());
    assert_eq!(html, text);
}

#[test]
fn custom_vocabulary_replaces_the_default() -> Result<(), Box<dyn std::error::Error>> {
    let vocabulary = Vocabulary::new([
        BbCode::with_tag("quote", "blockquote"),
        BbCode::with_tag("c", "code"),
    ])?;
    let html = bbcode_to_html(
        "[quote][c]x[/c][/quote] [b]y[/b]",
        &vocabulary,
        &plain(InvalidTagPos::Outer),
    );
    assert_eq!(html, "<blockquote><code>x</code></blockquote> [b]y[/b]");
    Ok(())
}

#[test]
fn sanitized_output_drops_unknown_attributes() {
    let html = bbcode_to_html_sanitized(
        "[b onclick=\"steal()\"]x[/b] [link href=\"https://example.com\"]y[/link]",
        default_vocabulary(),
        &RenderOptions::default(),
    );
    assert!(!html.contains("onclick"), "{}", html);
    assert!(html.contains("<b>x</b>"), "{}", html);
    assert!(html.contains("href=\"https://example.com\""), "{}", html);
    assert!(html.contains("<span class=\"open\"></span>"), "{}", html);
}

#[test]
fn sanitized_output_keeps_visible_bracket_styles() {
    let options = RenderOptions {
        show_bb_tags: true,
        bb_tag_styles: "style=\"color: gray\"".to_string(),
        ..Default::default()
    };
    let html = bbcode_to_html_sanitized("[i]x[/i]", default_vocabulary(), &options);
    assert!(html.contains("style=\"color: gray\""), "{}", html);
    assert!(html.contains("<i>x</i>"), "{}", html);
}

#[test]
fn sanitized_links_keep_their_url() {
    let html = bbcode_to_html_sanitized(
        "[link url=\"http://x\"]A[/link]",
        default_vocabulary(),
        &plain(InvalidTagPos::Outer),
    );
    assert!(html.contains("url=\"http://x\""), "{}", html);
    assert!(html.contains(">A</a>"), "{}", html);
}
