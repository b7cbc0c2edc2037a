use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsRenderOptions {
    show_bb_tags: Option<bool>,
    bb_tag_styles: Option<String>,
    invalid_tag_pos: Option<JsInvalidTagPos>,
    marker_spans: Option<bool>,
    sanitized: Option<bool>,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum JsInvalidTagPos {
    Outer,
    MiddleTag,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    code: String,
    message: String,
    range: JsRange,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

/// Converts with the default options: hidden brackets, marker spans, `outer` policy.
#[wasm_bindgen]
pub fn render_html(source: &str) -> Result<JsValue, JsValue> {
    render_html_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_html_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let (options, sanitized) = options_from_js(options)?;
    let vocabulary = bbmark_core::default_vocabulary();
    let conversion = bbmark_core::convert(source, vocabulary, &options);

    let html = if sanitized {
        bbmark_core::sanitize_html(&conversion.html, vocabulary)
    } else {
        conversion.html
    };

    let diagnostics = conversion
        .diagnostics
        .into_iter()
        .map(|diag| JsDiagnostic {
            code: diag.code.to_string(),
            message: diag.message,
            range: JsRange {
                start_line: diag.range.start.line,
                start_col: diag.range.start.character,
                end_line: diag.range.end.line,
                end_col: diag.range.end.character,
            },
        })
        .collect();

    let result = RenderResult { html, diagnostics };
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<(bbmark_core::RenderOptions, bool), JsValue> {
    let mut out = bbmark_core::RenderOptions::default();
    if value.is_null() || value.is_undefined() {
        return Ok((out, false));
    }
    let parsed: JsRenderOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    if let Some(show_bb_tags) = parsed.show_bb_tags {
        out.show_bb_tags = show_bb_tags;
    }
    if let Some(bb_tag_styles) = parsed.bb_tag_styles {
        out.bb_tag_styles = bb_tag_styles;
    }
    if let Some(invalid_tag_pos) = parsed.invalid_tag_pos {
        out.invalid_tag_pos = match invalid_tag_pos {
            JsInvalidTagPos::Outer => bbmark_core::InvalidTagPos::Outer,
            JsInvalidTagPos::MiddleTag => bbmark_core::InvalidTagPos::MiddleTag,
        };
    }
    if let Some(marker_spans) = parsed.marker_spans {
        out.marker_spans = marker_spans;
    }
    Ok((out, parsed.sanitized.unwrap_or(false)))
}
