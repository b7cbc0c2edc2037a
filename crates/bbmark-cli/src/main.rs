//! Command-line front end: BBCode in, HTML out.

use anyhow::{Context, Result};
use bbmark_core::{
    BbCode, Diagnostic, InvalidTagPos, RenderOptions, Vocabulary, convert, sanitize_html,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bbmark", about = "Rewrite BBCode bracket tags into HTML", version)]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Keep the bracket syntax visible next to the generated markup
    #[arg(long)]
    show_tags: bool,

    /// Attributes for the visible bracket spans, e.g. 'style="color: gray"'
    #[arg(long, env = "BBMARK_TAG_STYLE", default_value = "")]
    tag_style: String,

    /// Where unmatched tags are assumed to sit when pairing is ambiguous
    #[arg(long, value_enum, default_value_t = Policy::Outer)]
    invalid_tag_pos: Policy,

    /// Do not emit the empty marker spans around generated tags
    #[arg(long)]
    no_markers: bool,

    /// Clean the output against the vocabulary's allow-list
    #[arg(long)]
    sanitized: bool,

    /// JSON file with `[{"bb": "quote", "tag": "blockquote"}, ...]`
    #[arg(long, env = "BBMARK_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    /// Report dropped tags on stderr
    #[arg(long, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Exit with status 1 when any tag was dropped
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Outer,
    MiddleTag,
}

impl From<Policy> for InvalidTagPos {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Outer => InvalidTagPos::Outer,
            Policy::MiddleTag => InvalidTagPos::MiddleTag,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

#[derive(Deserialize)]
struct VocabularyEntry {
    bb: String,
    tag: Option<String>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: &'a str,
    message: &'a str,
    range: JsonRange,
}

#[derive(Serialize)]
struct JsonRange {
    start: JsonPosition,
    end: JsonPosition,
}

#[derive(Serialize)]
struct JsonPosition {
    line: usize,
    character: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(dropped) if cli.strict && dropped > 0 => process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(1);
        }
    }
}

/// Converts the input and returns how many tags were left as text.
fn run(cli: &Cli) -> Result<usize> {
    let source = read_source(cli.input.as_deref())?;
    let vocabulary = match &cli.vocabulary {
        Some(path) => load_vocabulary(path)?,
        None => Vocabulary::default(),
    };

    let options = RenderOptions {
        show_bb_tags: cli.show_tags,
        bb_tag_styles: cli.tag_style.clone(),
        invalid_tag_pos: cli.invalid_tag_pos.into(),
        marker_spans: !cli.no_markers,
    };
    let conversion = convert(&source, &vocabulary, &options);
    tracing::debug!(
        tokens = conversion.tokens.len(),
        pairs = conversion.pairs.len(),
        "converted input"
    );

    if let Some(mode) = cli.diagnostics {
        emit_diagnostics(&conversion.diagnostics, mode)?;
    }

    if cli.sanitized {
        print!("{}", sanitize_html(&conversion.html, &vocabulary));
    } else {
        print!("{}", conversion.html);
    }

    Ok(conversion.diagnostics.len())
}

fn read_source(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read vocabulary {}", path.display()))?;
    let entries: Vec<VocabularyEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid vocabulary JSON in {}", path.display()))?;
    let vocabulary = Vocabulary::new(entries.into_iter().map(|entry| match entry.tag {
        Some(tag) => BbCode::with_tag(entry.bb, tag),
        None => BbCode::new(entry.bb),
    }))
    .with_context(|| format!("rejected vocabulary {}", path.display()))?;
    tracing::debug!(entries = vocabulary.entries().len(), "loaded vocabulary");
    Ok(vocabulary)
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) -> Result<()> {
    match mode {
        DiagnosticsMode::Json => {
            let json: Vec<JsonDiagnostic<'_>> = diagnostics.iter().map(to_json).collect();
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        DiagnosticsMode::Pretty => {
            for diagnostic in diagnostics {
                eprintln!(
                    "{}:{} warning {} {}",
                    diagnostic.range.start.line + 1,
                    diagnostic.range.start.character + 1,
                    diagnostic.code,
                    diagnostic.message
                );
            }
        }
    }
    Ok(())
}

fn to_json(diagnostic: &Diagnostic) -> JsonDiagnostic<'_> {
    let position = |pos: bbmark_core::Position| JsonPosition {
        line: pos.line,
        character: pos.character,
    };
    JsonDiagnostic {
        code: diagnostic.code,
        message: &diagnostic.message,
        range: JsonRange {
            start: position(diagnostic.range.start),
            end: position(diagnostic.range.end),
        },
    }
}
