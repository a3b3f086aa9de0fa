//! Annotated source reports for grammar files.
//!
//! Reports list diagnostics in source order after [`Diagnostics::filtered`]
//! has dropped same-offset duplicates. Related spans are drawn as secondary
//! annotations in the same snippet.

use std::ops::Range;
use std::path::Path;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::{DiagnosticMessage, Diagnostics, Severity};

impl Diagnostics {
    pub fn render(&self, source: &str) -> String {
        self.render_colored(source, false)
    }

    pub fn render_colored(&self, source: &str, colored: bool) -> String {
        render(self, source, None, colored)
    }

    /// Like [`Diagnostics::render_colored`], with each snippet headed by `path`.
    pub fn render_file(&self, path: &Path, source: &str, colored: bool) -> String {
        let path = path.display().to_string();
        render(self, source, Some(&path), colored)
    }
}

fn render(diagnostics: &Diagnostics, source: &str, path: Option<&str>, colored: bool) -> String {
    let renderer = if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };
    diagnostics
        .filtered()
        .sorted()
        .iter()
        .map(|diag| renderer.render(&[group(diag, source, path)]).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn group<'a>(diag: &'a DiagnosticMessage, source: &'a str, path: Option<&'a str>) -> Group<'a> {
    let mut snippet = Snippet::source(source).line_start(1).annotation(
        AnnotationKind::Primary
            .span(snippet_span(diag.range, source))
            .label(&diag.message),
    );
    if let Some(path) = path {
        snippet = snippet.path(path);
    }
    for related in &diag.related {
        snippet = snippet.annotation(
            AnnotationKind::Context
                .span(snippet_span(related.range, source))
                .label(&related.message),
        );
    }

    let level = match diag.severity() {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    };
    level.primary_title(&diag.message).element(snippet)
}

/// Byte range to underline. An empty range covers the character after it, or
/// the last character when it sits at the end of the file.
fn snippet_span(range: TextRange, source: &str) -> Range<usize> {
    let start = usize::from(range.start()).min(source.len());
    let end = usize::from(range.end()).min(source.len());
    if start < end {
        return start..end;
    }
    if let Some(c) = source[start..].chars().next() {
        return start..start + c.len_utf8();
    }
    match source[..start].chars().next_back() {
        Some(c) => start - c.len_utf8()..start,
        None => start..start,
    }
}
