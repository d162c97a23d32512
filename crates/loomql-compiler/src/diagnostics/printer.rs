//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use indexmap::IndexMap;
use loomql_core::Span;

use super::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
///
/// Attach module sources with [`source`](Self::source) to get annotated
/// snippets; diagnostics whose module has no attached source fall back to
/// one plain line each.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: IndexMap<&'s str, &'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            sources: IndexMap::new(),
            colored: false,
        }
    }

    /// Attach one module's source text for snippet rendering.
    pub fn source(mut self, module: &'s str, text: &'s str) -> Self {
        self.sources.insert(module, text);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        if self.diagnostics.is_empty() {
            return Ok(());
        }

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let module = diag.module.as_str();
            let Some(source) = self.sources.get(module).copied() else {
                writeln!(w, "{}", diag)?;
                continue;
            };

            let mut snippet = Snippet::source(source).line_start(1).path(module).annotation(
                AnnotationKind::Primary
                    .span(adjust_range(diag.span, source.len()))
                    .label(&diag.message),
            );

            // Related spans from other modules only show in plain mode.
            for related in &diag.related {
                if related.module.as_str() == module {
                    snippet = snippet.annotation(
                        AnnotationKind::Context
                            .span(adjust_range(related.span, source.len()))
                            .label(&related.message),
                    );
                }
            }

            let level = severity_to_level(diag.severity());
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
            writeln!(w, "{}", renderer.render(&report))?;

            for hint in &diag.hints {
                writeln!(w, "help: {}", hint)?;
            }
        }

        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Clamp a host-supplied span to the attached source, widening empty
/// spans to one character so the annotation stays visible.
fn adjust_range(span: Span, limit: usize) -> std::ops::Range<usize> {
    let start = (span.start as usize).min(limit);
    let end = (span.end as usize).min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
