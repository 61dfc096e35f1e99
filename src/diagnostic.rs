//! Terminal diagnostics for model-file errors.
//!
//! JSON parse errors arrive as 1-based line/column pairs from serde; the
//! renderer converts them to byte spans so ariadne can underline the
//! offending token in context.

use crate::error::ModelError;

/// A renderable diagnostic (error or warning).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub start: usize,
    pub end: usize,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, start: usize, end: usize) -> Self {
        Self {
            severity: Severity::Error,
            message,
            start,
            end,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, start: usize, end: usize) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            start,
            end,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, filename, self.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.start..self.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .unwrap();
    }
}

/// Byte span of the character at a 1-based line/column position.
pub fn line_col_span(source: &str, line: usize, column: usize) -> (usize, usize) {
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let col = column.saturating_sub(1);
            let byte = text
                .char_indices()
                .nth(col)
                .map(|(b, _)| b)
                .unwrap_or(text.len());
            let start = offset + byte;
            return (start, (start + 1).min(source.len()));
        }
        offset += text.len();
    }
    (source.len(), source.len())
}

/// Print `err` against its source file. Parse errors get an underlined
/// report; everything else falls back to a one-line message.
pub fn report_model_error(filename: &str, source: &str, err: &ModelError) {
    match err {
        ModelError::Syntax { msg, line, column } => {
            let (start, end) = line_col_span(source, *line, *column);
            Diagnostic::error(msg.clone(), start, end)
                .with_help("model files are JSON: {\"state\": [...], \"defs\": {...}}".to_string())
                .render(filename, source);
        }
        other => eprintln!("error: {other}"),
    }
}
