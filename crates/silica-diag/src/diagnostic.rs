use silica_source::Span;

use crate::code::DiagnosticCode;
use crate::label::{Label, LabelKind};
use crate::message::{self, Message};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A structured diagnostic with code identity, labels, and notes.
///
/// The primary span is derived from the first `Primary` label -- there is
/// no redundant stored `span` field. Related locations are `Secondary`
/// labels; location-free remarks go in `notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: Message,
    pub labels: Vec<Label>,
    pub notes: Vec<Message>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: Message) -> Self {
        Self {
            severity,
            code,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: Message) -> Self {
        self.notes.push(note);
        self
    }

    /// Primary span -- derived from the first `Primary` label.
    ///
    /// Returns `None` only if no primary label was attached (should not
    /// happen for well-formed diagnostics constructed via the builder).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.kind == LabelKind::Primary)
            .map(|l| l.span)
    }

    /// Render headline message to string.
    pub fn render_message(&self) -> String {
        message::render_message(&self.message)
    }
}
