use silica_source::Span;

use crate::message::Message;

/// Whether a label marks the primary location or a related location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Primary,
    Secondary,
}

/// A labeled source location within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub kind: LabelKind,
    pub span: Span,
    pub message: Message,
}

impl Label {
    pub fn primary(span: Span, message: Message) -> Self {
        Self {
            kind: LabelKind::Primary,
            span,
            message,
        }
    }

    pub fn secondary(span: Span, message: Message) -> Self {
        Self {
            kind: LabelKind::Secondary,
            span,
            message,
        }
    }
}
