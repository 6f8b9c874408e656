pub use text_size::{TextRange, TextSize};

/// Opaque handle to a source file in the compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// A span within a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: FileId,
    pub range: TextRange,
}

impl Span {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self {
            file,
            range: TextRange::new(TextSize::new(start), TextSize::new(end)),
        }
    }

    /// Zero-length span at `offset`. Used when synthesizing references
    /// to symbols that have a declaration location but no expression.
    pub fn point(file: FileId, offset: u32) -> Self {
        Self {
            file,
            range: TextRange::empty(TextSize::new(offset)),
        }
    }

    pub fn start(self) -> TextSize {
        self.range.start()
    }
}
