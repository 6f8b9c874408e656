use parking_lot::Mutex;
use silica_diag::Diagnostic;
use silica_hir::Design;

/// Tunable analysis behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisSettings {
    /// Allow `initial` block drivers to overlap single-driver
    /// procedures without a diagnostic.
    pub allow_dup_initial_drivers: bool,
}

/// Shared state for one analysis run: the elaborated design, settings,
/// and the diagnostic sink.
///
/// Workers share the context by reference; the sink is the only
/// internally synchronized piece. Arenas are per-worker and passed to
/// each tracker operation separately, so the context stays `Sync`.
pub struct AnalysisContext<'a> {
    pub design: &'a Design<'a>,
    pub settings: AnalysisSettings,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(design: &'a Design<'a>) -> Self {
        Self::with_settings(design, AnalysisSettings::default())
    }

    pub fn with_settings(design: &'a Design<'a>, settings: AnalysisSettings) -> Self {
        Self {
            design,
            settings,
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn report(&self, diag: Diagnostic) {
        self.diagnostics.lock().push(diag);
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// Drain all diagnostics reported so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}
