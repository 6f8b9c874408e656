use rayon::prelude::*;
use silica_analysis::{AnalysisContext, AnalyzedProcedure, DriverTracker};
use silica_arena::Arena;
use silica_diag::DiagnosticCode;
use silica_hir::{
    DefinitionKind, Design, DesignBuilder, Expr, Lifetime, NetType, ProceduralBlockKind, SymbolId,
    Ty,
};
use silica_source::FileId;

use super::common::sp;

const WORKERS: usize = 8;

// Worker arenas are created on their own threads and leaked so the
// allocations outlive the shared tracker. Pre-sized for the small
// per-worker driver batches below.
fn worker_arena() -> &'static Arena {
    Box::leak(Box::new(Arena::with_capacity(1 << 12)))
}

#[test]
fn parallel_ingestion_loses_no_drivers() {
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);
    let shared = b.variable(top, "shared", Ty::bits(32), Lifetime::Static, None);
    let vars: Vec<SymbolId> = (0..WORKERS)
        .map(|i| b.variable(top, &format!("v{i}"), Ty::bits(8), Lifetime::Static, None))
        .collect();
    let blocks: Vec<SymbolId> = (0..WORKERS)
        .map(|i| b.procedural_block(top, &format!("blk{i}"), ProceduralBlockKind::Always))
        .collect();

    let design: &'static Design<'static> = Box::leak(Box::new(b.finish()));
    let ctx: &'static AnalysisContext<'static> = Box::leak(Box::new(AnalysisContext::new(design)));
    let tracker = DriverTracker::new();

    (0..WORKERS).into_par_iter().for_each(|i| {
        let alloc = worker_arena();
        let mut procedure = AnalyzedProcedure::new(blocks[i]);
        procedure.add_assignment(ctx, alloc, Expr::named(alloc, vars[i], sp(1000 + i as u32)));
        procedure.add_assignment(ctx, alloc, Expr::named(alloc, shared, sp(2000 + i as u32)));
        tracker.add_procedure(ctx, alloc, &procedure);
    });

    for (i, &v) in vars.iter().enumerate() {
        assert_eq!(tracker.get_drivers(v).len(), 1, "driver lost for v{i}");
    }
    assert_eq!(tracker.get_drivers(shared).len(), WORKERS);
    assert!(
        ctx.take_diagnostics().is_empty(),
        "plain always blocks never conflict"
    );
}

#[test]
fn concurrent_uwire_conflicts_report_deterministically() {
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);
    let w = b.net(top, "w", Ty::bits(8), NetType::uwire(), None);

    let design: &'static Design<'static> = Box::leak(Box::new(b.finish()));
    let ctx: &'static AnalysisContext<'static> = Box::leak(Box::new(AnalysisContext::new(design)));
    let tracker = DriverTracker::new();

    (0..WORKERS).into_par_iter().for_each(|i| {
        let alloc = worker_arena();
        tracker.add_expr(ctx, alloc, Expr::named(alloc, w, sp(100 + i as u32)), top);
    });

    let diags = ctx.take_diagnostics();
    assert_eq!(
        diags.len(),
        WORKERS - 1,
        "every insertion after the first reports exactly once: {diags:?}"
    );
    assert!(
        diags
            .iter()
            .all(|d| d.code == DiagnosticCode::MULTIPLE_UWIRE_DRIVERS)
    );
    assert_eq!(tracker.get_drivers(w).len(), WORKERS);
}
