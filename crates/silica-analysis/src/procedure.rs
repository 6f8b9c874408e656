use silica_arena::Arena;
use silica_hir::{Expr, SymbolId};
use silica_source::Span;
use smallvec::smallvec;

use crate::context::AnalysisContext;
use crate::driver::{DriverFlags, DriverKind, DriverList, ValueDriver};
use crate::lsp::{get_bounds, visit_lsps};

/// The per-procedure analyzer's result: for each driven symbol, the
/// drivers one procedural block produced.
pub struct AnalyzedProcedure<'a> {
    /// The procedural block (or subroutine) the drivers live in.
    pub symbol: SymbolId,
    pub drivers: Vec<(SymbolId, DriverList<'a>)>,
}

impl<'a> AnalyzedProcedure<'a> {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            drivers: Vec::new(),
        }
    }

    /// Record the left-hand side of one assignment in this procedure.
    pub fn add_assignment(
        &mut self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        lhs: &'a Expr<'a>,
    ) {
        self.add_assignment_impl(ctx, alloc, lhs, None);
    }

    /// Record an assignment reached through a procedural call;
    /// `call_span` is attached for the original-assignment note.
    pub fn add_call_assignment(
        &mut self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        lhs: &'a Expr<'a>,
        call_span: Span,
    ) {
        self.add_assignment_impl(ctx, alloc, lhs, Some(call_span));
    }

    fn add_assignment_impl(
        &mut self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        lhs: &'a Expr<'a>,
        call_span: Option<Span>,
    ) {
        if lhs.bad() {
            return;
        }
        let containing = self.symbol;
        let drivers = &mut self.drivers;
        visit_lsps(lhs, None, &mut |symbol, lsp, is_lvalue| {
            if !is_lvalue {
                return;
            }
            let Some(ty) = ctx.design.value_ty(symbol) else {
                return;
            };
            let Some(bounds) = get_bounds(lsp, ctx.design, ty) else {
                return;
            };
            let mut driver = ValueDriver::new(
                ctx.design,
                DriverKind::Procedural,
                lsp,
                containing,
                DriverFlags::empty(),
            );
            driver.proc_call_expression = call_span;
            let driver = alloc.alloc(driver);

            match drivers.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, list)) => list.push((driver, bounds)),
                None => drivers.push((symbol, smallvec![(driver, bounds)])),
            }
        });
    }
}
