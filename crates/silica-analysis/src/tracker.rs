use dashmap::DashMap;
use silica_arena::Arena;
use silica_diag::{Arg, Diagnostic, DiagnosticCode, Label, Message, MessageId, Severity};
use silica_hir::{
    ArgumentDirection, Expr, ExprKind, HierarchicalReference, Lifetime, NetKind, SymbolId,
    SymbolInfo, SymbolKind,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::context::AnalysisContext;
use crate::driver::{
    DriverBitRange, DriverFlags, DriverKind, DriverList, DriverSource, ValueDriver,
};
use crate::interval_map::DriverIntervalMap;
use crate::lsp::{get_bounds, visit_components, visit_lsps};
use crate::overlap::handle_overlap;
use crate::procedure::AnalyzedProcedure;
use crate::retarget::retarget_iface_port;

/// A port connection on an instance, as produced by elaboration.
pub struct PortConnection<'a> {
    pub port: SymbolId,
    pub expr: Option<&'a Expr<'a>>,
}

/// One driver recorded through an interface port of an instance body.
#[derive(Clone, Copy)]
pub struct IfacePortDriver<'a> {
    pub hier_ref: &'a HierarchicalReference<'a>,
    pub driver: &'a ValueDriver<'a>,
}

/// Per-canonical-body record: the structurally identical instances that
/// defer to it, plus the drivers that reached it through one of its
/// interface ports.
#[derive(Default)]
pub struct InstanceState<'a> {
    pub non_canonical_instances: Vec<SymbolId>,
    pub iface_port_drivers: Vec<IfacePortDriver<'a>>,
}

/// Centralized tracking of assigned / driven symbols.
///
/// Workers ingest drivers concurrently; the only shared mutable state
/// is the three sharded maps. Entry visitors never touch a second entry
/// of the same map -- data needed across entries is copied out under
/// the first lock and acted on after it is released. `alloc` is the
/// calling worker's arena; everything allocated from it must outlive
/// the tracker.
pub struct DriverTracker<'a> {
    symbol_drivers: DashMap<SymbolId, DriverIntervalMap<'a>>,
    instance_map: DashMap<SymbolId, InstanceState<'a>>,
    modport_port_drivers: DashMap<SymbolId, DriverList<'a>>,
}

impl<'a> Default for DriverTracker<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DriverTracker<'a> {
    pub fn new() -> Self {
        Self {
            symbol_drivers: DashMap::new(),
            instance_map: DashMap::new(),
            modport_port_drivers: DashMap::new(),
        }
    }

    /// Ingest the driver list of one analyzed procedure.
    pub fn add_procedure(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        procedure: &AnalyzedProcedure<'a>,
    ) {
        let mut iface_port_refs: SmallVec<[IfacePortDriver<'a>; 2]> = SmallVec::new();
        for (value_sym, drivers) in &procedure.drivers {
            if self.is_class_typed(ctx, *value_sym) {
                continue;
            }
            let mut entry = self.symbol_drivers.entry(*value_sym).or_default();
            for &(driver, bounds) in drivers.iter() {
                if let Some(hier_ref) =
                    self.add_driver(ctx, alloc, *value_sym, entry.value_mut(), driver, bounds)
                {
                    // Via an interface port: store, then apply after
                    // we're done touching the symbol map entry.
                    iface_port_refs.push(IfacePortDriver { hier_ref, driver });
                }
            }
        }

        for ipd in iface_port_refs {
            self.note_interface_port_driver(ctx, alloc, ipd.hier_ref, ipd.driver);
        }
    }

    /// Ingest a port connection of an instance. Inputs, interface
    /// ports, and failed expressions are not drivers.
    pub fn add_port_connection(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        connection: &PortConnection<'a>,
        containing_symbol: SymbolId,
    ) {
        let port_sym = ctx.design.symbol(connection.port);
        let Some(expr) = connection.expr else {
            return;
        };
        if expr.bad() || port_sym.kind() == SymbolKind::InterfacePort {
            return;
        }

        let direction = match &port_sym.info {
            SymbolInfo::Port { direction, .. } | SymbolInfo::MultiPort { direction } => *direction,
            _ => return,
        };
        if direction == ArgumentDirection::In {
            return;
        }

        let mut flags = DriverFlags::empty();
        if direction == ArgumentDirection::Out {
            flags = DriverFlags::OUTPUT_PORT;
        }

        let expr = match &expr.kind {
            ExprKind::Assignment { left, .. } => *left,
            _ => expr,
        };

        self.add_drivers(
            ctx,
            alloc,
            expr,
            DriverKind::Continuous,
            flags,
            containing_symbol,
            None,
        );
    }

    /// Record the port itself as a driver of the internal symbol (or
    /// expression) it connects to. Only input and inout ports drive
    /// inward.
    pub fn add_port(&self, ctx: &AnalysisContext<'a>, alloc: &'a Arena, port: SymbolId) {
        let sym = ctx.design.symbol(port);
        let SymbolInfo::Port {
            direction,
            internal_symbol,
            internal_expr,
            ..
        } = &sym.info
        else {
            return;
        };
        if !matches!(direction, ArgumentDirection::In | ArgumentDirection::InOut) {
            return;
        }

        let flags = if *direction == ArgumentDirection::In {
            DriverFlags::INPUT_PORT
        } else {
            DriverFlags::empty()
        };

        debug_assert!(sym.parent.is_some());
        let Some(scope) = sym.parent else { return };

        if let Some(expr) = *internal_expr {
            self.add_drivers(ctx, alloc, expr, DriverKind::Continuous, flags, scope, None);
        } else if let Some(internal) = *internal_symbol {
            let span = ctx.design.symbol(internal).span;
            let value = Expr::named(alloc, internal, span);
            self.add_drivers(ctx, alloc, value, DriverKind::Continuous, flags, scope, None);
        }
    }

    /// Record a clocking block signal as a driver of its target.
    pub fn add_clock_var(&self, ctx: &AnalysisContext<'a>, alloc: &'a Arena, symbol: SymbolId) {
        let sym = ctx.design.symbol(symbol);
        let SymbolInfo::ClockVar {
            direction,
            initializer,
            ..
        } = &sym.info
        else {
            return;
        };
        // Input clock vars don't have drivers.
        if *direction == ArgumentDirection::In {
            return;
        }

        debug_assert!(sym.parent.is_some());
        let Some(scope) = sym.parent else { return };

        if let Some(expr) = *initializer {
            self.add_drivers(
                ctx,
                alloc,
                expr,
                DriverKind::Continuous,
                DriverFlags::CLOCK_VAR,
                scope,
                None,
            );
        }
    }

    /// Generic continuous-driver entry point.
    pub fn add_expr(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        expr: &'a Expr<'a>,
        containing_symbol: SymbolId,
    ) {
        self.add_drivers(
            ctx,
            alloc,
            expr,
            DriverKind::Continuous,
            DriverFlags::empty(),
            containing_symbol,
            None,
        );
    }

    /// Bulk insert pre-built driver lists. Callers guarantee no
    /// interface-port side effects arise (e.g. already-projected
    /// modport drivers).
    pub fn add_driver_list(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        list: &[(SymbolId, DriverList<'a>)],
    ) {
        for (value_sym, drivers) in list {
            if self.is_class_typed(ctx, *value_sym) {
                continue;
            }
            let mut entry = self.symbol_drivers.entry(*value_sym).or_default();
            for &(driver, bounds) in drivers.iter() {
                let hier_ref =
                    self.add_driver(ctx, alloc, *value_sym, entry.value_mut(), driver, bounds);
                debug_assert!(
                    hier_ref.is_none(),
                    "pre-built driver lists cannot introduce interface port side effects"
                );
            }
        }
    }

    /// Snapshot of all drivers recorded for `symbol`, including any
    /// synthesized initializer driver.
    pub fn get_drivers(&self, symbol: SymbolId) -> DriverList<'a> {
        let mut drivers = DriverList::new();
        if let Some(map) = self.symbol_drivers.get(&symbol) {
            for (range, driver) in map.iter() {
                drivers.push((driver, range));
            }
        }
        drivers
    }

    /// Register an instance whose body was deduplicated onto a
    /// canonical one, and replay any interface-port drivers already
    /// recorded against the canonical body.
    pub fn note_non_canonical_instance(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        instance: SymbolId,
    ) {
        let SymbolInfo::Instance { canonical_body, .. } = &ctx.design.symbol(instance).info else {
            debug_assert!(false, "not an instance symbol");
            return;
        };
        let Some(canonical) = *canonical_body else {
            debug_assert!(false, "instance has no canonical body");
            return;
        };

        let iface_port_drivers = {
            let mut state = self.instance_map.entry(canonical).or_default();
            state.non_canonical_instances.push(instance);
            // Copy out so we can act on them outside the entry lock.
            state.iface_port_drivers.clone()
        };

        for ipd in iface_port_drivers {
            self.apply_instance_side_effect(ctx, alloc, ipd, instance);
        }
    }

    /// Drain accumulated modport drivers to a fixed point, re-targeting
    /// each one through its modport port's connection expression.
    ///
    /// Connection graphs are acyclic in practice; the loop is bounded by
    /// the number of modport ports in the design, and failing to
    /// converge is reported rather than looping forever.
    pub fn propagate_modport_drivers(&self, ctx: &AnalysisContext<'a>, alloc: &'a Arena) {
        let max_passes = ctx.design.count_kind(SymbolKind::ModportPort).max(1) + 1;
        let mut passes = 0;
        loop {
            let keys: Vec<SymbolId> = self.modport_port_drivers.iter().map(|e| *e.key()).collect();
            let mut drained: Vec<(SymbolId, DriverList<'a>)> = Vec::new();
            for key in keys {
                if let Some(entry) = self.modport_port_drivers.remove(&key) {
                    drained.push(entry);
                }
            }
            if drained.is_empty() {
                break;
            }

            passes += 1;
            if passes > max_passes {
                let port = drained[0].0;
                let sym = ctx.design.symbol(port);
                ctx.report(
                    Diagnostic::new(
                        Severity::Error,
                        DiagnosticCode::MODPORT_PROPAGATION_LIMIT,
                        Message::new(
                            MessageId::ModportPropagationLimit,
                            [Arg::name(sym.name.clone())],
                        ),
                    )
                    .with_label(Label::primary(
                        sym.span,
                        Message::simple(MessageId::NoteReferencedHere),
                    )),
                );
                break;
            }

            trace!(
                pass = passes,
                entries = drained.len(),
                "propagating modport drivers"
            );

            for (port, drivers) in &drained {
                let SymbolInfo::ModportPort {
                    connection_expr: Some(connection),
                    ..
                } = &ctx.design.symbol(*port).info
                else {
                    continue;
                };
                for &(original, _) in drivers.iter() {
                    self.propagate_modport_driver(ctx, alloc, *connection, original);
                }
            }
        }
    }

    fn is_class_typed(&self, ctx: &AnalysisContext<'a>, symbol: SymbolId) -> bool {
        ctx.design.value_ty(symbol).is_some_and(|ty| ty.is_class())
    }

    /// Splice the outer select of the original prefix onto the modport
    /// connection expression and resubmit the driver.
    ///
    /// Only the three single-level select shapes are rebuilt around the
    /// connection; any other prefix shape drives the connection
    /// expression directly.
    fn propagate_modport_driver(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        connection_expr: &'a Expr<'a>,
        original: &'a ValueDriver<'a>,
    ) {
        let prefix = original.prefix_expression;
        let initial_lsp = match &prefix.kind {
            ExprKind::ElementSelect { index, .. } => Some(Expr::element_select(
                alloc,
                connection_expr,
                *index,
                prefix.span,
            )),
            ExprKind::RangeSelect {
                select_kind,
                left,
                right,
                ..
            } => Some(Expr::range_select(
                alloc,
                *select_kind,
                connection_expr,
                *left,
                *right,
                prefix.span,
            )),
            ExprKind::MemberAccess { member, .. } => Some(Expr::member_access(
                alloc,
                connection_expr,
                *member,
                prefix.span,
            )),
            _ => None,
        };

        self.add_drivers(
            ctx,
            alloc,
            connection_expr,
            original.kind,
            original.flags,
            original.containing_symbol,
            initial_lsp,
        );
    }

    /// Decompose `expr` into per-symbol prefixes and record a driver
    /// for each. Interface-port references are collected inside the
    /// per-symbol critical section and recorded after it releases.
    #[allow(clippy::too_many_arguments)]
    fn add_drivers(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        expr: &'a Expr<'a>,
        driver_kind: DriverKind,
        driver_flags: DriverFlags,
        containing_symbol: SymbolId,
        initial_lsp: Option<&'a Expr<'a>>,
    ) {
        if expr.bad() {
            return;
        }

        let mut iface_port_refs: SmallVec<[IfacePortDriver<'a>; 2]> = SmallVec::new();
        visit_lsps(expr, initial_lsp, &mut |symbol, lsp, is_lvalue| {
            if !is_lvalue {
                return;
            }
            let Some(ty) = ctx.design.value_ty(symbol) else {
                return;
            };
            if ty.is_class() {
                return;
            }
            let Some(bounds) = get_bounds(lsp, ctx.design, ty) else {
                return;
            };

            let driver = alloc.alloc(ValueDriver::new(
                ctx.design,
                driver_kind,
                lsp,
                containing_symbol,
                driver_flags,
            ));

            let mut entry = self.symbol_drivers.entry(symbol).or_default();
            if let Some(hier_ref) =
                self.add_driver(ctx, alloc, symbol, entry.value_mut(), driver, bounds)
            {
                iface_port_refs.push(IfacePortDriver { hier_ref, driver });
            }
        });

        for ipd in iface_port_refs {
            self.note_interface_port_driver(ctx, alloc, ipd.hier_ref, ipd.driver);
        }
    }

    /// Insert one driver into a symbol's interval map, running the
    /// overlap legality check against every already-stored overlapping
    /// driver.
    ///
    /// Returns the hierarchical reference when the driver's prefix
    /// traversed an interface port; the caller registers the instance
    /// side effect outside the map entry lock.
    fn add_driver(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        symbol: SymbolId,
        driver_map: &mut DriverIntervalMap<'a>,
        driver: &'a ValueDriver<'a>,
        bounds: DriverBitRange,
    ) -> Option<&'a HierarchicalReference<'a>> {
        let design = ctx.design;
        let sym = design.symbol(symbol);

        // Class types don't have drivers.
        if self.is_class_typed(ctx, symbol) {
            return None;
        }

        // A driver made via an interface port connection is a side
        // effect for the instance that is not captured in its port
        // connections. Side-effect clones never re-register.
        let mut result = None;
        if !driver.from_side_effect {
            visit_components(driver.prefix_expression, true, &mut |expr| {
                if let ExprKind::HierarchicalValue { hier_ref, .. } = &expr.kind
                    && hier_ref.via_iface_port
                {
                    result = Some(*hier_ref);
                }
            });
        }

        // Modport ports accumulate separately and are revisited at the
        // end of analysis.
        if sym.kind() == SymbolKind::ModportPort {
            self.modport_port_drivers
                .entry(symbol)
                .or_default()
                .push((driver, bounds));
            return result;
        }

        if driver_map.is_empty() {
            // The first time we add a driver, check whether there is
            // also an initializer expression that should count as a
            // driver as well.
            let init_kind = match sym.kind() {
                SymbolKind::Net => Some(DriverKind::Continuous),
                SymbolKind::Variable | SymbolKind::ClassProperty | SymbolKind::Field => {
                    Some(DriverKind::Procedural)
                }
                _ => None,
            };
            if let Some(init_kind) = init_kind
                && design.initializer(symbol).is_some()
                && let Some(scope) = sym.parent
            {
                let width = design
                    .value_ty(symbol)
                    .map_or(0, |ty| ty.selectable_width());
                if width > 0 {
                    let value = Expr::named(alloc, symbol, sym.span);
                    let init_driver = alloc.alloc(ValueDriver::new(
                        design,
                        init_kind,
                        value,
                        scope,
                        DriverFlags::INITIALIZER,
                    ));
                    driver_map.insert((0, width - 1), init_driver);
                }
            }

            if driver_map.is_empty() {
                driver_map.insert(bounds, driver);
                return result;
            }
        }

        // Overlap is checked for static variables (automatic variables
        // can't be driven continuously), uwire nets, user-defined nets
        // with no resolution function, and assertion local variables.
        let is_net = sym.kind() == SymbolKind::Net;
        let net_type = design.net_type(symbol);
        let is_uwire = net_type.is_some_and(|nt| nt.kind == NetKind::UWire);
        let is_single_driver_udnt = net_type.is_some_and(|nt| nt.is_single_driver_udnt());

        let check_overlap = design.variable_lifetime(symbol) == Some(Lifetime::Static)
            || is_uwire
            || is_single_driver_udnt
            || sym.kind() == SymbolKind::LocalAssertionVar;

        let allow_dup_initial = ctx.settings.allow_dup_initial_drivers;
        let should_ignore = |vd: &ValueDriver<'_>| {
            vd.source == DriverSource::Subroutine
                || vd.flags.contains(DriverFlags::INITIALIZER)
                || (vd.source == DriverSource::Initial && allow_dup_initial)
        };

        for (_, curr) in driver_map.overlapping(bounds) {
            let mut is_problem = false;

            if curr.is_unidirectional_port() != driver.is_unidirectional_port() {
                is_problem = true;
            } else if check_overlap {
                if driver.kind == DriverKind::Continuous || curr.kind == DriverKind::Continuous {
                    is_problem = true;
                } else if curr.containing_symbol != driver.containing_symbol
                    && !should_ignore(curr)
                    && !should_ignore(driver)
                    && (curr.is_in_single_driver_procedure()
                        || driver.is_in_single_driver_procedure())
                {
                    is_problem = true;
                }
            }

            if is_problem
                && !handle_overlap(
                    ctx,
                    symbol,
                    curr,
                    driver,
                    is_net,
                    is_uwire,
                    is_single_driver_udnt,
                    net_type,
                )
            {
                break;
            }
        }

        driver_map.insert(bounds, driver);
        result
    }

    /// Record a driver that reached a symbol through an interface port
    /// of `hier_ref.path[0]`'s owning body, replay it onto every
    /// registered non-canonical instance of that body, and follow
    /// chained interface ports to the parent connection.
    fn note_interface_port_driver(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        hier_ref: &'a HierarchicalReference<'a>,
        driver: &'a ValueDriver<'a>,
    ) {
        debug_assert!(hier_ref.via_iface_port);
        debug_assert!(hier_ref.target.is_some());

        let design = ctx.design;
        let port = hier_ref.path[0].symbol;
        let port_sym = design.symbol(port);
        debug_assert_eq!(port_sym.kind(), SymbolKind::InterfacePort);

        let Some(body) = port_sym.parent else {
            debug_assert!(false, "interface port without a parent scope");
            return;
        };
        debug_assert_eq!(design.symbol(body).kind(), SymbolKind::InstanceBody);

        let ipd = IfacePortDriver { hier_ref, driver };
        let non_canonical = {
            let mut state = self.instance_map.entry(body).or_default();
            state.iface_port_drivers.push(ipd);
            // Copy out so we can act on them outside the entry lock.
            state.non_canonical_instances.clone()
        };

        for instance in non_canonical {
            self.apply_instance_side_effect(ctx, alloc, ipd, instance);
        }

        // A target reached through another interface port is followed
        // recursively to the parent connection.
        if let SymbolInfo::InterfacePort {
            connection_expr: Some(expr),
            ..
        } = &port_sym.info
            && let ExprKind::ArbitrarySymbol {
                hier_ref: conn_ref, ..
            } = &expr.kind
            && conn_ref.via_iface_port
        {
            let joined = conn_ref.join(alloc, hier_ref);
            self.note_interface_port_driver(ctx, alloc, joined, driver);
        }
    }

    /// Project one interface-port driver onto a non-canonical instance:
    /// find the corresponding value symbol in that instance and insert
    /// a side-effect clone of the driver against it.
    fn apply_instance_side_effect(
        &self,
        ctx: &AnalysisContext<'a>,
        alloc: &'a Arena,
        ipd: IfacePortDriver<'a>,
        instance: SymbolId,
    ) {
        let design = ctx.design;
        let Some(target) = retarget_iface_port(design, ipd.hier_ref, instance) else {
            trace!(?instance, "interface port side effect dropped: retarget failed");
            return;
        };
        let Some(target_ty) = design.value_ty(target) else {
            return;
        };
        if target_ty.is_class() {
            return;
        }

        let mut cloned = ipd.driver.clone();
        cloned.containing_symbol = instance;
        cloned.from_side_effect = true;
        let driver = alloc.alloc(cloned);

        let Some(bounds) = get_bounds(driver.prefix_expression, design, target_ty) else {
            return;
        };

        let mut entry = self.symbol_drivers.entry(target).or_default();
        let hier_ref = self.add_driver(ctx, alloc, target, entry.value_mut(), driver, bounds);
        debug_assert!(hier_ref.is_none(), "side effect drivers never re-register");
    }
}
