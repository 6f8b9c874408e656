use silica_analysis::{AnalysisContext, DriverTracker};
use silica_arena::Arena;
use silica_hir::{
    DefinitionKind, DesignBuilder, Expr, HierarchicalReference, Lifetime, PathStep, Ty,
};
use silica_source::FileId;

use super::common::sp;

#[test]
fn side_effect_projected_onto_later_instance() {
    let arena = Arena::new();
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);

    // Two structurally identical interface bodies.
    let ib1 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x1 = b.variable(ib1, "x", Ty::bits(8), Lifetime::Static, None);
    let ib2 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x2 = b.variable(ib2, "x", Ty::bits(8), Lifetime::Static, None);
    let u1 = b.instance(top, "u1", ib1, None);
    let u2 = b.instance(top, "u2", ib2, Some(ib1));

    // Two bodies of module ext(I p), one per instantiation.
    let eb1 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let p1 = b.interface_port(eb1, "p", Some((u1, None)), None);
    let eb2 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let _p2 = b.interface_port(eb2, "p", Some((u2, None)), None);
    let _e1 = b.instance(top, "e1", eb1, None);
    let e2 = b.instance(top, "e2", eb2, Some(eb1));
    let design = b.finish();
    let ctx = AnalysisContext::new(&design);
    let tracker = DriverTracker::new();

    // Canonical analysis of ext drives p.x.
    let href = HierarchicalReference::new(
        &arena,
        &[PathStep::root(p1), PathStep::named(x1, "x")],
        true,
        Some(x1),
    );
    let drive = Expr::hierarchical(&arena, x1, href, sp(900));
    tracker.add_expr(&ctx, &arena, drive, eb1);

    assert_eq!(tracker.get_drivers(x1).len(), 1);
    assert!(
        tracker.get_drivers(x2).is_empty(),
        "no projection before the instance is registered"
    );

    tracker.note_non_canonical_instance(&ctx, &arena, e2);

    let drivers = tracker.get_drivers(x2);
    assert_eq!(drivers.len(), 1, "side effect projected onto u2's body");
    let (driver, bounds) = drivers[0];
    assert!(driver.from_side_effect);
    assert_eq!(driver.containing_symbol, e2);
    assert_eq!(bounds, (0, 7));
    assert!(ctx.take_diagnostics().is_empty());
}

#[test]
fn side_effect_replay_is_order_independent() {
    let project = |register_first: bool| {
        let arena = Arena::new();
        let mut b = DesignBuilder::new(FileId(0));
        let top = b.instance_body(None, "top", DefinitionKind::Module);
        let ib1 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
        let x1 = b.variable(ib1, "x", Ty::bits(8), Lifetime::Static, None);
        let ib2 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
        let x2 = b.variable(ib2, "x", Ty::bits(8), Lifetime::Static, None);
        let u1 = b.instance(top, "u1", ib1, None);
        let u2 = b.instance(top, "u2", ib2, Some(ib1));
        let eb1 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
        let p1 = b.interface_port(eb1, "p", Some((u1, None)), None);
        let eb2 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
        let _p2 = b.interface_port(eb2, "p", Some((u2, None)), None);
        let _e1 = b.instance(top, "e1", eb1, None);
        let e2 = b.instance(top, "e2", eb2, Some(eb1));
        let design = b.finish();
        let ctx = AnalysisContext::new(&design);
        let tracker = DriverTracker::new();

        let href = HierarchicalReference::new(
            &arena,
            &[PathStep::root(p1), PathStep::named(x1, "x")],
            true,
            Some(x1),
        );
        let drive = Expr::hierarchical(&arena, x1, href, sp(900));

        if register_first {
            tracker.note_non_canonical_instance(&ctx, &arena, e2);
            tracker.add_expr(&ctx, &arena, drive, eb1);
        } else {
            tracker.add_expr(&ctx, &arena, drive, eb1);
            tracker.note_non_canonical_instance(&ctx, &arena, e2);
        }

        let mut set: Vec<_> = tracker
            .get_drivers(x2)
            .iter()
            .map(|(d, bounds)| (*bounds, d.from_side_effect))
            .collect();
        set.sort();
        set
    };

    assert_eq!(project(true), project(false));
    assert_eq!(project(true), vec![((0, 7), true)]);
}

#[test]
fn range_and_index_selects_into_instance_arrays_retarget() {
    let arena = Arena::new();
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);

    // Canonical-side array of interface instances.
    let iba = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let _xa = b.variable(iba, "x", Ty::bits(8), Lifetime::Static, None);
    let ibb = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let xb = b.variable(ibb, "x", Ty::bits(8), Lifetime::Static, None);
    let ua = b.instance(top, "arr_0", iba, None);
    let ub = b.instance(top, "arr_1", ibb, None);
    let arr1 = b.instance_array(top, "arr", &[ua, ub]);

    // Non-canonical-side array.
    let ibc = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let _xc = b.variable(ibc, "x", Ty::bits(8), Lifetime::Static, None);
    let ibd = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let xd = b.variable(ibd, "x", Ty::bits(8), Lifetime::Static, None);
    let uc = b.instance(top, "arr2_0", ibc, None);
    let ud = b.instance(top, "arr2_1", ibd, None);
    let arr2 = b.instance_array(top, "arr2", &[uc, ud]);

    let eb1 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let p1 = b.interface_port(eb1, "p", Some((arr1, None)), None);
    let eb2 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let _p2 = b.interface_port(eb2, "p", Some((arr2, None)), None);
    let _e1 = b.instance(top, "e1", eb1, None);
    let e2 = b.instance(top, "e2", eb2, Some(eb1));
    let design = b.finish();
    let ctx = AnalysisContext::new(&design);
    let tracker = DriverTracker::new();

    // p[0:1][1].x on the canonical side.
    let href = HierarchicalReference::new(
        &arena,
        &[
            PathStep::root(p1),
            PathStep::range(arr1, 0, 1),
            PathStep::index(ub, 1),
            PathStep::named(xb, "x"),
        ],
        true,
        Some(xb),
    );
    let drive = Expr::hierarchical(&arena, xb, href, sp(910));
    tracker.add_expr(&ctx, &arena, drive, eb1);
    tracker.note_non_canonical_instance(&ctx, &arena, e2);

    let drivers = tracker.get_drivers(xd);
    assert_eq!(drivers.len(), 1, "retarget walked range then index");
    assert!(drivers[0].0.from_side_effect);
}

#[test]
fn out_of_bounds_retarget_is_silently_dropped() {
    let arena = Arena::new();
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);
    let iba = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let xa = b.variable(iba, "x", Ty::bits(8), Lifetime::Static, None);
    let ua = b.instance(top, "u", iba, None);
    let arr1 = b.instance_array(top, "arr", &[ua]);

    let ibc = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let xc = b.variable(ibc, "x", Ty::bits(8), Lifetime::Static, None);
    let uc = b.instance(top, "u2", ibc, None);
    let arr2 = b.instance_array(top, "arr2", &[uc]);

    let eb1 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let p1 = b.interface_port(eb1, "p", Some((arr1, None)), None);
    let eb2 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let _p2 = b.interface_port(eb2, "p", Some((arr2, None)), None);
    let _e1 = b.instance(top, "e1", eb1, None);
    let e2 = b.instance(top, "e2", eb2, Some(eb1));
    let design = b.finish();
    let ctx = AnalysisContext::new(&design);
    let tracker = DriverTracker::new();

    let href = HierarchicalReference::new(
        &arena,
        &[
            PathStep::root(p1),
            PathStep::index(ua, 5),
            PathStep::named(xa, "x"),
        ],
        true,
        Some(xa),
    );
    let drive = Expr::hierarchical(&arena, xa, href, sp(920));
    tracker.add_expr(&ctx, &arena, drive, eb1);
    tracker.note_non_canonical_instance(&ctx, &arena, e2);

    assert!(tracker.get_drivers(xc).is_empty(), "index 5 of a 1-element array");
    assert!(ctx.take_diagnostics().is_empty(), "dropped without a report");
}

#[test]
fn chained_interface_ports_thread_the_driver_to_the_parent() {
    let arena = Arena::new();
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);

    let ib1 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x1 = b.variable(ib1, "x", Ty::bits(8), Lifetime::Static, None);
    let ib2 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x2 = b.variable(ib2, "x", Ty::bits(8), Lifetime::Static, None);
    let u1 = b.instance(top, "u1", ib1, None);
    let u2 = b.instance(top, "u2", ib2, Some(ib1));

    // Module mid(I q) instantiates ext(I p) with .p(q).
    let mb1 = b.instance_body(Some(top), "mid", DefinitionKind::Module);
    let q1 = b.interface_port(mb1, "q", Some((u1, None)), None);
    let mb2 = b.instance_body(Some(top), "mid", DefinitionKind::Module);
    let _q2 = b.interface_port(mb2, "q", Some((u2, None)), None);

    let eb1 = b.instance_body(Some(mb1), "ext", DefinitionKind::Module);
    let conn_ref = HierarchicalReference::new(&arena, &[PathStep::root(q1)], true, Some(u1));
    let conn_expr = Expr::arbitrary_symbol(&arena, u1, conn_ref, sp(40));
    let p1 = b.interface_port(eb1, "p", Some((q1, None)), Some(conn_expr));
    let _ext1 = b.instance(mb1, "ext_i", eb1, None);

    let _m1 = b.instance(top, "m1", mb1, None);
    let m2 = b.instance(top, "m2", mb2, Some(mb1));
    let design = b.finish();
    let ctx = AnalysisContext::new(&design);
    let tracker = DriverTracker::new();

    let href = HierarchicalReference::new(
        &arena,
        &[PathStep::root(p1), PathStep::named(x1, "x")],
        true,
        Some(x1),
    );
    let drive = Expr::hierarchical(&arena, x1, href, sp(930));
    tracker.add_expr(&ctx, &arena, drive, eb1);

    tracker.note_non_canonical_instance(&ctx, &arena, m2);

    let drivers = tracker.get_drivers(x2);
    assert_eq!(
        drivers.len(),
        1,
        "driver followed the chained port into mid's other instance"
    );
    assert!(drivers[0].0.from_side_effect);
    assert_eq!(drivers[0].0.containing_symbol, m2);
}

#[test]
fn retarget_through_modport_lands_on_the_other_modport_port() {
    let arena = Arena::new();
    let mut b = DesignBuilder::new(FileId(0));
    let top = b.instance_body(None, "top", DefinitionKind::Module);

    let ib1 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x1 = b.variable(ib1, "x", Ty::bits(8), Lifetime::Static, None);
    let mp1 = b.modport(ib1, "mp");
    let xm1 = b.modport_port(mp1, "x", Ty::bits(8), Some(Expr::named(&arena, x1, sp(20))));

    let ib2 = b.instance_body(Some(top), "I", DefinitionKind::Interface);
    let x2 = b.variable(ib2, "x", Ty::bits(8), Lifetime::Static, None);
    let mp2 = b.modport(ib2, "mp");
    let _xm2 = b.modport_port(mp2, "x", Ty::bits(8), Some(Expr::named(&arena, x2, sp(30))));

    let u1 = b.instance(top, "u1", ib1, None);
    let u2 = b.instance(top, "u2", ib2, Some(ib1));

    let eb1 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let p1 = b.interface_port(eb1, "p", Some((u1, Some(mp1))), None);
    let eb2 = b.instance_body(Some(top), "ext", DefinitionKind::Module);
    let _p2 = b.interface_port(eb2, "p", Some((u2, Some(mp2))), None);
    let _e1 = b.instance(top, "e1", eb1, None);
    let e2 = b.instance(top, "e2", eb2, Some(eb1));
    let design = b.finish();
    let ctx = AnalysisContext::new(&design);
    let tracker = DriverTracker::new();

    // Drive p.x, which resolves to the modport port in the canonical body.
    let href = HierarchicalReference::new(
        &arena,
        &[PathStep::root(p1), PathStep::named(xm1, "x")],
        true,
        Some(xm1),
    );
    let drive = Expr::hierarchical(&arena, xm1, href, sp(940));
    tracker.add_expr(&ctx, &arena, drive, eb1);
    tracker.note_non_canonical_instance(&ctx, &arena, e2);

    // Both modport ports now hold a pending driver; propagation projects
    // them onto the real members.
    tracker.propagate_modport_drivers(&ctx, &arena);

    assert_eq!(tracker.get_drivers(x1).len(), 1);
    assert_eq!(tracker.get_drivers(x2).len(), 1);
    assert!(ctx.take_diagnostics().is_empty());
}
