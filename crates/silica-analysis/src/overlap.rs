use silica_diag::{Arg, Diagnostic, DiagnosticCode, Label, Message, MessageId, Severity};
use silica_hir::{NetType, SymbolId};
use silica_source::Span;

use crate::context::AnalysisContext;
use crate::driver::{DriverFlags, DriverKind, ValueDriver};
use crate::lsp::stringify_lsp;

/// Decide and report the diagnostic for one overlapping driver pair.
///
/// Returns true iff the overlap is tolerated (a warning); a false
/// return ends the overlap scan for the current insertion, bounding
/// output to one hard error per inserted driver.
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_overlap(
    ctx: &AnalysisContext<'_>,
    symbol: SymbolId,
    curr: &ValueDriver<'_>,
    driver: &ValueDriver<'_>,
    is_net: bool,
    is_uwire: bool,
    is_single_driver_udnt: bool,
    net_type: Option<&NetType>,
) -> bool {
    let design = ctx.design;
    let sym = design.symbol(symbol);
    let mut curr_range = curr.source_range();
    let mut driver_range = driver.source_range();

    // Specialized cases before the generic mixed/multiple handling:
    // 1. a non-uwire net with an input or output port driver
    // 2. a variable with an input port driver
    let is_unidirectional_net_port =
        is_net && (curr.is_unidirectional_port() || driver.is_unidirectional_port());

    if (is_unidirectional_net_port && !is_uwire && !is_single_driver_udnt)
        || (!is_net && (curr.is_input_port() || driver.is_input_port()))
    {
        let (code, msg_id) = if is_net {
            if curr.flags.contains(DriverFlags::INPUT_PORT) {
                (
                    DiagnosticCode::INPUT_PORT_COERCION,
                    MessageId::InputPortCoercion,
                )
            } else {
                (
                    DiagnosticCode::OUTPUT_PORT_COERCION,
                    MessageId::OutputPortCoercion,
                )
            }
        } else {
            (DiagnosticCode::INPUT_PORT_ASSIGN, MessageId::InputPortAssign)
        };

        // Pick the right range for the port vs the assignment. Output
        // ports show up at the instantiation site, and that site reads
        // as the port declaration.
        let mut port_range = curr_range;
        let mut assign_range = driver_range;
        if driver.is_input_port() || curr.flags.contains(DriverFlags::OUTPUT_PORT) {
            std::mem::swap(&mut port_range, &mut assign_range);
        }

        let severity = if is_net {
            Severity::Warning
        } else {
            Severity::Error
        };
        let note = if code == DiagnosticCode::OUTPUT_PORT_COERCION {
            MessageId::NoteDrivenHere
        } else {
            MessageId::NoteDeclarationHere
        };
        ctx.report(
            Diagnostic::new(
                severity,
                code,
                Message::new(msg_id, [Arg::name(sym.name.clone())]),
            )
            .with_label(Label::primary(
                assign_range,
                Message::simple(MessageId::NoteAssignedHere),
            ))
            .with_label(Label::secondary(port_range, Message::simple(note))),
        );

        // For variable ports this is an error, for nets a warning.
        return is_net;
    }

    if curr.is_clock_var() || driver.is_clock_var() {
        // Two clockvars may drive the same target.
        if curr.is_clock_var() && driver.is_clock_var() {
            return true;
        }

        // Procedural drivers to clockvar targets are allowed.
        if curr.kind == DriverKind::Procedural || driver.kind == DriverKind::Procedural {
            return true;
        }

        if driver.is_clock_var() {
            std::mem::swap(&mut driver_range, &mut curr_range);
        }
        ctx.report(
            Diagnostic::new(
                Severity::Error,
                DiagnosticCode::CLOCK_VAR_TARGET_ASSIGN,
                Message::new(MessageId::ClockVarTargetAssign, [Arg::name(sym.name.clone())]),
            )
            .with_label(Label::primary(
                driver_range,
                Message::simple(MessageId::NoteAssignedHere),
            ))
            .with_label(Label::secondary(
                curr_range,
                Message::simple(MessageId::NoteReferencedHere),
            )),
        );
        return false;
    }

    // When both sites share a start location, the symbol is driven from
    // the same source text through different parts of the hierarchy;
    // name both paths instead of pointing at the same text twice.
    let add_assigned_here = |diag: Diagnostic, curr_range: Span, driver_range: Span| {
        if curr_range.file != driver_range.file || curr_range.start() != driver_range.start() {
            diag.with_label(Label::secondary(
                curr_range,
                Message::simple(MessageId::NoteAssignedHere),
            ))
        } else {
            diag.with_note(Message::new(
                MessageId::NoteFromHere2,
                [
                    Arg::name(design.hierarchical_path(driver.containing_symbol)),
                    Arg::name(design.hierarchical_path(curr.containing_symbol)),
                ],
            ))
        }
    };

    if curr.kind == DriverKind::Procedural && driver.kind == DriverKind::Procedural {
        // Multiple procedural drivers where one of them is an
        // always_comb / always_ff / always_latch block.
        let source_for_name = if driver.is_in_single_driver_procedure() {
            driver
        } else {
            std::mem::swap(&mut driver_range, &mut curr_range);
            curr
        };

        let mut diag = Diagnostic::new(
            Severity::Error,
            DiagnosticCode::MULTIPLE_ALWAYS_ASSIGNS,
            Message::new(
                MessageId::MultipleAlwaysAssigns,
                [
                    Arg::name(stringify_lsp(source_for_name.prefix_expression, design)),
                    Arg::name(source_for_name.source.keyword()),
                ],
            ),
        )
        .with_label(Label::primary(
            driver_range,
            Message::simple(MessageId::NoteAssignedHere),
        ));
        diag = add_assigned_here(diag, curr_range, driver_range);

        if driver.proc_call_expression.is_some() || curr.proc_call_expression.is_some() {
            let extra_range = if driver.proc_call_expression.is_some() {
                driver.prefix_expression.span
            } else {
                curr.prefix_expression.span
            };
            diag = diag.with_label(Label::secondary(
                extra_range,
                Message::simple(MessageId::NoteOriginalAssign),
            ));
        }

        ctx.report(diag);
        return false;
    }

    let lsp_name = stringify_lsp(driver.prefix_expression, design);
    let (code, message) = if is_uwire {
        (
            DiagnosticCode::MULTIPLE_UWIRE_DRIVERS,
            Message::new(MessageId::MultipleUWireDrivers, [Arg::name(lsp_name)]),
        )
    } else if is_single_driver_udnt {
        let net_type_name = net_type.map(|nt| nt.name.clone()).unwrap_or_default();
        (
            DiagnosticCode::MULTIPLE_UDNT_DRIVERS,
            Message::new(
                MessageId::MultipleUdntDrivers,
                [Arg::name(lsp_name), Arg::Name(net_type_name)],
            ),
        )
    } else if driver.kind == DriverKind::Continuous && curr.kind == DriverKind::Continuous {
        (
            DiagnosticCode::MULTIPLE_CONT_ASSIGNS,
            Message::new(MessageId::MultipleContAssigns, [Arg::name(lsp_name)]),
        )
    } else {
        (
            DiagnosticCode::MIXED_VAR_ASSIGNS,
            Message::new(MessageId::MixedVarAssigns, [Arg::name(lsp_name)]),
        )
    };

    let mut diag = Diagnostic::new(Severity::Error, code, message).with_label(Label::primary(
        driver_range,
        Message::simple(MessageId::NoteAssignedHere),
    ));
    diag = add_assigned_here(diag, curr_range, driver_range);
    ctx.report(diag);
    false
}
