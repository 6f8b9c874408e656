use silica_hir::{Design, Expr, ExprKind, RangeSelectKind, SymbolId, SymbolInfo, Ty};

use crate::driver::DriverBitRange;

/// Enumerate each storage-touching value symbol of a driven expression
/// with its longest static prefix.
///
/// Assignments recurse into the left side (the right side is visited as
/// a non-lvalue), concatenations fan out per part, and select chains
/// terminate at their root named or hierarchical value. When
/// `initial_lsp` is given it replaces the reported prefix for the root
/// value -- the hook modport splicing uses to graft an outer select
/// onto a connection expression.
pub fn visit_lsps<'a>(
    expr: &'a Expr<'a>,
    initial_lsp: Option<&'a Expr<'a>>,
    f: &mut dyn FnMut(SymbolId, &'a Expr<'a>, bool),
) {
    visit_rec(expr, initial_lsp, true, f);
}

fn visit_rec<'a>(
    expr: &'a Expr<'a>,
    initial_lsp: Option<&'a Expr<'a>>,
    is_lvalue: bool,
    f: &mut dyn FnMut(SymbolId, &'a Expr<'a>, bool),
) {
    match &expr.kind {
        ExprKind::Assignment { left, right } => {
            visit_rec(*left, initial_lsp, is_lvalue, f);
            visit_rec(*right, None, false, f);
        }
        ExprKind::Concat { parts } => {
            for &part in *parts {
                visit_rec(part, None, is_lvalue, f);
            }
        }
        ExprKind::NamedValue { .. }
        | ExprKind::HierarchicalValue { .. }
        | ExprKind::ElementSelect { .. }
        | ExprKind::RangeSelect { .. }
        | ExprKind::MemberAccess { .. } => {
            if let Some(symbol) = root_symbol(expr) {
                f(symbol, initial_lsp.unwrap_or(expr), is_lvalue);
            }
        }
        _ => {}
    }
}

/// The value symbol a select chain is rooted at.
pub fn root_symbol(expr: &Expr<'_>) -> Option<SymbolId> {
    match &expr.kind {
        ExprKind::NamedValue { symbol } | ExprKind::HierarchicalValue { symbol, .. } => {
            Some(*symbol)
        }
        ExprKind::ElementSelect { value, .. }
        | ExprKind::RangeSelect { value, .. }
        | ExprKind::MemberAccess { value, .. } => root_symbol(value),
        _ => None,
    }
}

/// Static bit interval a prefix expression touches, against the root
/// symbol's type.
///
/// Returns `None` when a selector is not a compile-time constant or
/// lands out of range; such drivers are conservatively dropped.
pub fn get_bounds(lsp: &Expr<'_>, design: &Design<'_>, ty: &Ty) -> Option<DriverBitRange> {
    let width = ty.selectable_width();
    if width == 0 {
        return None;
    }
    bounds_rec(lsp, design, width)
}

fn bounds_rec(expr: &Expr<'_>, design: &Design<'_>, root_width: u64) -> Option<DriverBitRange> {
    match &expr.kind {
        ExprKind::NamedValue { .. } | ExprKind::HierarchicalValue { .. } => {
            Some((0, root_width - 1))
        }
        ExprKind::ElementSelect { value, index } => {
            let (lo, hi) = bounds_rec(value, design, root_width)?;
            let idx = index.const_value()?;
            if idx < 0 {
                return None;
            }
            let idx = idx as u64;
            if idx > hi - lo {
                return None;
            }
            Some((lo + idx, lo + idx))
        }
        ExprKind::RangeSelect {
            select_kind,
            value,
            left,
            right,
        } => {
            let (lo, hi) = bounds_rec(value, design, root_width)?;
            let l = left.const_value()?;
            let r = right.const_value()?;
            let (sel_lo, sel_hi) = match select_kind {
                RangeSelectKind::Simple => (l.min(r), l.max(r)),
                RangeSelectKind::IndexedUp => (l, l + r - 1),
                RangeSelectKind::IndexedDown => (l - r + 1, l),
            };
            if sel_lo < 0 || sel_hi < sel_lo {
                return None;
            }
            let (sel_lo, sel_hi) = (sel_lo as u64, sel_hi as u64);
            if sel_hi > hi - lo {
                return None;
            }
            Some((lo + sel_lo, lo + sel_hi))
        }
        ExprKind::MemberAccess { value, member } => {
            let (lo, hi) = bounds_rec(value, design, root_width)?;
            let SymbolInfo::Field { ty, offset, .. } = &design.symbol(*member).info else {
                return None;
            };
            let field_width = ty.selectable_width();
            if field_width == 0 {
                return None;
            }
            let m_lo = lo + *offset;
            let m_hi = m_lo + field_width - 1;
            if m_hi > hi {
                return None;
            }
            Some((m_lo, m_hi))
        }
        _ => None,
    }
}

/// Canonical textual form of a prefix expression for diagnostics.
pub fn stringify_lsp(expr: &Expr<'_>, design: &Design<'_>) -> String {
    match &expr.kind {
        ExprKind::NamedValue { symbol } | ExprKind::HierarchicalValue { symbol, .. } => {
            design.symbol(*symbol).name.to_string()
        }
        ExprKind::ElementSelect { value, index } => {
            format!("{}[{}]", stringify_lsp(value, design), render_selector(index))
        }
        ExprKind::RangeSelect {
            select_kind,
            value,
            left,
            right,
        } => {
            let op = match select_kind {
                RangeSelectKind::Simple => ":",
                RangeSelectKind::IndexedUp => "+:",
                RangeSelectKind::IndexedDown => "-:",
            };
            format!(
                "{}[{}{}{}]",
                stringify_lsp(value, design),
                render_selector(left),
                op,
                render_selector(right)
            )
        }
        ExprKind::MemberAccess { value, member } => {
            format!(
                "{}.{}",
                stringify_lsp(value, design),
                design.symbol(*member).name
            )
        }
        _ => String::new(),
    }
}

fn render_selector(expr: &Expr<'_>) -> String {
    expr.const_value()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".into())
}

/// Pre-order walk over an expression and its operands.
pub fn visit_components<'a>(
    expr: &'a Expr<'a>,
    include_root: bool,
    f: &mut dyn FnMut(&'a Expr<'a>),
) {
    if include_root {
        f(expr);
    }
    match &expr.kind {
        ExprKind::ElementSelect { value, index } => {
            visit_components(*value, true, f);
            visit_components(*index, true, f);
        }
        ExprKind::RangeSelect {
            value, left, right, ..
        } => {
            visit_components(*value, true, f);
            visit_components(*left, true, f);
            visit_components(*right, true, f);
        }
        ExprKind::MemberAccess { value, .. } => visit_components(*value, true, f),
        ExprKind::Assignment { left, right } => {
            visit_components(*left, true, f);
            visit_components(*right, true, f);
        }
        ExprKind::Concat { parts } => {
            for &part in *parts {
                visit_components(part, true, f);
            }
        }
        _ => {}
    }
}
