use silica_arena::Arena;
use silica_source::Span;

use crate::hier::HierarchicalReference;
use crate::symbols::SymbolId;

/// Part-select flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelectKind {
    /// `[left:right]`
    Simple,
    /// `[base +: width]`
    IndexedUp,
    /// `[base -: width]`
    IndexedDown,
}

/// An elaborated expression node.
///
/// Nodes are arena-allocated and immutable. Analysis never rewrites a
/// node in place; substituting a new root (modport splicing) allocates a
/// fresh node around the existing children.
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    /// Direct reference to a value symbol in a visible scope.
    NamedValue { symbol: SymbolId },
    /// Reference that resolved through a hierarchical path.
    HierarchicalValue {
        symbol: SymbolId,
        hier_ref: &'a HierarchicalReference<'a>,
    },
    ElementSelect {
        value: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    RangeSelect {
        select_kind: RangeSelectKind,
        value: &'a Expr<'a>,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    MemberAccess {
        value: &'a Expr<'a>,
        member: SymbolId,
    },
    Assignment {
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Concat { parts: &'a [&'a Expr<'a>] },
    /// Reference to a non-value symbol (e.g. an interface instance
    /// flowing through a port connection).
    ArbitrarySymbol {
        symbol: SymbolId,
        hier_ref: &'a HierarchicalReference<'a>,
    },
    IntLiteral { value: i64 },
    /// Expression that failed to elaborate upstream.
    Invalid,
}

impl<'a> Expr<'a> {
    pub fn named(arena: &'a Arena, symbol: SymbolId, span: Span) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::NamedValue { symbol },
            span,
        })
    }

    pub fn hierarchical(
        arena: &'a Arena,
        symbol: SymbolId,
        hier_ref: &'a HierarchicalReference<'a>,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::HierarchicalValue { symbol, hier_ref },
            span,
        })
    }

    pub fn element_select(
        arena: &'a Arena,
        value: &'a Expr<'a>,
        index: &'a Expr<'a>,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::ElementSelect { value, index },
            span,
        })
    }

    pub fn range_select(
        arena: &'a Arena,
        select_kind: RangeSelectKind,
        value: &'a Expr<'a>,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::RangeSelect {
                select_kind,
                value,
                left,
                right,
            },
            span,
        })
    }

    pub fn member_access(
        arena: &'a Arena,
        value: &'a Expr<'a>,
        member: SymbolId,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::MemberAccess { value, member },
            span,
        })
    }

    pub fn assignment(
        arena: &'a Arena,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::Assignment { left, right },
            span,
        })
    }

    pub fn concat(arena: &'a Arena, parts: &[&'a Expr<'a>], span: Span) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::Concat {
                parts: arena.alloc_slice_copy(parts),
            },
            span,
        })
    }

    pub fn arbitrary_symbol(
        arena: &'a Arena,
        symbol: SymbolId,
        hier_ref: &'a HierarchicalReference<'a>,
        span: Span,
    ) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::ArbitrarySymbol { symbol, hier_ref },
            span,
        })
    }

    pub fn int_literal(arena: &'a Arena, value: i64, span: Span) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::IntLiteral { value },
            span,
        })
    }

    pub fn invalid(arena: &'a Arena, span: Span) -> &'a Expr<'a> {
        arena.alloc(Expr {
            kind: ExprKind::Invalid,
            span,
        })
    }

    /// True for expressions that failed to elaborate upstream.
    pub fn bad(&self) -> bool {
        matches!(self.kind, ExprKind::Invalid)
    }

    /// Compile-time constant value, if this is a literal.
    pub fn const_value(&self) -> Option<i64> {
        match self.kind {
            ExprKind::IntLiteral { value } => Some(value),
            _ => None,
        }
    }
}
