use silica_arena::Arena;
use smol_str::SmolStr;

use crate::symbols::SymbolId;

/// How a hierarchical path step narrows the previous symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(i32),
    Range(i32, i32),
    Name(SmolStr),
}

/// One step of a hierarchical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub symbol: SymbolId,
    pub selector: Option<Selector>,
}

impl PathStep {
    pub fn root(symbol: SymbolId) -> Self {
        Self {
            symbol,
            selector: None,
        }
    }

    pub fn named(symbol: SymbolId, name: impl Into<SmolStr>) -> Self {
        Self {
            symbol,
            selector: Some(Selector::Name(name.into())),
        }
    }

    pub fn index(symbol: SymbolId, index: i32) -> Self {
        Self {
            symbol,
            selector: Some(Selector::Index(index)),
        }
    }

    pub fn range(symbol: SymbolId, left: i32, right: i32) -> Self {
        Self {
            symbol,
            selector: Some(Selector::Range(left, right)),
        }
    }
}

/// A resolved hierarchical reference: the ordered lookup path plus the
/// value symbol it lands on.
///
/// `via_iface_port` is set when `path[0]` is an interface port; such
/// references represent drivers that flow through the port into the
/// instantiating scope.
#[derive(Debug)]
pub struct HierarchicalReference<'a> {
    pub path: &'a [PathStep],
    pub via_iface_port: bool,
    pub target: Option<SymbolId>,
}

impl<'a> HierarchicalReference<'a> {
    pub fn new(
        arena: &'a Arena,
        path: &[PathStep],
        via_iface_port: bool,
        target: Option<SymbolId>,
    ) -> &'a HierarchicalReference<'a> {
        arena.alloc(HierarchicalReference {
            path: arena.alloc_slice_clone(path),
            via_iface_port,
            target,
        })
    }

    /// Join this reference (an interface port's own connection) with an
    /// inner reference rooted at that port: the joined path follows this
    /// connection first, then continues with the inner path minus its
    /// root step. Used to thread drivers through chained interface
    /// ports.
    pub fn join(
        &self,
        arena: &'a Arena,
        inner: &HierarchicalReference<'_>,
    ) -> &'a HierarchicalReference<'a> {
        let mut path = Vec::with_capacity(self.path.len() + inner.path.len().saturating_sub(1));
        path.extend_from_slice(self.path);
        if inner.path.len() > 1 {
            path.extend_from_slice(&inner.path[1..]);
        }
        arena.alloc(HierarchicalReference {
            path: arena.alloc_slice_clone(&path),
            via_iface_port: true,
            target: inner.target,
        })
    }
}
