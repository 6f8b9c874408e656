use silica_source::Span;
use smol_str::SmolStr;

use crate::expr::Expr;

/// Index into the design's symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind discriminant for a symbol, derived from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Net,
    Variable,
    Field,
    ClassProperty,
    Port,
    MultiPort,
    InterfacePort,
    ModportPort,
    ClockVar,
    LocalAssertionVar,
    Instance,
    InstanceBody,
    InstanceArray,
    Modport,
    GenerateBlockArray,
    ProceduralBlock,
    Subroutine,
    Package,
}

/// The slice of the type system driver analysis needs.
///
/// Packed aggregates are modeled by their total packed width; `Field`
/// symbols carry their own bit offset so member accesses narrow the
/// driven interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Bits { width: u64 },
    Class,
}

impl Ty {
    pub fn bits(width: u64) -> Self {
        Ty::Bits { width }
    }

    /// Number of individually selectable bits. Class handles have none.
    pub fn selectable_width(&self) -> u64 {
        match self {
            Ty::Bits { width } => *width,
            Ty::Class => 0,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Ty::Class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    Wire,
    UWire,
    UserDefined,
}

/// Net type of a net symbol. User-defined net types without a
/// resolution function permit at most one driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetType {
    pub name: SmolStr,
    pub kind: NetKind,
    pub has_resolution_fn: bool,
}

impl NetType {
    pub fn wire() -> Self {
        Self {
            name: SmolStr::new_static("wire"),
            kind: NetKind::Wire,
            has_resolution_fn: true,
        }
    }

    pub fn uwire() -> Self {
        Self {
            name: SmolStr::new_static("uwire"),
            kind: NetKind::UWire,
            has_resolution_fn: false,
        }
    }

    pub fn user_defined(name: impl Into<SmolStr>, has_resolution_fn: bool) -> Self {
        Self {
            name: name.into(),
            kind: NetKind::UserDefined,
            has_resolution_fn,
        }
    }

    pub fn is_single_driver_udnt(&self) -> bool {
        self.kind == NetKind::UserDefined && !self.has_resolution_fn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentDirection {
    In,
    Out,
    InOut,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Static,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Module,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProceduralBlockKind {
    Initial,
    Final,
    Always,
    AlwaysComb,
    AlwaysLatch,
    AlwaysFF,
}

impl ProceduralBlockKind {
    /// Source keyword for the block kind, used in diagnostics.
    pub fn keyword(self) -> &'static str {
        match self {
            ProceduralBlockKind::Initial => "initial",
            ProceduralBlockKind::Final => "final",
            ProceduralBlockKind::Always => "always",
            ProceduralBlockKind::AlwaysComb => "always_comb",
            ProceduralBlockKind::AlwaysLatch => "always_latch",
            ProceduralBlockKind::AlwaysFF => "always_ff",
        }
    }
}

/// An elaborated symbol.
///
/// `parent` is the lexically owning scope. Kind-specific data lives in
/// `info`; the design table owns member lists separately.
#[derive(Debug)]
pub struct Symbol<'a> {
    pub name: SmolStr,
    pub span: Span,
    pub parent: Option<SymbolId>,
    pub info: SymbolInfo<'a>,
}

impl<'a> Symbol<'a> {
    pub fn kind(&self) -> SymbolKind {
        match &self.info {
            SymbolInfo::Net { .. } => SymbolKind::Net,
            SymbolInfo::Variable { .. } => SymbolKind::Variable,
            SymbolInfo::Field { .. } => SymbolKind::Field,
            SymbolInfo::ClassProperty { .. } => SymbolKind::ClassProperty,
            SymbolInfo::Port { .. } => SymbolKind::Port,
            SymbolInfo::MultiPort { .. } => SymbolKind::MultiPort,
            SymbolInfo::InterfacePort { .. } => SymbolKind::InterfacePort,
            SymbolInfo::ModportPort { .. } => SymbolKind::ModportPort,
            SymbolInfo::ClockVar { .. } => SymbolKind::ClockVar,
            SymbolInfo::LocalAssertionVar { .. } => SymbolKind::LocalAssertionVar,
            SymbolInfo::Instance { .. } => SymbolKind::Instance,
            SymbolInfo::InstanceBody { .. } => SymbolKind::InstanceBody,
            SymbolInfo::InstanceArray { .. } => SymbolKind::InstanceArray,
            SymbolInfo::Modport => SymbolKind::Modport,
            SymbolInfo::GenerateBlockArray { .. } => SymbolKind::GenerateBlockArray,
            SymbolInfo::ProceduralBlock { .. } => SymbolKind::ProceduralBlock,
            SymbolInfo::Subroutine => SymbolKind::Subroutine,
            SymbolInfo::Package => SymbolKind::Package,
        }
    }
}

/// Kind-specific symbol payload.
#[derive(Debug)]
pub enum SymbolInfo<'a> {
    Net {
        ty: Ty,
        net_type: NetType,
        initializer: Option<&'a Expr<'a>>,
    },
    Variable {
        ty: Ty,
        lifetime: Lifetime,
        initializer: Option<&'a Expr<'a>>,
    },
    Field {
        ty: Ty,
        offset: u64,
        initializer: Option<&'a Expr<'a>>,
    },
    ClassProperty {
        ty: Ty,
        initializer: Option<&'a Expr<'a>>,
    },
    Port {
        ty: Option<Ty>,
        direction: ArgumentDirection,
        internal_symbol: Option<SymbolId>,
        internal_expr: Option<&'a Expr<'a>>,
    },
    MultiPort {
        direction: ArgumentDirection,
    },
    InterfacePort {
        /// Connected symbol and optional modport selection.
        connection: Option<(SymbolId, Option<SymbolId>)>,
        connection_expr: Option<&'a Expr<'a>>,
    },
    ModportPort {
        ty: Ty,
        connection_expr: Option<&'a Expr<'a>>,
    },
    ClockVar {
        ty: Ty,
        direction: ArgumentDirection,
        initializer: Option<&'a Expr<'a>>,
    },
    LocalAssertionVar {
        ty: Ty,
    },
    Instance {
        body: SymbolId,
        /// For instances whose body was deduplicated away during
        /// analysis: the structurally identical body that was analyzed
        /// in this one's place.
        canonical_body: Option<SymbolId>,
    },
    InstanceBody {
        definition_kind: DefinitionKind,
    },
    InstanceArray {
        elements: Box<[SymbolId]>,
    },
    Modport,
    GenerateBlockArray {
        entries: Box<[SymbolId]>,
        valid: bool,
    },
    ProceduralBlock {
        kind: ProceduralBlockKind,
    },
    Subroutine,
    Package,
}
