pub mod design;
pub mod expr;
pub mod hier;
pub mod symbols;

pub use design::{Design, DesignBuilder, allowed_in_modport};
pub use expr::{Expr, ExprKind, RangeSelectKind};
pub use hier::{HierarchicalReference, PathStep, Selector};
pub use symbols::{
    ArgumentDirection, DefinitionKind, Lifetime, NetKind, NetType, ProceduralBlockKind, Symbol,
    SymbolId, SymbolInfo, SymbolKind, Ty,
};
