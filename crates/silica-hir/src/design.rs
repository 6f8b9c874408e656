use silica_source::{FileId, Span};
use smol_str::SmolStr;

use crate::expr::Expr;
use crate::symbols::{
    ArgumentDirection, DefinitionKind, Lifetime, NetType, ProceduralBlockKind, Symbol, SymbolId,
    SymbolInfo, SymbolKind, Ty,
};

/// The elaborated design: a frozen symbol table plus per-symbol member
/// lists.
///
/// Built once by the elaborator (or a test fixture) via
/// [`DesignBuilder`], then shared immutably across analysis workers.
#[derive(Debug)]
pub struct Design<'a> {
    symbols: Box<[Symbol<'a>]>,
    members: Box<[Box<[SymbolId]>]>,
}

impl<'a> Design<'a> {
    pub fn symbol(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id.index()]
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol<'a>)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    pub fn members(&self, scope: SymbolId) -> &[SymbolId] {
        &self.members[scope.index()]
    }

    /// First member of `scope` with the given name.
    pub fn find_member(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        self.members(scope)
            .iter()
            .copied()
            .find(|&id| self.symbol(id).name == name)
    }

    /// Port-facing member of an instance body with the given name.
    pub fn find_port(&self, body: SymbolId, name: &str) -> Option<SymbolId> {
        self.members(body).iter().copied().find(|&id| {
            let sym = self.symbol(id);
            matches!(
                sym.kind(),
                SymbolKind::Port | SymbolKind::MultiPort | SymbolKind::InterfacePort
            ) && sym.name == name
        })
    }

    /// Dotted path from the design root to `id`, for diagnostics.
    pub fn hierarchical_path(&self, id: SymbolId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let sym = self.symbol(cur);
            if !sym.name.is_empty() {
                names.push(sym.name.as_str());
            }
            current = sym.parent;
        }
        names.reverse();
        names.join(".")
    }

    /// The declared type, for symbols that can hold a value.
    pub fn value_ty(&self, id: SymbolId) -> Option<&Ty> {
        match &self.symbol(id).info {
            SymbolInfo::Net { ty, .. }
            | SymbolInfo::Variable { ty, .. }
            | SymbolInfo::Field { ty, .. }
            | SymbolInfo::ClassProperty { ty, .. }
            | SymbolInfo::ModportPort { ty, .. }
            | SymbolInfo::ClockVar { ty, .. }
            | SymbolInfo::LocalAssertionVar { ty } => Some(ty),
            SymbolInfo::Port { ty, .. } => ty.as_ref(),
            _ => None,
        }
    }

    /// Declaration initializer for kinds that count it as a driver.
    pub fn initializer(&self, id: SymbolId) -> Option<&'a Expr<'a>> {
        match &self.symbol(id).info {
            SymbolInfo::Net { initializer, .. }
            | SymbolInfo::Variable { initializer, .. }
            | SymbolInfo::Field { initializer, .. }
            | SymbolInfo::ClassProperty { initializer, .. } => *initializer,
            _ => None,
        }
    }

    /// Lifetime for variable-kind symbols. Fields, class properties,
    /// clock vars, and assertion local variables are always static.
    pub fn variable_lifetime(&self, id: SymbolId) -> Option<Lifetime> {
        match &self.symbol(id).info {
            SymbolInfo::Variable { lifetime, .. } => Some(*lifetime),
            SymbolInfo::Field { .. }
            | SymbolInfo::ClassProperty { .. }
            | SymbolInfo::ClockVar { .. }
            | SymbolInfo::LocalAssertionVar { .. } => Some(Lifetime::Static),
            _ => None,
        }
    }

    pub fn net_type(&self, id: SymbolId) -> Option<&NetType> {
        match &self.symbol(id).info {
            SymbolInfo::Net { net_type, .. } => Some(net_type),
            _ => None,
        }
    }

    /// Whether `id` can contain members reachable by name lookup.
    pub fn is_scope(&self, id: SymbolId) -> bool {
        matches!(
            self.symbol(id).kind(),
            SymbolKind::InstanceBody
                | SymbolKind::Modport
                | SymbolKind::Package
                | SymbolKind::GenerateBlockArray
        )
    }

    pub fn count_kind(&self, kind: SymbolKind) -> usize {
        self.symbols.iter().filter(|s| s.kind() == kind).count()
    }
}

/// Kinds that may be declared directly inside a modport. Name lookups
/// inside a modport fall through to the parent scope only for kinds
/// outside this set.
pub fn allowed_in_modport(kind: SymbolKind) -> bool {
    matches!(
        kind,
        SymbolKind::Net
            | SymbolKind::Variable
            | SymbolKind::Field
            | SymbolKind::ClassProperty
            | SymbolKind::ClockVar
            | SymbolKind::Subroutine
            | SymbolKind::ModportPort
    )
}

/// Builder for accumulating symbols before freezing into a [`Design`].
///
/// Symbols get synthetic, non-overlapping declaration spans in `file`;
/// member lists record insertion order.
pub struct DesignBuilder<'a> {
    file: FileId,
    cursor: u32,
    symbols: Vec<Symbol<'a>>,
    members: Vec<Vec<SymbolId>>,
}

impl<'a> DesignBuilder<'a> {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            cursor: 0,
            symbols: Vec::new(),
            members: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, parent: Option<SymbolId>, info: SymbolInfo<'a>) -> SymbolId {
        let start = self.cursor;
        let end = start + name.len() as u32;
        self.cursor = end + 1;
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: SmolStr::new(name),
            span: Span::new(self.file, start, end),
            parent,
            info,
        });
        self.members.push(Vec::new());
        if let Some(p) = parent {
            self.members[p.index()].push(id);
        }
        id
    }

    pub fn package(&mut self, name: &str) -> SymbolId {
        self.push(name, None, SymbolInfo::Package)
    }

    pub fn instance_body(
        &mut self,
        parent: Option<SymbolId>,
        name: &str,
        definition_kind: DefinitionKind,
    ) -> SymbolId {
        self.push(name, parent, SymbolInfo::InstanceBody { definition_kind })
    }

    pub fn instance(
        &mut self,
        parent: SymbolId,
        name: &str,
        body: SymbolId,
        canonical_body: Option<SymbolId>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::Instance {
                body,
                canonical_body,
            },
        )
    }

    pub fn instance_array(
        &mut self,
        parent: SymbolId,
        name: &str,
        elements: &[SymbolId],
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::InstanceArray {
                elements: elements.into(),
            },
        )
    }

    pub fn generate_block_array(
        &mut self,
        parent: SymbolId,
        name: &str,
        entries: &[SymbolId],
        valid: bool,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::GenerateBlockArray {
                entries: entries.into(),
                valid,
            },
        )
    }

    pub fn net(
        &mut self,
        parent: SymbolId,
        name: &str,
        ty: Ty,
        net_type: NetType,
        initializer: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::Net {
                ty,
                net_type,
                initializer,
            },
        )
    }

    pub fn variable(
        &mut self,
        parent: SymbolId,
        name: &str,
        ty: Ty,
        lifetime: Lifetime,
        initializer: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::Variable {
                ty,
                lifetime,
                initializer,
            },
        )
    }

    pub fn field(&mut self, parent: SymbolId, name: &str, ty: Ty, offset: u64) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::Field {
                ty,
                offset,
                initializer: None,
            },
        )
    }

    pub fn class_property(
        &mut self,
        parent: SymbolId,
        name: &str,
        ty: Ty,
        initializer: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::ClassProperty { ty, initializer })
    }

    pub fn port(
        &mut self,
        parent: SymbolId,
        name: &str,
        direction: ArgumentDirection,
        ty: Option<Ty>,
        internal_symbol: Option<SymbolId>,
        internal_expr: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::Port {
                ty,
                direction,
                internal_symbol,
                internal_expr,
            },
        )
    }

    pub fn multi_port(
        &mut self,
        parent: SymbolId,
        name: &str,
        direction: ArgumentDirection,
    ) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::MultiPort { direction })
    }

    pub fn interface_port(
        &mut self,
        parent: SymbolId,
        name: &str,
        connection: Option<(SymbolId, Option<SymbolId>)>,
        connection_expr: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::InterfacePort {
                connection,
                connection_expr,
            },
        )
    }

    pub fn modport(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::Modport)
    }

    pub fn modport_port(
        &mut self,
        parent: SymbolId,
        name: &str,
        ty: Ty,
        connection_expr: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::ModportPort {
                ty,
                connection_expr,
            },
        )
    }

    pub fn clock_var(
        &mut self,
        parent: SymbolId,
        name: &str,
        ty: Ty,
        direction: ArgumentDirection,
        initializer: Option<&'a Expr<'a>>,
    ) -> SymbolId {
        self.push(
            name,
            Some(parent),
            SymbolInfo::ClockVar {
                ty,
                direction,
                initializer,
            },
        )
    }

    pub fn local_assertion_var(&mut self, parent: SymbolId, name: &str, ty: Ty) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::LocalAssertionVar { ty })
    }

    pub fn procedural_block(
        &mut self,
        parent: SymbolId,
        name: &str,
        kind: ProceduralBlockKind,
    ) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::ProceduralBlock { kind })
    }

    pub fn subroutine(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        self.push(name, Some(parent), SymbolInfo::Subroutine)
    }

    /// Late-bind an interface port's connection, for designs where the
    /// connected instance is created after the port.
    pub fn connect_interface_port(
        &mut self,
        port: SymbolId,
        connection: (SymbolId, Option<SymbolId>),
        connection_expr: Option<&'a Expr<'a>>,
    ) {
        match &mut self.symbols[port.index()].info {
            SymbolInfo::InterfacePort {
                connection: conn,
                connection_expr: expr,
            } => {
                *conn = Some(connection);
                *expr = connection_expr;
            }
            _ => panic!("connect_interface_port on a non-interface-port symbol"),
        }
    }

    /// Late-bind a modport port's connection expression.
    pub fn set_modport_connection(&mut self, port: SymbolId, expr: &'a Expr<'a>) {
        match &mut self.symbols[port.index()].info {
            SymbolInfo::ModportPort {
                connection_expr, ..
            } => *connection_expr = Some(expr),
            _ => panic!("set_modport_connection on a non-modport-port symbol"),
        }
    }

    /// Late-bind a declaration initializer.
    pub fn set_initializer(&mut self, id: SymbolId, init: &'a Expr<'a>) {
        match &mut self.symbols[id.index()].info {
            SymbolInfo::Net { initializer, .. }
            | SymbolInfo::Variable { initializer, .. }
            | SymbolInfo::Field { initializer, .. }
            | SymbolInfo::ClassProperty { initializer, .. }
            | SymbolInfo::ClockVar { initializer, .. } => *initializer = Some(init),
            _ => panic!("set_initializer on a symbol without an initializer slot"),
        }
    }

    pub fn finish(self) -> Design<'a> {
        Design {
            symbols: self.symbols.into_boxed_slice(),
            members: self
                .members
                .into_iter()
                .map(Vec::into_boxed_slice)
                .collect(),
        }
    }
}
