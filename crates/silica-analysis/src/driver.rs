use bitflags::bitflags;
use silica_hir::{Design, Expr, ProceduralBlockKind, SymbolId, SymbolInfo};
use silica_source::Span;
use smallvec::SmallVec;

/// Closed bit interval `[lo, hi]` over a symbol's selectable width.
pub type DriverBitRange = (u64, u64);

/// Drivers and their bit intervals, in storage order.
pub type DriverList<'a> = SmallVec<[(&'a ValueDriver<'a>, DriverBitRange); 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Continuous,
    Procedural,
}

bitflags! {
    /// Properties of an assignment site beyond its kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DriverFlags: u8 {
        /// The driver is an input port flowing into its internal symbol.
        const INPUT_PORT = 1 << 0;
        /// The driver is an output port connection.
        const OUTPUT_PORT = 1 << 1;
        /// The driver is a clocking block signal.
        const CLOCK_VAR = 1 << 2;
        /// The driver was synthesized from a declaration initializer.
        const INITIALIZER = 1 << 3;
    }
}

/// Syntactic origin of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSource {
    Continuous,
    AlwaysComb,
    AlwaysFF,
    AlwaysLatch,
    Always,
    Initial,
    Final,
    Subroutine,
    Other,
}

impl DriverSource {
    pub fn from_block_kind(kind: ProceduralBlockKind) -> Self {
        match kind {
            ProceduralBlockKind::Initial => DriverSource::Initial,
            ProceduralBlockKind::Final => DriverSource::Final,
            ProceduralBlockKind::Always => DriverSource::Always,
            ProceduralBlockKind::AlwaysComb => DriverSource::AlwaysComb,
            ProceduralBlockKind::AlwaysLatch => DriverSource::AlwaysLatch,
            ProceduralBlockKind::AlwaysFF => DriverSource::AlwaysFF,
        }
    }

    /// Source keyword for diagnostics.
    pub fn keyword(self) -> &'static str {
        match self {
            DriverSource::Continuous => "assign",
            DriverSource::AlwaysComb => "always_comb",
            DriverSource::AlwaysFF => "always_ff",
            DriverSource::AlwaysLatch => "always_latch",
            DriverSource::Always => "always",
            DriverSource::Initial => "initial",
            DriverSource::Final => "final",
            DriverSource::Subroutine => "subroutine",
            DriverSource::Other => "other",
        }
    }
}

/// One assignment site that can write a symbol's bits.
///
/// Arena-allocated and immutable once inserted; the tracker holds
/// shared references only.
#[derive(Debug, Clone)]
pub struct ValueDriver<'a> {
    pub kind: DriverKind,
    /// Left-hand-side expression rooted at the driven symbol.
    pub prefix_expression: &'a Expr<'a>,
    /// Hierarchical context the driver occurs in: an instance body, a
    /// procedural block, or a subroutine.
    pub containing_symbol: SymbolId,
    pub flags: DriverFlags,
    pub source: DriverSource,
    /// Set when this driver was synthesized by applying an interface
    /// port side effect to a non-canonical instance. Such drivers never
    /// re-trigger interface port recording.
    pub from_side_effect: bool,
    /// Source range of the enclosing procedural call, if the assignment
    /// was reached through one.
    pub proc_call_expression: Option<Span>,
}

impl<'a> ValueDriver<'a> {
    /// Build a driver, deriving `source` from the containing symbol.
    pub fn new(
        design: &Design<'a>,
        kind: DriverKind,
        prefix_expression: &'a Expr<'a>,
        containing_symbol: SymbolId,
        flags: DriverFlags,
    ) -> Self {
        let source = match &design.symbol(containing_symbol).info {
            SymbolInfo::ProceduralBlock { kind } => DriverSource::from_block_kind(*kind),
            SymbolInfo::Subroutine => DriverSource::Subroutine,
            _ if kind == DriverKind::Continuous => DriverSource::Continuous,
            _ => DriverSource::Other,
        };
        Self {
            kind,
            prefix_expression,
            containing_symbol,
            flags,
            source,
            from_side_effect: false,
            proc_call_expression: None,
        }
    }

    pub fn is_input_port(&self) -> bool {
        self.flags.contains(DriverFlags::INPUT_PORT)
    }

    pub fn is_output_port(&self) -> bool {
        self.flags.contains(DriverFlags::OUTPUT_PORT)
    }

    pub fn is_unidirectional_port(&self) -> bool {
        self.flags
            .intersects(DriverFlags::INPUT_PORT | DriverFlags::OUTPUT_PORT)
    }

    pub fn is_clock_var(&self) -> bool {
        self.flags.contains(DriverFlags::CLOCK_VAR)
    }

    /// Whether the driver lives in a procedure the language allows only
    /// one of per driven bit.
    pub fn is_in_single_driver_procedure(&self) -> bool {
        matches!(
            self.source,
            DriverSource::AlwaysComb | DriverSource::AlwaysFF | DriverSource::AlwaysLatch
        )
    }

    pub fn source_range(&self) -> Span {
        self.prefix_expression.span
    }
}
