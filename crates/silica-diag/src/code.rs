use core::fmt;

/// Identity code for a diagnostic, composed of a namespace and a number.
///
/// Namespace strings use dotted hierarchy (e.g. `"silica.drivers"`).
/// Numbers are unique within a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    pub namespace: &'static str,
    pub number: u32,
}

impl DiagnosticCode {
    pub const INPUT_PORT_ASSIGN: Self = Self {
        namespace: "silica.drivers",
        number: 1,
    };
    pub const INPUT_PORT_COERCION: Self = Self {
        namespace: "silica.drivers",
        number: 2,
    };
    pub const OUTPUT_PORT_COERCION: Self = Self {
        namespace: "silica.drivers",
        number: 3,
    };
    pub const CLOCK_VAR_TARGET_ASSIGN: Self = Self {
        namespace: "silica.drivers",
        number: 4,
    };
    pub const MULTIPLE_ALWAYS_ASSIGNS: Self = Self {
        namespace: "silica.drivers",
        number: 5,
    };
    pub const MULTIPLE_UWIRE_DRIVERS: Self = Self {
        namespace: "silica.drivers",
        number: 6,
    };
    pub const MULTIPLE_UDNT_DRIVERS: Self = Self {
        namespace: "silica.drivers",
        number: 7,
    };
    pub const MULTIPLE_CONT_ASSIGNS: Self = Self {
        namespace: "silica.drivers",
        number: 8,
    };
    pub const MIXED_VAR_ASSIGNS: Self = Self {
        namespace: "silica.drivers",
        number: 9,
    };
    pub const MODPORT_PROPAGATION_LIMIT: Self = Self {
        namespace: "silica.internal",
        number: 1,
    };

    /// Format as `"namespace[number]"`, e.g. `"silica.drivers[6]"`.
    pub fn as_str(&self) -> String {
        format!("{}[{}]", self.namespace, self.number)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.namespace, self.number)
    }
}
