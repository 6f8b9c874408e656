use smol_str::SmolStr;

/// Identifies the template for a diagnostic message.
///
/// Each variant corresponds to a fixed message template. Arguments
/// (in `Message::args`) fill placeholders at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    // Driver legality messages
    InputPortAssign,
    InputPortCoercion,
    OutputPortCoercion,
    ClockVarTargetAssign,
    MultipleAlwaysAssigns,
    MultipleUWireDrivers,
    MultipleUdntDrivers,
    MultipleContAssigns,
    MixedVarAssigns,
    ModportPropagationLimit,
    // Label and note messages
    NoteDeclarationHere,
    NoteDrivenHere,
    NoteAssignedHere,
    NoteReferencedHere,
    NoteFromHere2,
    NoteOriginalAssign,
}

/// A typed argument that fills a placeholder in a message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Name(SmolStr),
}

impl Arg {
    pub fn name(s: impl Into<SmolStr>) -> Self {
        Arg::Name(s.into())
    }

    /// Extract the inner `&str` if this is a `Name` variant.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Arg::Name(s) => Some(s.as_str()),
        }
    }
}

/// A structured message: template id plus arguments.
///
/// No pre-rendered text -- call `render_message()` at the presentation
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub args: Box<[Arg]>,
}

impl Message {
    pub fn new(id: MessageId, args: impl Into<Box<[Arg]>>) -> Self {
        Self {
            id,
            args: args.into(),
        }
    }

    /// Convenience for messages with no arguments.
    pub fn simple(id: MessageId) -> Self {
        Self {
            id,
            args: Box::new([]),
        }
    }
}

/// Render a `Message` to a human-readable string.
pub fn render_message(msg: &Message) -> String {
    let name = || msg.args.first().and_then(Arg::as_name).unwrap_or("?");
    let second = || msg.args.get(1).and_then(Arg::as_name).unwrap_or("?");
    match msg.id {
        MessageId::InputPortAssign => {
            format!("cannot assign to input port `{}`", name())
        }
        MessageId::InputPortCoercion => {
            format!("input net port `{}` coerced to inout", name())
        }
        MessageId::OutputPortCoercion => {
            format!("output net port `{}` coerced to inout", name())
        }
        MessageId::ClockVarTargetAssign => {
            format!(
                "clocking block signal `{}` cannot be a continuous assignment target",
                name()
            )
        }
        MessageId::MultipleAlwaysAssigns => {
            format!(
                "`{}` is driven by an {} procedure and cannot be driven by any other process",
                name(),
                second()
            )
        }
        MessageId::MultipleUWireDrivers => {
            format!("uwire net `{}` has multiple drivers", name())
        }
        MessageId::MultipleUdntDrivers => {
            format!(
                "net `{}` of user-defined net type `{}` has multiple drivers",
                name(),
                second()
            )
        }
        MessageId::MultipleContAssigns => {
            format!("`{}` has multiple continuous assignments", name())
        }
        MessageId::MixedVarAssigns => {
            format!(
                "`{}` is driven by both continuous and procedural assignments",
                name()
            )
        }
        MessageId::ModportPropagationLimit => {
            format!(
                "modport driver propagation did not converge for `{}`",
                name()
            )
        }
        MessageId::NoteDeclarationHere => "declared here".into(),
        MessageId::NoteDrivenHere => "driven here".into(),
        MessageId::NoteAssignedHere => "also assigned here".into(),
        MessageId::NoteReferencedHere => "referenced here".into(),
        MessageId::NoteFromHere2 => {
            format!("driven from `{}` and from `{}`", name(), second())
        }
        MessageId::NoteOriginalAssign => "original assignment here".into(),
    }
}
