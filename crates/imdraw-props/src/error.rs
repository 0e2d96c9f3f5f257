use crate::controls::ControlTag;
use crate::value::ValueKind;

/// Errors raised while building or drawing property controls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// A source was handed a value of the wrong kind.
    #[error("property '{property}' is {expected:?}, got a {actual:?} value")]
    KindMismatch {
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// A control was bound to a property whose kind it cannot edit.
    #[error("{control} control cannot edit '{property}' of kind {kind:?}")]
    UnsupportedKind {
        control: &'static str,
        property: String,
        kind: ValueKind,
    },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("slider for '{property}' needs min < max, got {min}..{max}")]
    InvalidRange { property: String, min: f32, max: f32 },

    #[error("panel was built over {expected} sources, drawn with {actual}")]
    SourceCountMismatch { expected: usize, actual: usize },

    #[error("no control registered for {0:?}")]
    Unregistered(ControlTag),
}
