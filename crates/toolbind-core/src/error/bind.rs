//! Coercion and binding errors.

use crate::shape::Shape;
use crate::value::ValueKind;
use thiserror::Error;

/// A value could not be converted to the shape a parameter or field requires.
///
/// Leaf variants carry the attempted source kind and target shape; the
/// nesting variants say where inside a composite value the leaf failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The kind pair is not covered by the coercion rules at all.
    #[error("cannot convert {source_kind} to {target}")]
    Unsupported { source_kind: ValueKind, target: Shape },

    /// Text that does not parse as the target scalar.
    #[error("cannot parse text {text:?} as {target}")]
    Parse { text: String, target: Shape },

    /// A numeric value that does not fit the target width.
    #[error("{source_kind} value {value} is out of range for {target}")]
    OutOfRange {
        source_kind: ValueKind,
        value: String,
        target: Shape,
    },

    /// Positional binding got the wrong number of elements.
    #[error("expected a sequence of {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two mapping keys became the same key once converted.
    #[error("key collides with an earlier entry once converted to {target}")]
    DuplicateKey { target: Shape },

    /// A record field failed to bind.
    #[error("field '{field}' of record {record}: {source}")]
    Field {
        record: &'static str,
        field: &'static str,
        source: Box<BindError>,
    },

    /// A sequence element failed to bind.
    #[error("element {index}: {source}")]
    Element { index: usize, source: Box<BindError> },

    /// A mapping entry failed to bind.
    #[error("entry {key:?}: {source}")]
    Entry { key: String, source: Box<BindError> },
}

impl BindError {
    pub fn unsupported(source_kind: ValueKind, target: Shape) -> Self {
        BindError::Unsupported {
            source_kind,
            target,
        }
    }

    /// Source kind of the innermost failure.
    pub fn source_kind(&self) -> Option<ValueKind> {
        match self {
            BindError::Unsupported { source_kind, .. }
            | BindError::OutOfRange { source_kind, .. } => Some(*source_kind),
            BindError::Parse { .. } | BindError::DuplicateKey { .. } => Some(ValueKind::Text),
            BindError::LengthMismatch { .. } => Some(ValueKind::Sequence),
            BindError::Field { source, .. }
            | BindError::Element { source, .. }
            | BindError::Entry { source, .. } => source.source_kind(),
        }
    }

    /// Target shape of the innermost failure.
    pub fn target(&self) -> Option<&Shape> {
        match self {
            BindError::Unsupported { target, .. }
            | BindError::Parse { target, .. }
            | BindError::OutOfRange { target, .. }
            | BindError::DuplicateKey { target } => Some(target),
            BindError::LengthMismatch { .. } => None,
            BindError::Field { source, .. }
            | BindError::Element { source, .. }
            | BindError::Entry { source, .. } => source.target(),
        }
    }
}

/// Result type alias for coercion.
pub type BindResult<T> = Result<T, BindError>;
