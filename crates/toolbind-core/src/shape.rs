//! Target shapes.
//!
//! A [`Shape`] describes what a parameter (or a record field) requires from
//! its input. Shapes are computed once per registered function and once per
//! record type, then shared. Nested shapes sit behind `Arc` so cloning a
//! shape for a cache key never allocates.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a fixed-shape record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordShape {
    type_id: TypeId,
    name: &'static str,
}

impl RecordShape {
    pub fn of<R: 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for RecordShape {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RecordShape {}

impl Hash for RecordShape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// What a parameter or field requires from its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Leading cancellation-context slot. Never bound from input.
    Context,
    /// Accepts any value unchanged.
    Any,
    Bool,
    Int,
    Float,
    Text,
    /// `Null` or the inner shape.
    Optional(Arc<Shape>),
    /// Sequence whose elements each coerce to the inner shape.
    Sequence(Arc<Shape>),
    /// Mapping with keys coerced to the first shape and values to the second.
    Mapping(Arc<Shape>, Arc<Shape>),
    /// Fixed-shape record bound by field name.
    Record(RecordShape),
}

impl Shape {
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Arc::new(inner))
    }

    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Arc::new(element))
    }

    pub fn mapping(key: Shape, value: Shape) -> Self {
        Shape::Mapping(Arc::new(key), Arc::new(value))
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Shape::Context)
    }

    /// Whether a whole sequence input can be handed to this shape as-is.
    pub fn accepts_sequence(&self) -> bool {
        match self {
            Shape::Any | Shape::Sequence(_) => true,
            Shape::Optional(inner) => inner.accepts_sequence(),
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Context => f.write_str("context"),
            Shape::Any => f.write_str("any"),
            Shape::Bool => f.write_str("bool"),
            Shape::Int => f.write_str("int"),
            Shape::Float => f.write_str("float"),
            Shape::Text => f.write_str("text"),
            Shape::Optional(inner) => write!(f, "optional<{inner}>"),
            Shape::Sequence(element) => write!(f, "sequence<{element}>"),
            Shape::Mapping(key, value) => write!(f, "mapping<{key}, {value}>"),
            Shape::Record(record) => write!(f, "record {}", record.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    struct Other;

    #[test]
    fn test_display_nests() {
        let shape = Shape::mapping(Shape::Text, Shape::sequence(Shape::optional(Shape::Int)));
        assert_eq!(shape.to_string(), "mapping<text, sequence<optional<int>>>");
    }

    #[test]
    fn test_record_identity_is_type_identity() {
        let a = Shape::Record(RecordShape::of::<Marker>("Same"));
        let b = Shape::Record(RecordShape::of::<Other>("Same"));
        assert_ne!(a, b);
        assert_eq!(a, Shape::Record(RecordShape::of::<Marker>("Renamed")));
    }

    #[test]
    fn test_accepts_sequence() {
        assert!(Shape::Any.accepts_sequence());
        assert!(Shape::sequence(Shape::Int).accepts_sequence());
        assert!(Shape::optional(Shape::sequence(Shape::Int)).accepts_sequence());
        assert!(!Shape::Int.accepts_sequence());
        assert!(!Shape::mapping(Shape::Text, Shape::Int).accepts_sequence());
    }
}
