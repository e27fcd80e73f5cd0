//! Conversions between [`Value`] and native Rust types.
//!
//! [`FromValue`] is implemented by every type a registered function may take
//! as a bindable parameter. It reports the parameter's [`Shape`] once, at
//! registration, and converts through the coercion rules at call time.
//! [`IntoValue`] goes the other way for results.

use crate::cache::Caches;
use crate::coercion;
use crate::error::{BindError, BindResult};
use crate::shape::Shape;
use crate::value::{Mapping, Value, ValueKind};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A native type that can be bound from a [`Value`].
pub trait FromValue: Sized {
    /// The shape this type requires from its input.
    fn shape() -> Shape;

    /// Convert, coercing where the rules allow it.
    fn from_value(value: Value, caches: &Caches) -> BindResult<Self>;
}

/// A native type that can be returned as a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn from_value(value: Value, _caches: &Caches) -> BindResult<Self> {
        Ok(value)
    }
}

impl FromValue for serde_json::Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn from_value(value: Value, _caches: &Caches) -> BindResult<Self> {
        Ok(value.to_json())
    }
}

impl FromValue for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_text(value, caches)
    }
}

impl FromValue for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_bool(value, caches)
    }
}

impl FromValue for i64 {
    fn shape() -> Shape {
        Shape::Int
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_int(value, caches)
    }
}

fn narrow_int<T: TryFrom<i64>>(wide: i64, name: &str) -> BindResult<T> {
    T::try_from(wide).map_err(|_| BindError::OutOfRange {
        source_kind: ValueKind::Int,
        value: format!("{wide} ({name})"),
        target: Shape::Int,
    })
}

macro_rules! narrow_int_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
                    narrow_int(coercion::to_int(value, caches)?, stringify!($t))
                }
            }
        )*
    };
}

narrow_int_from_value!(i8, i16, i32, isize, u8, u16, u32);

// Unsigned types wider than i64 parse text themselves, so values above
// i64::MAX (which IntoValue renders as text) bind back.
macro_rules! wide_unsigned_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
                    if let Value::Text(text) = &value {
                        if let Ok(n) = text.parse::<$t>() {
                            return Ok(n);
                        }
                    }
                    narrow_int(coercion::to_int(value, caches)?, stringify!($t))
                }
            }
        )*
    };
}

wide_unsigned_from_value!(u64, usize);

impl FromValue for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_float(value, caches)
    }
}

impl FromValue for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        let source_kind = value.kind();
        let wide = coercion::to_float(value, caches)?;
        let narrow = wide as f32;
        // NaN and infinities pass through; finite values must fit.
        if wide.is_finite() && narrow.is_infinite() {
            return Err(BindError::OutOfRange {
                source_kind,
                value: format!("{wide:e} (f32)"),
                target: Shape::Float,
            });
        }
        Ok(narrow)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, caches).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_sequence(value, caches)
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn shape() -> Shape {
        Shape::mapping(K::shape(), V::shape())
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_mapping(value, caches)
    }
}

impl<K, V> FromValue for BTreeMap<K, V>
where
    K: FromValue + Ord,
    V: FromValue,
{
    fn shape() -> Shape {
        Shape::mapping(K::shape(), V::shape())
    }

    fn from_value(value: Value, caches: &Caches) -> BindResult<Self> {
        coercion::to_mapping(value, caches)
    }
}

// ── IntoValue ──────────────────────────────────────────────────────

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

macro_rules! lossless_int_into_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

lossless_int_into_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_into_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    match i64::try_from(self) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Text(self.to_string()),
                    }
                }
            }
        )*
    };
}

wide_int_into_value!(isize, u64, usize);

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Sequence(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<V: IntoValue, S> IntoValue for HashMap<String, V, S> {
    fn into_value(self) -> Value {
        Value::Mapping(
            self.into_iter()
                .map(|(k, v)| (k, v.into_value()))
                .collect::<Mapping>(),
        )
    }
}

impl<V: IntoValue> IntoValue for BTreeMap<String, V> {
    fn into_value(self) -> Value {
        Value::Mapping(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}
