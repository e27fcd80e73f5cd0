//! Coercion Matrix
//!
//! Rules converting a [`Value`] into the scalar or container a parameter
//! requires. Each rule first tries the identity case (the value already has
//! the target kind), then consults the Conversion Cache to fast-reject
//! kind pairs the rules never cover, and only then converts.
//!
//! | target | accepted sources |
//! |--------|------------------|
//! | text   | everything (canonical formatting, JSON for composites) |
//! | int    | int, float (truncated toward zero), text (base 10), bool |
//! | float  | float, int, text, bool |
//! | bool   | bool, text (`true`/`false`, any ASCII case), int, float (zero is false) |
//! | sequence&lt;T&gt; | sequence, element-wise |
//! | mapping&lt;K, V&gt; | mapping, key- and value-wise |
//! | record | mapping, field-wise (see [`record`](crate::record)) |
//!
//! Optional shapes accept `Null`; `Any` accepts everything unchanged.

use crate::cache::Caches;
use crate::convert::FromValue;
use crate::error::{BindError, BindResult};
use crate::shape::Shape;
use crate::value::{Value, ValueKind};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Whether the rules cover converting `kind` into `target` at all.
pub fn feasible(kind: ValueKind, target: &Shape) -> bool {
    use ValueKind as K;
    match target {
        Shape::Context => false,
        Shape::Any | Shape::Text => true,
        Shape::Optional(inner) => kind == K::Null || feasible(kind, inner),
        Shape::Bool | Shape::Int | Shape::Float => {
            matches!(kind, K::Bool | K::Int | K::Float | K::Text)
        }
        Shape::Sequence(_) => kind == K::Sequence,
        Shape::Mapping(..) | Shape::Record(_) => kind == K::Mapping,
    }
}

pub fn to_text(value: Value, caches: &Caches) -> BindResult<String> {
    match value {
        Value::Text(text) => Ok(text),
        other => {
            caches.conversions().check(other.kind(), &Shape::Text)?;
            Ok(format_text(&other))
        }
    }
}

fn format_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Text(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Shortest text that parses back to exactly `f`.
///
/// `Display` and `{:e}` both print the fewest digits that round-trip, but
/// `Display` never uses an exponent, so `1e300` would be 301 characters.
fn format_float(f: f64) -> String {
    let plain = f.to_string();
    let scientific = format!("{f:e}");
    if scientific.len() < plain.len() {
        scientific
    } else {
        plain
    }
}

pub fn to_int(value: Value, caches: &Caches) -> BindResult<i64> {
    match value {
        Value::Int(i) => Ok(i),
        other => {
            caches.conversions().check(other.kind(), &Shape::Int)?;
            match other {
                Value::Float(f) => float_to_int(f),
                Value::Text(text) => text.parse::<i64>().map_err(|_| BindError::Parse {
                    text,
                    target: Shape::Int,
                }),
                Value::Bool(b) => Ok(i64::from(b)),
                other => Err(BindError::unsupported(other.kind(), Shape::Int)),
            }
        }
    }
}

fn float_to_int(f: f64) -> BindResult<i64> {
    let truncated = f.trunc();
    // i64::MAX is not representable; 2^63 is the first float past the range.
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < 9.223_372_036_854_775_808e18
    {
        Ok(truncated as i64)
    } else {
        Err(BindError::OutOfRange {
            source_kind: ValueKind::Float,
            value: f.to_string(),
            target: Shape::Int,
        })
    }
}

pub fn to_float(value: Value, caches: &Caches) -> BindResult<f64> {
    match value {
        Value::Float(f) => Ok(f),
        other => {
            caches.conversions().check(other.kind(), &Shape::Float)?;
            match other {
                Value::Int(i) => Ok(i as f64),
                Value::Text(text) => text.parse::<f64>().map_err(|_| BindError::Parse {
                    text,
                    target: Shape::Float,
                }),
                Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
                other => Err(BindError::unsupported(other.kind(), Shape::Float)),
            }
        }
    }
}

pub fn to_bool(value: Value, caches: &Caches) -> BindResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => {
            caches.conversions().check(other.kind(), &Shape::Bool)?;
            match other {
                Value::Text(text) => {
                    if text.eq_ignore_ascii_case("true") {
                        Ok(true)
                    } else if text.eq_ignore_ascii_case("false") {
                        Ok(false)
                    } else {
                        Err(BindError::Parse {
                            text,
                            target: Shape::Bool,
                        })
                    }
                }
                Value::Int(i) => Ok(i != 0),
                Value::Float(f) => Ok(f != 0.0),
                other => Err(BindError::unsupported(other.kind(), Shape::Bool)),
            }
        }
    }
}

/// Coerce every element of a sequence; the first failure fails the whole.
pub fn to_sequence<T: FromValue>(value: Value, caches: &Caches) -> BindResult<Vec<T>> {
    match value {
        Value::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item, caches).map_err(|source| BindError::Element {
                    index,
                    source: Box::new(source),
                })
            })
            .collect(),
        other => Err(BindError::unsupported(
            other.kind(),
            Shape::sequence(T::shape()),
        )),
    }
}

/// Map types a mapping value binds into.
pub trait MapSink<K, V>: Default {
    /// Insert, returning `false` if the key was already present.
    fn insert_new(&mut self, key: K, value: V) -> bool;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> MapSink<K, V> for HashMap<K, V, S> {
    fn insert_new(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_none()
    }
}

impl<K: Ord, V> MapSink<K, V> for BTreeMap<K, V> {
    fn insert_new(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_none()
    }
}

/// Coerce every key (as text) and value of a mapping.
///
/// Distinct input keys that convert to the same key (`"1"` and `"01"` as
/// integers) fail the whole mapping instead of overwriting each other.
pub fn to_mapping<K, V, M>(value: Value, caches: &Caches) -> BindResult<M>
where
    K: FromValue,
    V: FromValue,
    M: MapSink<K, V>,
{
    let map = match value {
        Value::Mapping(map) => map,
        other => {
            return Err(BindError::unsupported(
                other.kind(),
                Shape::mapping(K::shape(), V::shape()),
            ));
        }
    };

    let mut out = M::default();
    for (key, item) in map {
        let wrap = |source: BindError| BindError::Entry {
            key: key.clone(),
            source: Box::new(source),
        };
        let k = K::from_value(Value::Text(key.clone()), caches).map_err(wrap)?;
        let v = V::from_value(item, caches).map_err(wrap)?;
        if !out.insert_new(k, v) {
            return Err(wrap(BindError::DuplicateKey { target: K::shape() }));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn caches() -> Caches {
        Caches::new()
    }

    #[test]
    fn test_text_from_scalars() {
        let c = caches();
        assert_eq!(to_text(Value::Int(-42), &c).unwrap(), "-42");
        assert_eq!(to_text(Value::Float(0.1), &c).unwrap(), "0.1");
        assert_eq!(to_text(Value::Float(3.0), &c).unwrap(), "3");
        assert_eq!(to_text(Value::Bool(true), &c).unwrap(), "true");
        assert_eq!(to_text(Value::Null, &c).unwrap(), "null");
        assert_eq!(to_text(Value::sequence([1, 2]), &c).unwrap(), "[1,2]");
    }

    #[rstest]
    #[case::huge(1e300, "1e300")]
    #[case::tiny(1e-7, "1e-7")]
    #[case::negative_exponent(-2.5e-12, "-2.5e-12")]
    #[case::plain_wins(1234.5, "1234.5")]
    #[case::short_fraction(0.1, "0.1")]
    #[case::past_u64(1e21, "1e21")]
    fn test_float_text_is_shortest(#[case] input: f64, #[case] expected: &str) {
        let text = to_text(Value::Float(input), &caches()).unwrap();
        assert_eq!(text, expected);
        assert_eq!(text.parse::<f64>().unwrap().to_bits(), input.to_bits());
    }

    #[test]
    fn test_int_rules() {
        let c = caches();
        assert_eq!(to_int(Value::from("42"), &c).unwrap(), 42);
        assert_eq!(to_int(Value::Float(3.9), &c).unwrap(), 3);
        assert_eq!(to_int(Value::Float(-3.9), &c).unwrap(), -3);
        assert_eq!(to_int(Value::Bool(true), &c).unwrap(), 1);
        assert_eq!(to_int(Value::Bool(false), &c).unwrap(), 0);
    }

    #[test]
    fn test_int_failures() {
        let c = caches();
        assert!(matches!(
            to_int(Value::from("4x"), &c),
            Err(BindError::Parse { .. })
        ));
        assert!(matches!(
            to_int(Value::Float(f64::NAN), &c),
            Err(BindError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_int(Value::Float(1e19), &c),
            Err(BindError::OutOfRange { .. })
        ));
        assert!(matches!(
            to_int(Value::Null, &c),
            Err(BindError::Unsupported {
                source_kind: ValueKind::Null,
                ..
            })
        ));
    }

    #[test]
    fn test_float_rules() {
        let c = caches();
        assert_eq!(to_float(Value::Int(2), &c).unwrap(), 2.0);
        assert_eq!(to_float(Value::from("2.5"), &c).unwrap(), 2.5);
        assert_eq!(to_float(Value::Bool(true), &c).unwrap(), 1.0);
        assert!(to_float(Value::from("two"), &c).is_err());
    }

    #[rstest]
    #[case::upper_text(Value::from("TRUE"), true)]
    #[case::lower_text(Value::from("false"), false)]
    #[case::mixed_text(Value::from("fAlSe"), false)]
    #[case::one(Value::Int(1), true)]
    #[case::zero(Value::Int(0), false)]
    #[case::negative_float(Value::Float(-0.5), true)]
    #[case::zero_float(Value::Float(0.0), false)]
    fn test_bool_rules(#[case] input: Value, #[case] expected: bool) {
        assert_eq!(to_bool(input, &caches()).unwrap(), expected);
    }

    #[test]
    fn test_bool_rejects_other_words() {
        assert!(matches!(
            to_bool(Value::from("yes"), &caches()),
            Err(BindError::Parse { .. })
        ));
    }

    #[test]
    fn test_sequence_element_failure_fails_whole() {
        let c = caches();
        let err = to_sequence::<i64>(Value::sequence(["1", "x", "3"]), &c).unwrap_err();
        assert!(matches!(err, BindError::Element { index: 1, .. }));
        assert_eq!(
            to_sequence::<i64>(Value::sequence(["1", "2"]), &c).unwrap(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_mapping_coerces_keys_and_values() {
        let c = caches();
        let input = Value::mapping([("1", Value::from("10")), ("2", Value::Int(20))]);
        let map: BTreeMap<i64, i64> = to_mapping(input, &c).unwrap();
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&2), Some(&20));
    }

    #[test]
    fn test_mapping_keys_colliding_after_conversion_fail() {
        let c = caches();
        let input = Value::mapping([
            ("1", Value::Int(10)),
            ("01", Value::Int(20)),
            ("+1", Value::Int(30)),
        ]);
        // Entries are visited in key order: "+1" binds first, "01" collides.
        let err = to_mapping::<i64, i64, HashMap<i64, i64>>(input, &c).unwrap_err();
        assert_eq!(
            err,
            BindError::Entry {
                key: "01".to_string(),
                source: Box::new(BindError::DuplicateKey { target: Shape::Int }),
            }
        );
        assert_eq!(err.target(), Some(&Shape::Int));
    }

    #[test]
    fn test_distinct_text_keys_never_collide() {
        let c = caches();
        let input = Value::mapping([("01", Value::Int(1)), ("1", Value::Int(2))]);
        let map: BTreeMap<String, i64> = to_mapping(input, &c).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_feasibility_table() {
        assert!(feasible(ValueKind::Null, &Shape::Text));
        assert!(feasible(ValueKind::Null, &Shape::optional(Shape::Int)));
        assert!(!feasible(ValueKind::Null, &Shape::Int));
        assert!(!feasible(ValueKind::Mapping, &Shape::sequence(Shape::Any)));
        assert!(feasible(ValueKind::Mapping, &Shape::mapping(Shape::Text, Shape::Any)));
        assert!(!feasible(ValueKind::Int, &Shape::Context));
    }

    #[test]
    fn test_infeasible_pair_is_memoized() {
        let c = caches();
        assert!(to_bool(Value::sequence([1]), &c).is_err());
        assert!(to_bool(Value::sequence([2]), &c).is_err());
        let stats = c.conversions().counters().snapshot();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }
}
