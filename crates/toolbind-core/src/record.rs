//! Fixed-shape records.
//!
//! A record is a struct bound from a mapping by field name. Declare one
//! with [`record!`](crate::record!):
//!
//! ```rust
//! use toolbind_core::{Caches, FromValue, Value, record};
//!
//! record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct User {
//!         pub name: String => "user_name",
//!         pub age: i64,
//!     }
//! }
//!
//! let caches = Caches::new();
//! let input = Value::mapping([("user_name", Value::from("John"))]);
//! let user = User::from_value(input, &caches).unwrap();
//! assert_eq!(user.name, "John");
//! assert_eq!(user.age, 0);
//! ```
//!
//! Binding rules, per field in declaration order:
//! - only `pub` fields are set from input; others keep their default
//! - the alias (after `=>`) is looked up first, then the declared name
//! - a field absent from the mapping keeps its default; that is not an error
//! - each input key is consumed by the first field that matches it
//! - no fuzzy or case-insensitive matching

use crate::cache::Caches;
use crate::error::{BindError, BindResult};
use crate::shape::{RecordShape, Shape};
use crate::value::Value;

/// Declaration-time description of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub shape: Shape,
    pub public: bool,
}

/// A struct that can be bound field-by-field from a mapping.
///
/// Normally implemented by [`record!`](crate::record!).
pub trait Record: Default + 'static {
    fn record_name() -> &'static str;

    /// Fields in declaration order. Called once per process per type; the
    /// result lives in the [`FieldCache`](crate::cache::FieldCache).
    fn field_specs() -> Vec<FieldSpec>;

    /// Coerce `value` into the field at `index` and store it.
    fn set_field(&mut self, index: usize, value: Value, caches: &Caches) -> BindResult<()>;

    fn record_shape() -> Shape {
        Shape::Record(RecordShape::of::<Self>(Self::record_name()))
    }
}

/// Bind a mapping onto a fresh `R`.
pub fn bind_record<R: Record>(value: Value, caches: &Caches) -> BindResult<R> {
    let mut map = match value {
        Value::Mapping(map) => map,
        other => return Err(BindError::unsupported(other.kind(), R::record_shape())),
    };

    let fields = caches.fields().descriptors::<R>();
    let mut record = R::default();

    for field in fields.iter().filter(|field| field.public) {
        let found = match map.remove(field.alias) {
            Some(value) => Some(value),
            None if field.has_alias() => map.remove(field.name),
            None => None,
        };

        if let Some(value) = found {
            record
                .set_field(field.index, value, caches)
                .map_err(|source| BindError::Field {
                    record: R::record_name(),
                    field: field.name,
                    source: Box::new(source),
                })?;
        }
    }

    Ok(record)
}

/// Declare a record struct.
///
/// Derives `Default` and implements [`Record`], [`FromValue`](crate::FromValue),
/// [`IntoValue`](crate::IntoValue) and
/// [`IntoToolOutput`](crate::IntoToolOutput). A field may name a
/// serialization alias with `=> "alias"` after its type. Results render
/// public fields only, keyed by alias.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $alias:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::record::Record for $name {
            fn record_name() -> &'static str {
                stringify!($name)
            }

            fn field_specs() -> ::std::vec::Vec<$crate::record::FieldSpec> {
                ::std::vec![
                    $(
                        $crate::record::FieldSpec {
                            name: stringify!($field),
                            alias: $crate::__record_alias!($($alias)?),
                            shape: <$ty as $crate::convert::FromValue>::shape(),
                            public: !stringify!($fvis).is_empty(),
                        },
                    )*
                ]
            }

            #[allow(unused_assignments)]
            fn set_field(
                &mut self,
                index: usize,
                value: $crate::Value,
                caches: &$crate::cache::Caches,
            ) -> $crate::error::BindResult<()> {
                let mut position = 0usize;
                $(
                    if index == position {
                        self.$field =
                            <$ty as $crate::convert::FromValue>::from_value(value, caches)?;
                        return ::std::result::Result::Ok(());
                    }
                    position += 1;
                )*
                ::std::result::Result::Err($crate::error::BindError::unsupported(
                    value.kind(),
                    <Self as $crate::record::Record>::record_shape(),
                ))
            }
        }

        impl $crate::convert::FromValue for $name {
            fn shape() -> $crate::Shape {
                <Self as $crate::record::Record>::record_shape()
            }

            fn from_value(
                value: $crate::Value,
                caches: &$crate::cache::Caches,
            ) -> $crate::error::BindResult<Self> {
                $crate::record::bind_record::<Self>(value, caches)
            }
        }

        impl $crate::convert::IntoValue for $name {
            fn into_value(self) -> $crate::Value {
                let mut map = $crate::value::Mapping::new();
                $(
                    if !stringify!($fvis).is_empty() {
                        let key = $crate::__record_alias!($($alias)?).unwrap_or(stringify!($field));
                        map.insert(
                            key.to_string(),
                            $crate::convert::IntoValue::into_value(self.$field),
                        );
                    }
                )*
                $crate::Value::Mapping(map)
            }
        }

        impl $crate::callable::IntoToolOutput for $name {
            const RETURNS_FAILURE: bool = false;

            fn into_output(self) -> ::std::result::Result<$crate::Value, $crate::error::BoxError> {
                ::std::result::Result::Ok($crate::convert::IntoValue::into_value(self))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_alias {
    () => {
        ::std::option::Option::None
    };
    ($alias:literal) => {
        ::std::option::Option::Some($alias)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{FromValue, IntoValue};
    use crate::value::ValueKind;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Person {
            pub name: String,
            pub age: i64,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Account {
            pub name: String => "user_name",
            pub active: bool,
            secret: String,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Team {
            pub lead: Person,
            pub members: Vec<Person>,
            pub tags: Option<Vec<String>>,
        }
    }

    #[test]
    fn test_missing_field_keeps_default() {
        let caches = Caches::new();
        let person =
            Person::from_value(Value::mapping([("name", Value::from("John"))]), &caches).unwrap();
        assert_eq!(person.name, "John");
        assert_eq!(person.age, 0);
    }

    #[test]
    fn test_alias_binds() {
        let caches = Caches::new();
        let input = Value::mapping([("user_name", Value::from("jdoe"))]);
        let account = Account::from_value(input, &caches).unwrap();
        assert_eq!(account.name, "jdoe");
    }

    #[test]
    fn test_canonical_name_binds_when_alias_absent() {
        let caches = Caches::new();
        let input = Value::mapping([("name", Value::from("jdoe"))]);
        let account = Account::from_value(input, &caches).unwrap();
        assert_eq!(account.name, "jdoe");
    }

    #[test]
    fn test_alias_wins_over_canonical_name() {
        let caches = Caches::new();
        let input = Value::mapping([
            ("name", Value::from("canonical")),
            ("user_name", Value::from("aliased")),
        ]);
        let account = Account::from_value(input, &caches).unwrap();
        assert_eq!(account.name, "aliased");
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let caches = Caches::new();
        let input = Value::mapping([("Name", Value::from("x")), ("userName", Value::from("y"))]);
        let account = Account::from_value(input, &caches).unwrap();
        assert_eq!(account.name, "");
    }

    #[test]
    fn test_private_field_is_never_set() {
        let caches = Caches::new();
        let input = Value::mapping([("secret", Value::from("leak")), ("active", Value::from("true"))]);
        let account = Account::from_value(input, &caches).unwrap();
        assert_eq!(account.secret, "");
        assert!(account.active);
    }

    #[test]
    fn test_nested_records_and_sequences() {
        let caches = Caches::new();
        let input = Value::from_json_str(
            r#"{"lead": {"name": "A", "age": "40"},
                "members": [{"name": "B"}, {"name": "C", "age": 3.7}],
                "tags": null}"#,
        )
        .unwrap();

        let team = Team::from_value(input, &caches).unwrap();
        assert_eq!(team.lead.age, 40);
        assert_eq!(team.members.len(), 2);
        assert_eq!(team.members[1].age, 3);
        assert_eq!(team.tags, None);
    }

    #[test]
    fn test_field_error_names_record_and_field() {
        let caches = Caches::new();
        let input = Value::mapping([("age", Value::from("forty"))]);
        let err = Person::from_value(input, &caches).unwrap_err();
        match &err {
            BindError::Field { record, field, .. } => {
                assert_eq!(*record, "Person");
                assert_eq!(*field, "age");
            }
            other => panic!("expected field error, got {other:?}"),
        }
        assert_eq!(err.source_kind(), Some(ValueKind::Text));
    }

    #[test]
    fn test_non_mapping_is_unsupported() {
        let caches = Caches::new();
        let err = Person::from_value(Value::sequence(["John"]), &caches).unwrap_err();
        assert_eq!(err.source_kind(), Some(ValueKind::Sequence));
        assert_eq!(err.target(), Some(&Person::record_shape()));
    }

    #[test]
    fn test_descriptors_computed_once() {
        let caches = Caches::new();
        for _ in 0..3 {
            Person::from_value(Value::mapping([("age", Value::Int(1))]), &caches).unwrap();
        }
        let stats = caches.fields().counters().snapshot();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert!(caches.fields().contains::<Person>());
    }

    #[test]
    fn test_descriptor_contents() {
        let caches = Caches::new();
        let fields = caches.fields().descriptors::<Account>();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].alias, "user_name");
        assert!(fields[0].has_alias());
        assert_eq!(fields[1].alias, "active");
        assert_eq!(fields[1].shape, Shape::Bool);
        assert!(!fields[2].public);
    }

    #[test]
    fn test_concurrent_first_use_stores_one_entry() {
        let caches = Caches::new();
        let first = std::sync::Mutex::new(None::<std::sync::Arc<[crate::cache::FieldDescriptor]>>);
        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    let fields = caches.fields().descriptors::<Team>();
                    let mut guard = first.lock().unwrap();
                    match guard.as_ref() {
                        Some(seen) => assert_eq!(&**seen, &*fields),
                        None => *guard = Some(fields),
                    }
                });
            }
        });
        assert_eq!(caches.fields().len(), 1);
    }

    #[test]
    fn test_into_value_uses_aliases_and_skips_private() {
        let account = Account {
            name: "n".to_string(),
            active: true,
            secret: "s".to_string(),
        };
        let value = account.into_value();
        assert_eq!(value.get("user_name"), Some(&Value::from("n")));
        assert_eq!(value.get("active"), Some(&Value::Bool(true)));
        assert_eq!(value.get("secret"), None);
    }
}
