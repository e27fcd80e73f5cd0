//! Property-Based Tests for the Coercion Matrix
//!
//! Invariants of the conversion rules that must hold for any input: lossless
//! round trips through text, truncation toward zero, feasibility agreeing
//! with the actual rules, and the Conversion Cache never changing an answer.

use proptest::prelude::*;
use toolbind_testing::fixtures;
use toolbind_workspace::{
    BindError, Caches, EngineConfigBuilder, FromValue, Shape, Tool, ToolContext, Value,
    coercion,
};

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_map(Value::Float),
        "[a-zA-Z0-9 .-]{0,12}".prop_map(Value::Text),
        any::<i64>().prop_map(|i| Value::Text(i.to_string())),
        prop_oneof![Just("true"), Just("FALSE"), Just("True")]
            .prop_map(|s| Value::Text(s.to_string())),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::Mapping),
        ]
    })
}

fn uncached() -> Caches {
    let config = EngineConfigBuilder::new()
        .conversion_cache(false)
        .build()
        .unwrap();
    Caches::from_config(&config)
}

fn shapes() -> Vec<Shape> {
    vec![
        Shape::Bool,
        Shape::Int,
        Shape::Float,
        Shape::Text,
        Shape::sequence(Shape::Int),
        Shape::mapping(Shape::Text, Shape::Float),
        Shape::optional(Shape::Int),
        Shape::Any,
    ]
}

proptest! {
    /// Property: integers survive a trip through text unchanged
    #[test]
    fn prop_int_text_round_trip(i in any::<i64>()) {
        let caches = Caches::new();
        let text = String::from_value(Value::Int(i), &caches).unwrap();
        let back = i64::from_value(Value::Text(text), &caches).unwrap();
        prop_assert_eq!(back, i);
    }

    /// Property: finite floats survive a trip through text bit-for-bit
    #[test]
    fn prop_float_text_round_trip(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let caches = Caches::new();
        let text = String::from_value(Value::Float(f), &caches).unwrap();
        let back = f64::from_value(Value::Text(text), &caches).unwrap();
        prop_assert_eq!(back.to_bits(), f.to_bits());
    }

    /// Property: float to int truncates toward zero
    #[test]
    fn prop_float_to_int_truncates(f in -1.0e15_f64..1.0e15_f64) {
        let caches = Caches::new();
        let i = i64::from_value(Value::Float(f), &caches).unwrap();
        prop_assert_eq!(i, f.trunc() as i64);
        prop_assert!((i as f64).abs() <= f.abs());
    }

    /// Property: non-finite floats never become integers
    #[test]
    fn prop_non_finite_float_is_out_of_range(
        f in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)]
    ) {
        let err = i64::from_value(Value::Float(f), &Caches::new()).unwrap_err();
        let is_out_of_range = matches!(err, BindError::OutOfRange { .. });
        prop_assert!(is_out_of_range);
    }

    /// Property: booleans map to 0 and 1, and back through text
    #[test]
    fn prop_bool_conversions(b in any::<bool>()) {
        let caches = Caches::new();
        prop_assert_eq!(i64::from_value(Value::Bool(b), &caches).unwrap(), i64::from(b));
        prop_assert_eq!(f64::from_value(Value::Bool(b), &caches).unwrap(), if b { 1.0 } else { 0.0 });
        let text = String::from_value(Value::Bool(b), &caches).unwrap();
        prop_assert_eq!(bool::from_value(Value::Text(text.to_uppercase()), &caches).unwrap(), b);
    }

    /// Property: a narrow integer binds exactly when the value fits
    #[test]
    fn prop_narrow_ints_respect_range(i in any::<i64>()) {
        let caches = Caches::new();
        prop_assert_eq!(u8::from_value(Value::Int(i), &caches).ok(), u8::try_from(i).ok());
        prop_assert_eq!(i32::from_value(Value::Int(i), &caches).ok(), i32::try_from(i).ok());
    }

    /// Property: every value renders as text
    #[test]
    fn prop_text_accepts_everything(value in value_strategy()) {
        prop_assert!(String::from_value(value, &Caches::new()).is_ok());
    }

    /// Property: an infeasible kind pair is always rejected as unsupported
    #[test]
    fn prop_infeasible_pairs_are_unsupported(value in value_strategy()) {
        let caches = Caches::new();
        let kind = value.kind();
        for shape in shapes() {
            if coercion::feasible(kind, &shape) {
                continue;
            }
            let err = match &shape {
                Shape::Bool => bool::from_value(value.clone(), &caches).map(drop).unwrap_err(),
                Shape::Int => i64::from_value(value.clone(), &caches).map(drop).unwrap_err(),
                Shape::Float => f64::from_value(value.clone(), &caches).map(drop).unwrap_err(),
                Shape::Sequence(_) => Vec::<i64>::from_value(value.clone(), &caches)
                    .map(drop)
                    .unwrap_err(),
                Shape::Mapping(..) => {
                    std::collections::HashMap::<String, f64>::from_value(value.clone(), &caches)
                        .map(drop)
                        .unwrap_err()
                }
                Shape::Optional(_) => Option::<i64>::from_value(value.clone(), &caches)
                    .map(drop)
                    .unwrap_err(),
                other => panic!("{other} is always feasible"),
            };
            // A present value is checked against the optional's inner shape.
            let expected = match &shape {
                Shape::Optional(inner) => inner.as_ref().clone(),
                other => other.clone(),
            };
            prop_assert_eq!(err, BindError::unsupported(kind, expected));
        }
    }

    /// Property: the Conversion Cache only ever speeds up an answer
    #[test]
    fn prop_cache_does_not_change_results(value in value_strategy()) {
        let cached = Caches::new();
        let plain = uncached();

        // Twice through the cached set, so the second pass hits the cache.
        for _ in 0..2 {
            prop_assert_eq!(
                i64::from_value(value.clone(), &cached),
                i64::from_value(value.clone(), &plain)
            );
            prop_assert_eq!(
                f64::from_value(value.clone(), &cached).map(f64::to_bits),
                f64::from_value(value.clone(), &plain).map(f64::to_bits)
            );
            prop_assert_eq!(
                bool::from_value(value.clone(), &cached),
                bool::from_value(value.clone(), &plain)
            );
            prop_assert_eq!(
                Vec::<String>::from_value(value.clone(), &cached),
                Vec::<String>::from_value(value.clone(), &plain)
            );
        }
        prop_assert!(plain.conversions().is_empty());
    }

    /// Property: a tool adds whatever integers it is given, as ints or text
    #[test]
    fn prop_add_tool_is_exact(
        a in any::<i32>(),
        b in any::<i32>(),
        as_text in any::<bool>()
    ) {
        let tool = fixtures::add_tool();
        let (a, b) = (i64::from(a), i64::from(b));
        let input = if as_text {
            Value::sequence([a.to_string(), b.to_string()])
        } else {
            Value::sequence([a, b])
        };
        let output = tool.execute(&ToolContext::new(), input).unwrap();
        prop_assert_eq!(output, Value::Int(a + b));
    }

    /// Property: record binding reads aliased and plain fields for any content
    #[test]
    fn prop_user_binding(name in "[a-zA-Z ]{0,16}", age in 0_i64..150) {
        let tool = fixtures::describe_user_tool();
        let input = Value::mapping([
            ("user_name", Value::from(name.clone())),
            ("age", Value::from(age.to_string())),
        ]);
        let output = tool.execute(&ToolContext::new(), input).unwrap();
        prop_assert_eq!(output, Value::from(format!("{name} ({age})")));
    }
}
