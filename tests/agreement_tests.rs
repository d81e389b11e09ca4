//! Property tests: generators and compiled validators agree on every keyword

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use schemafixture::{InvalidValueGenerator, Schema, ValidatorCompiler, ValueGenerator};
use serde_json::{json, Value};

const PATTERNS: [&str; 6] = [
    "^[A-Z0-9]{5}$",
    "^[a-z]+@[a-z]+\\.(com|org)$",
    "^\\d{3}-\\d{4}$",
    "^(red|green|blue)$",
    "^x?y+z*$",
    "^[^0-9]{2,6}$",
];

fn integer_schema() -> impl Strategy<Value = Value> {
    (-100i64..100, 1i64..12, 0i64..40, any::<bool>(), any::<bool>()).prop_map(
        |(min, divisor, extra, exclusive_min, exclusive_max)| {
            // wide enough to hold a multiple strictly inside the bounds
            let max = min + 2 * divisor + 2 + extra;
            json!({
                "type": "integer",
                "minimum": min,
                "maximum": max,
                "exclusiveMinimum": exclusive_min,
                "exclusiveMaximum": exclusive_max,
                "divisibleBy": divisor
            })
        },
    )
}

fn number_schema() -> impl Strategy<Value = Value> {
    (-100.0f64..100.0, 0.5f64..50.0, any::<bool>(), any::<bool>()).prop_map(
        |(min, span, exclusive_min, exclusive_max)| {
            json!({
                "type": "number",
                "minimum": min,
                "maximum": min + span,
                "exclusiveMinimum": exclusive_min,
                "exclusiveMaximum": exclusive_max
            })
        },
    )
}

/// One declared bound only, anywhere relative to the default range
fn lone_bound_schema() -> impl Strategy<Value = Value> {
    (-1000i64..1000, 1i64..12, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(bound, divisor, exclusive, upper, integer)| {
            let (keyword, flag) = if upper {
                ("maximum", "exclusiveMaximum")
            } else {
                ("minimum", "exclusiveMinimum")
            };
            let mut document = if integer {
                json!({"type": "integer", "divisibleBy": divisor})
            } else {
                json!({"type": "number"})
            };
            document[keyword] = json!(bound);
            document[flag] = json!(exclusive);
            document
        },
    )
}

fn string_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0usize..10, 0usize..10).prop_map(|(min, span)| json!({
            "type": "string", "minLength": min, "maxLength": min + span
        })),
        prop::sample::select(PATTERNS.to_vec())
            .prop_map(|pattern| json!({"type": "string", "pattern": pattern})),
    ]
}

fn array_schema() -> impl Strategy<Value = Value> {
    (0usize..5, 0usize..5, any::<bool>()).prop_map(|(min, span, unique)| {
        json!({
            "type": "array",
            "minItems": min,
            "maxItems": min + span,
            "uniqueItems": unique,
            "items": {"type": "integer", "minimum": 0, "maximum": 1000}
        })
    })
}

fn any_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        integer_schema(),
        number_schema(),
        lone_bound_schema(),
        string_schema(),
        array_schema()
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn generated_values_pass_validation(document in any_schema(), seed in any::<u64>()) {
        let schema = Schema::from_value(&document).unwrap();
        let validator = ValidatorCompiler::new().compile("prop", &schema).unwrap().unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..5 {
            let value = ValueGenerator::new().generate(&schema, &mut rng).unwrap();
            prop_assert!(
                validator.is_valid(&value),
                "{} rejected {}: {:?}", document, value, validator.validate(&value)
            );
        }
    }

    #[test]
    fn invalid_values_fail_validation(document in any_schema(), seed in any::<u64>()) {
        let schema = Schema::from_value(&document).unwrap();
        let validator = ValidatorCompiler::new().compile("prop", &schema).unwrap().unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        for value in InvalidValueGenerator::default().generate(&schema, &mut rng).unwrap() {
            prop_assert!(!validator.is_valid(&value), "{} accepted {}", document, value);
        }
    }

    #[test]
    fn enum_values_round_trip(
        values in prop::collection::vec(-1000i64..1000, 1..8),
        seed in any::<u64>(),
    ) {
        let schema = Schema::from_value(&json!({"type": "integer", "enum": values})).unwrap();
        let validator = ValidatorCompiler::new().compile("prop", &schema).unwrap().unwrap();
        let value = ValueGenerator::new()
            .generate(&schema, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        prop_assert!(values.contains(&value.as_i64().unwrap()));
        prop_assert!(validator.is_valid(&value));
    }
}
