//! Property-based tests for the annotation pipeline.
//!
//! These tests use proptest to generate random records and verify that the
//! pipeline keeps its invariants under all inputs:
//!
//! 1. **No panics**: annotation and measurement repair never crash
//! 2. **Clean output**: no empty or null values survive
//! 3. **Stable keys**: re-annotating an output needs no key repairs
//! 4. **Identifier carried**: any identifier candidate yields an `id`
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p sample-annotator --test property_tests
//! ```

use proptest::prelude::*;

use sample_annotator::sample::{ControlledTermValue, GeolocationValue, QuantityValue};
use sample_annotator::{
    AnnotationReport, Category, MeasurementEngine, RepairStatus, Sample, SampleAnnotator, Value,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Keys mixing canonical names, aliases, spaced variants and unknown names.
fn field_key() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "id", "temp", "temperature", "depth", "lat_lon", "latitude and longitude",
            "env_package", "env package", "rel_to_oxygen", "elev", "elevation",
            "sample name", "ph", "pH", "salinity", "cur_land_use",
        ])
        .prop_map(str::to_string),
        "[a-z]{1,8}( [a-z]{1,8})?",
    ]
}

/// Structured values with nothing in them.
fn structured_blank() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[ \t]{0,3}"
            .prop_map(|raw| Value::Quantity(QuantityValue::default().with_raw_value(raw))),
        Just(Value::ControlledTerm(ControlledTermValue::default())),
        Just(Value::Geolocation(GeolocationValue::default())),
    ]
}

/// Scalar values, including blanks and measurement-like text.
fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::text("")),
        Just(Value::List(vec![])),
        structured_blank(),
        "\\PC{0,30}".prop_map(Value::text),
        "-?[0-9]{1,4}(\\.[0-9]{1,3})? ?(m|cm|C|°C|ft|widgets)?".prop_map(Value::text),
        (-100.0f64..100.0, -200.0f64..200.0)
            .prop_map(|(a, b)| Value::text(format!("{} {}", a, b))),
        (-1.0e6f64..1.0e6).prop_map(Value::Number),
    ]
}

/// Scalars plus lists nested up to three levels, often holding blanks.
fn field_value() -> impl Strategy<Value = Value> {
    scalar_value().prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::List)
    })
}

fn sample_strategy() -> impl Strategy<Value = Sample> {
    prop::collection::vec((field_key(), field_value()), 0..12)
        .prop_map(|fields| fields.into_iter().collect())
}

fn annotator() -> SampleAnnotator {
    SampleAnnotator::bundled().expect("bundled schema loads")
}

// =============================================================================
// Pipeline Properties
// =============================================================================

proptest! {
    /// Output never contains blank values, at any list depth or inside
    /// structured values.
    #[test]
    fn prop_output_has_no_blank_values(sample in sample_strategy()) {
        let report = annotator().annotate(&sample);
        for (key, value) in report.output.iter() {
            prop_assert!(!value.is_blank(), "blank value for {}", key);
        }
    }

    /// The caller's sample is never modified and is kept as the report input.
    #[test]
    fn prop_input_is_preserved(sample in sample_strategy()) {
        let before = sample.clone();
        let report = annotator().annotate(&sample);
        prop_assert_eq!(&sample, &before);
        prop_assert_eq!(&report.input, &before);
    }

    /// A tidied output needs no further key repairs.
    #[test]
    fn prop_tidy_keys_is_idempotent(sample in sample_strategy()) {
        let annotator = annotator();
        let first = annotator.annotate(&sample);
        let second = annotator.annotate(&first.output);
        let key_repairs = second
            .messages_in(Category::UnknownField)
            .filter(|m| m.repaired == RepairStatus::Repaired)
            .count();
        prop_assert_eq!(key_repairs, 0);
    }

    /// Any populated identifier candidate puts an `id` in the output.
    #[test]
    fn prop_identifier_is_carried(
        field in prop::sample::select(vec!["id", "source_mat_id", "identifier"]),
        raw in "[A-Za-z0-9._-]{1,12}(:[A-Za-z0-9._-]{1,12})?",
    ) {
        let sample = Sample::new().with(field, raw.as_str());
        let report = annotator().annotate(&sample);
        prop_assert!(report.output.contains_key("id"));
        prop_assert!(report.identifier.is_some());
    }

    /// Pass/fail is exactly "no message above severity zero".
    #[test]
    fn prop_passes_matches_severities(sample in sample_strategy()) {
        let report = annotator().annotate(&sample);
        let clean = report.messages.iter().all(|m| m.severity.0 == 0);
        prop_assert_eq!(report.passes(), clean);
    }
}

// =============================================================================
// Measurement Properties
// =============================================================================

proptest! {
    /// Repair never panics, and any result carries a value or bounds.
    #[test]
    fn prop_repair_yields_numbers(text in "\\PC{0,40}") {
        let mut report = AnnotationReport::new(Sample::new());
        if let Some(q) = MeasurementEngine::new().repair(&Value::text(text), None, &mut report) {
            prop_assert!(q.numeric_value.is_some() || q.is_range());
        }
    }

    /// Plain numbers with a known unit round through the parser.
    #[test]
    fn prop_number_with_meter(value in 0u32..100_000) {
        let mut report = AnnotationReport::new(Sample::new());
        let text = format!("{} m", value);
        let q = MeasurementEngine::new()
            .repair(&Value::text(text), None, &mut report)
            .expect("quantity");
        prop_assert_eq!(q.numeric_value, Some(value as f64));
        prop_assert_eq!(q.unit.as_deref(), Some("meter"));
    }
}
