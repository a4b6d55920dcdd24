//! Fuzz target for MeasurementEngine.
//!
//! The engine must never panic on any text, and any quantity it returns must
//! carry a value or bounds.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sample_annotator::{AnnotationReport, MeasurementEngine, Sample, Value};

fuzz_target!(|data: &[u8]| {
    let engine = MeasurementEngine::new();
    let text = String::from_utf8_lossy(data);

    let mut report = AnnotationReport::new(Sample::new());
    if let Some(q) = engine.repair(&Value::text(text.as_ref()), Some("meter"), &mut report) {
        assert!(q.numeric_value.is_some() || q.is_range());
    }
    let _ = engine.extract(&text);
});
