//! Fuzz target for the full pipeline on arbitrary JSON records.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sample_annotator::{Sample, SampleAnnotator};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(sample) = Sample::from_json_str(text) else {
        return;
    };
    let Ok(annotator) = SampleAnnotator::bundled() else {
        return;
    };

    let report = annotator.annotate(&sample);
    assert!(report.output.iter().all(|(_, v)| !v.is_blank()));
    assert_eq!(report.input, sample);
    let _ = serde_json::to_string(&report);
});
