//! Measurement parsing.
//!
//! Free-text quantities such as `"2cm"`, `"15 degrees Celsius"` or
//! `"5 ± 0.5 m"` are turned into [`QuantityValue`](crate::sample::QuantityValue)s
//! with a canonical unit name. A small correction table remaps units the
//! recognizer gets wrong for sample metadata (`C` is a temperature here, not
//! coulombs).
//!
//! ```
//! use sample_annotator::measurement::MeasurementEngine;
//! use sample_annotator::report::AnnotationReport;
//! use sample_annotator::sample::{Sample, Value};
//!
//! let engine = MeasurementEngine::new();
//! let mut report = AnnotationReport::new(Sample::new());
//! let q = engine.repair(&Value::text("4 C"), None, &mut report).unwrap();
//! assert_eq!(q.unit.as_deref(), Some("degree Celsius"));
//! ```

mod engine;
mod extract;
mod units;

pub use engine::MeasurementEngine;
pub use extract::{Extraction, extract_quantities};
pub use units::{convert_length, lookup_unit, match_leading_unit};
