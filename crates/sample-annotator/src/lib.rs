//! sample-annotator: schema-driven annotation and repair of biosample metadata.
//!
//! Each record runs through a fixed pipeline that checks its identifier,
//! resolves its environmental package, drops empty fields, maps keys onto
//! canonical schema names, checks enumerated values, parses measurements, and
//! resolves coordinates. The result is a tidied copy of the record plus a
//! report of every repair and every unresolved problem.
//!
//! # Core Principles
//!
//! - **Non-destructive**: the caller's record is never modified
//! - **Findings are data**: problems become [`Message`]s with a category and
//!   severity, never errors
//! - **Setup fails fast**: a bad schema, registry, or configuration is an
//!   [`AnnotatorError`] at construction
//!
//! # Example
//!
//! ```
//! use sample_annotator::{Sample, SampleAnnotator};
//!
//! let annotator = SampleAnnotator::bundled().unwrap();
//! let sample = Sample::new()
//!     .with("id", "biosample:SAMN12345678")
//!     .with("temperature", "4 C")
//!     .with("lat_lon", "40.714224 -73.961452");
//!
//! let report = annotator.annotate(&sample);
//! assert_eq!(report.identifier.as_deref(), Some("biosample:SAMN12345678"));
//! assert!(report.output.contains_key("temp"));
//! assert!(!report.input.contains_key("temp"));
//! ```

pub mod annotator;
pub mod config;
pub mod error;
pub mod geo;
pub mod identifier;
pub mod measurement;
pub mod report;
pub mod sample;
pub mod schema;

pub use annotator::{SampleAnnotator, SampleHook};
pub use config::AnnotatorConfig;
pub use error::{AnnotatorError, Result};
pub use geo::{GeoEngine, GeoError, MockGeoEngine, NullGeoEngine};
pub use identifier::{PrefixRegistry, StaticPrefixRegistry};
pub use measurement::MeasurementEngine;
pub use report::{
    AnnotationMultiSampleReport, AnnotationReport, Category, Message, RepairStatus, Severity,
};
pub use sample::{QuantityValue, Sample, Value};
pub use schema::SchemaIndex;
