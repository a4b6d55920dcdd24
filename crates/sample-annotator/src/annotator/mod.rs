//! The annotation pipeline.
//!
//! [`SampleAnnotator`] runs a fixed sequence of stages over a private copy of
//! each sample:
//!
//! 1. `validate_identifier`
//! 2. `infer_package`
//! 3. `tidy_nulls`
//! 4. `tidy_keys`
//! 5. `tidy_enumerations`
//! 6. `tidy_measurements`
//! 7. `perform_text_mining`
//! 8. `perform_geolocation_inference`
//! 9. `perform_inference`
//!
//! Every finding is a [`Message`] on the report. A stage that fails outright
//! is reported as a `Core` message and the remaining stages still run.

mod hooks;
mod stages;

pub use hooks::SampleHook;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::AnnotatorConfig;
use crate::error::Result;
use crate::geo::{GeoEngine, GeoError, GeoWorker, NullGeoEngine};
use crate::identifier::{PrefixRegistry, StaticPrefixRegistry};
use crate::measurement::MeasurementEngine;
use crate::report::{AnnotationMultiSampleReport, AnnotationReport, Category, Message, Severity};
use crate::sample::Sample;
use crate::schema::SchemaIndex;

type Stage = fn(&SampleAnnotator, &mut Sample, &mut AnnotationReport) -> Result<()>;

/// Stages in execution order.
const STAGES: &[(&str, Stage)] = &[
    ("validate_identifier", SampleAnnotator::validate_identifier),
    ("infer_package", SampleAnnotator::infer_package),
    ("tidy_nulls", SampleAnnotator::tidy_nulls),
    ("tidy_keys", SampleAnnotator::tidy_keys),
    ("tidy_enumerations", SampleAnnotator::tidy_enumerations),
    ("tidy_measurements", SampleAnnotator::tidy_measurements),
    ("perform_text_mining", SampleAnnotator::perform_text_mining),
    ("perform_geolocation_inference", SampleAnnotator::perform_geolocation_inference),
    ("perform_inference", SampleAnnotator::perform_inference),
];

/// Schema-driven annotator for biosample records.
pub struct SampleAnnotator {
    config: AnnotatorConfig,
    schema: Arc<SchemaIndex>,
    measurement: MeasurementEngine,
    geo: Arc<dyn GeoEngine>,
    /// Started on the first lookup that has a deadline.
    geo_worker: OnceCell<GeoWorker>,
    registry: Arc<dyn PrefixRegistry>,
    text_mining: Vec<Box<dyn SampleHook>>,
    inference: Vec<Box<dyn SampleHook>>,
}

impl SampleAnnotator {
    /// Create an annotator over `schema` with default collaborators: the
    /// built-in prefix registry and a geo engine that answers nothing.
    pub fn new(schema: Arc<SchemaIndex>) -> Self {
        Self {
            config: AnnotatorConfig::default(),
            schema,
            measurement: MeasurementEngine::new(),
            geo: Arc::new(NullGeoEngine),
            geo_worker: OnceCell::new(),
            registry: Arc::new(StaticPrefixRegistry::builtin()),
            text_mining: Vec::new(),
            inference: Vec::new(),
        }
    }

    /// Create an annotator over the bundled schema.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(SchemaIndex::bundled()?))
    }

    pub fn with_config(mut self, config: AnnotatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_measurement_engine(mut self, engine: MeasurementEngine) -> Self {
        self.measurement = engine;
        self
    }

    pub fn with_geo_engine(self, engine: impl GeoEngine + 'static) -> Self {
        self.with_shared_geo_engine(Arc::new(engine))
    }

    /// Share an existing geo engine (e.g. across annotators on several threads).
    pub fn with_shared_geo_engine(mut self, engine: Arc<dyn GeoEngine>) -> Self {
        self.geo = engine;
        self.geo_worker = OnceCell::new();
        self
    }

    pub fn with_registry(mut self, registry: impl PrefixRegistry + 'static) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Add a hook to the text-mining stage.
    pub fn with_text_mining_hook(mut self, hook: impl SampleHook + 'static) -> Self {
        self.text_mining.push(Box::new(hook));
        self
    }

    /// Add a hook to the inference stage.
    pub fn with_inference_hook(mut self, hook: impl SampleHook + 'static) -> Self {
        self.inference.push(Box::new(hook));
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaIndex {
        &self.schema
    }

    /// Annotate one sample. The caller's sample is not modified.
    pub fn annotate(&self, sample: &Sample) -> AnnotationReport {
        let mut report = AnnotationReport::new(sample.clone());
        let mut working = sample.clone();

        for (name, stage) in STAGES {
            let before = report.messages.len();
            if let Err(e) = stage(self, &mut working, &mut report) {
                warn!(stage = *name, error = %e, "stage failed");
                report.add_message(Message::new(
                    Category::Core,
                    Severity::HIGH,
                    format!("stage '{}' failed: {}", name, e),
                ));
            }
            debug!(
                stage = *name,
                messages = report.messages.len() - before,
                "stage complete"
            );
        }

        report.output = working;
        debug!(
            identifier = report.identifier.as_deref().unwrap_or(""),
            messages = report.messages.len(),
            max_severity = report.max_severity().0,
            "sample annotated"
        );
        report
    }

    /// Run a geo lookup, bounded by the configured timeout when there is one.
    ///
    /// Bounded lookups share one worker thread per annotator, so a hung
    /// engine holds at most one thread no matter how many samples time out.
    fn geo_lookup<T, F>(&self, lookup: F) -> std::result::Result<T, GeoError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GeoEngine) -> std::result::Result<T, GeoError> + Send + 'static,
    {
        let Some(timeout) = self.config.geo_timeout() else {
            return lookup(self.geo.as_ref());
        };
        let worker = self
            .geo_worker
            .get_or_try_init(|| GeoWorker::spawn(Arc::clone(&self.geo)))?;
        worker.call(timeout, lookup)
    }

    /// Annotate samples one after another.
    pub fn annotate_all<'a>(
        &self,
        samples: impl IntoIterator<Item = &'a Sample>,
    ) -> AnnotationMultiSampleReport {
        let batch: AnnotationMultiSampleReport =
            samples.into_iter().map(|s| self.annotate(s)).collect();
        info!(
            samples = batch.len(),
            passing = batch.passing(),
            "batch annotated"
        );
        batch
    }
}

impl std::fmt::Debug for SampleAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleAnnotator")
            .field("config", &self.config)
            .field("schema", &self.schema.name())
            .field("text_mining_hooks", &self.text_mining.len())
            .field("inference_hooks", &self.inference.len())
            .finish()
    }
}
