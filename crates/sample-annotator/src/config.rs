//! Annotator configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotatorError, Result};

/// Configuration for a [`SampleAnnotator`](crate::SampleAnnotator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Run the geolocation stage's external lookups. When false the stage
    /// still parses `lat_lon` but never calls the geo engine.
    pub enable_geolocation: bool,
    /// Deadline for each geo lookup, in milliseconds (None = wait forever).
    pub geo_timeout_ms: Option<u64>,
    /// Unit attached to elevations returned by the geo engine.
    pub elevation_unit: String,
    /// Largest difference between a recorded and a looked-up elevation that
    /// is not reported.
    pub elevation_tolerance: f64,
    /// Use a slot's preferred unit as the default unit for bare numbers.
    pub use_preferred_units: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            enable_geolocation: true,
            geo_timeout_ms: None,
            elevation_unit: "meter".to_string(),
            elevation_tolerance: 100.0,
            use_preferred_units: true,
        }
    }
}

impl AnnotatorConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AnnotatorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no annotator can run with.
    pub fn validate(&self) -> Result<()> {
        if !self.elevation_tolerance.is_finite() || self.elevation_tolerance < 0.0 {
            return Err(AnnotatorError::Config(format!(
                "elevation_tolerance must be a non-negative number, got {}",
                self.elevation_tolerance
            )));
        }
        if self.elevation_unit.trim().is_empty() {
            return Err(AnnotatorError::Config(
                "elevation_unit must not be empty".to_string(),
            ));
        }
        if self.geo_timeout_ms == Some(0) {
            return Err(AnnotatorError::Config(
                "geo_timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_geolocation(mut self, enabled: bool) -> Self {
        self.enable_geolocation = enabled;
        self
    }

    pub fn with_geo_timeout(mut self, timeout: Duration) -> Self {
        self.geo_timeout_ms = Some(timeout.as_millis().max(1) as u64);
        self
    }

    pub fn with_elevation_unit(mut self, unit: impl Into<String>) -> Self {
        self.elevation_unit = unit.into();
        self
    }

    pub fn with_elevation_tolerance(mut self, tolerance: f64) -> Self {
        self.elevation_tolerance = tolerance;
        self
    }

    pub fn with_preferred_units(mut self, enabled: bool) -> Self {
        self.use_preferred_units = enabled;
        self
    }

    /// The geo deadline as a [`Duration`].
    pub fn geo_timeout(&self) -> Option<Duration> {
        self.geo_timeout_ms.map(Duration::from_millis)
    }
}
