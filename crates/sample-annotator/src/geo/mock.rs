//! Mock geo engine for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{GeoEngine, GeoError};

/// Geo engine that returns configured answers and counts its calls.
#[derive(Debug, Default)]
pub struct MockGeoEngine {
    elevation: Option<String>,
    soil_type: Option<String>,
    failure: Option<GeoError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockGeoEngine {
    /// Create a mock that answers `None` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer elevation lookups with `elevation`.
    pub fn with_elevation(mut self, elevation: impl Into<String>) -> Self {
        self.elevation = Some(elevation.into());
        self
    }

    /// Answer soil-type lookups with `soil_type`.
    pub fn with_soil_type(mut self, soil_type: impl Into<String>) -> Self {
        self.soil_type = Some(soil_type.into());
        self
    }

    /// Fail every lookup with `error`.
    pub fn failing(mut self, error: GeoError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most lookups that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn answer(&self, value: &Option<String>) -> Result<Option<String>, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(value.clone()),
        }
    }
}

impl GeoEngine for MockGeoEngine {
    fn get_elevation(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>, GeoError> {
        self.answer(&self.elevation)
    }

    fn get_fao_soil_type(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<String>, GeoError> {
        self.answer(&self.soil_type)
    }
}
