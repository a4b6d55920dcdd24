//! Geospatial lookups by coordinate.
//!
//! The annotator never talks to a geospatial service itself; it calls a
//! [`GeoEngine`] supplied by the caller. [`NullGeoEngine`] answers nothing and
//! [`MockGeoEngine`] returns fixed answers for tests. Lookups with a deadline
//! go through a [`GeoWorker`].

mod mock;
mod worker;

pub use mock::MockGeoEngine;
pub use worker::GeoWorker;

use std::time::Duration;

use thiserror::Error;

/// Failure of a geospatial lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeoError {
    /// The service could not be reached or refused the request.
    #[error("geo service unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not finish before the deadline.
    #[error("geo lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with something that could not be interpreted.
    #[error("invalid geo response: {0}")]
    InvalidResponse(String),
}

/// Elevation and soil-type lookup by latitude/longitude.
pub trait GeoEngine: Send + Sync {
    /// Elevation at the point as text (e.g. `"16.5"`), or `None` when the
    /// service has no answer.
    fn get_elevation(&self, latitude: f64, longitude: f64) -> Result<Option<String>, GeoError>;

    /// FAO soil-type label at the point.
    fn get_fao_soil_type(&self, latitude: f64, longitude: f64) -> Result<Option<String>, GeoError>;
}

/// A geo engine that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeoEngine;

impl GeoEngine for NullGeoEngine {
    fn get_elevation(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>, GeoError> {
        Ok(None)
    }

    fn get_fao_soil_type(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<String>, GeoError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_engine() {
        let engine = NullGeoEngine;
        assert_eq!(engine.get_elevation(1.0, 2.0), Ok(None));
        assert_eq!(engine.get_fao_soil_type(1.0, 2.0), Ok(None));
    }
}
