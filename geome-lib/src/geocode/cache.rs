use std::{cell::RefCell, collections::HashMap};

use slog::{debug, Logger};

use super::{Error, GeoAddress, Geocoder};
use crate::coordinate::GpsCoordinate;

/// Finest rounding the `i64` keys can hold for any valid coordinate.
pub const MAX_CACHE_PRECISION: u32 = 9;

/// Remembers addresses for the rest of the run, keyed by the coordinate
/// rounded to `precision` decimal places.
///
/// Four places is roughly 11m at the equator. Precision is capped at
/// [`MAX_CACHE_PRECISION`]. Failed lookups are not cached.
pub struct CachingGeocoder<G> {
    inner: G,
    precision: u32,
    entries: RefCell<HashMap<(i64, i64), GeoAddress>>,
    logger: Logger,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G, precision: u32, logger: Logger) -> Self {
        Self {
            inner,
            precision: precision.min(MAX_CACHE_PRECISION),
            entries: RefCell::new(HashMap::new()),
            logger,
        }
    }

    fn key(&self, coordinate: &GpsCoordinate) -> (i64, i64) {
        let scale = 10f64.powi(self.precision as i32);
        (
            (coordinate.latitude * scale).round() as i64,
            (coordinate.longitude * scale).round() as i64,
        )
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        let key = self.key(coordinate);
        if let Some(address) = self.entries.borrow().get(&key) {
            debug!(self.logger, "geocode cache hit"; "query" => coordinate.query());
            return Ok(address.clone());
        }
        let address = self.inner.reverse(coordinate)?;
        self.entries.borrow_mut().insert(key, address.clone());
        Ok(address)
    }
}
