use displaydoc::Display;
use reqwest::StatusCode;
use thiserror::Error;

use crate::coordinate::GpsCoordinate;

pub use self::cache::{CachingGeocoder, MAX_CACHE_PRECISION};
pub use self::nominatim::{Nominatim, NominatimConfig, DEFAULT_ENDPOINT};
pub use self::offline::OfflineGeocoder;
pub use self::policy::{RateLimiter, RetryPolicy};

mod cache;
mod nominatim;
mod offline;
mod policy;

/// Address keys kept from a geocoding response, coarsest first.
pub const ADDRESS_LEVELS: [&str; 6] = [
    "country",
    "state",
    "state_district",
    "city",
    "town",
    "suburb",
];

#[derive(Debug, Error, Display)]
pub enum Error {
    /// geocoding request failed: {0}
    Transport(#[from] reqwest::Error),
    /// geocoding service answered {0}
    Status(StatusCode),
    /// geocoding response is not valid json: {0}
    Decode(#[from] serde_json::Error),
    /// geocoding service error: {0}
    Service(String),
    /// geocoding response has no address
    MissingAddress,
}

impl Error {
    /// Failures worth another attempt after a pause.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Status(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Error::Decode(_) | Error::Service(_) | Error::MissingAddress => false,
        }
    }
}

/// Location names ordered from country down to suburb.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeoAddress(Vec<String>);

impl GeoAddress {
    /// Keeps the recognized levels in hierarchy order, whatever order `lookup`
    /// would have produced them in. Blank values count as absent.
    pub fn from_levels<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        Self(
            ADDRESS_LEVELS
                .into_iter()
                .filter_map(|level| lookup(level))
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// Terms joined by a single space.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

pub trait Geocoder {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        (**self).reverse(coordinate)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        (**self).reverse(coordinate)
    }
}
