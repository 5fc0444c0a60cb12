use std::fmt;

use displaydoc::Display;
use exiftool::Metadata;
use thiserror::Error;

pub const LATITUDE_FIELD: &str = "GPS Latitude";
pub const LONGITUDE_FIELD: &str = "GPS Longitude";

/// Magnitude exiftool prints when the GPS block exists but the device had no fix.
pub const NO_FIX_SENTINEL: &str = "0.00000000";

/// Why a file has no usable coordinate.
#[derive(Debug, Error, Display, Clone, PartialEq)]
pub enum NoFix {
    /// no GPS latitude in metadata
    MissingLatitude,
    /// no GPS longitude in metadata
    MissingLongitude,
    /// GPS block present but recorded without a satellite fix
    Sentinel,
    /// cannot read coordinate {0:?}
    Unparseable(String),
    /// coordinate out of range: {0}
    OutOfRange(f64),
}

/// Signed decimal degrees, negative for South and West.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinate {
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, NoFix> {
        let latitude = metadata.get(LATITUDE_FIELD).ok_or(NoFix::MissingLatitude)?;
        let longitude = metadata
            .get(LONGITUDE_FIELD)
            .ok_or(NoFix::MissingLongitude)?;
        Self::from_raw(latitude, longitude)
    }

    /// Normalizes a pair of `"<magnitude> <hemisphere>"` readings.
    pub fn from_raw(latitude: &str, longitude: &str) -> Result<Self, NoFix> {
        let latitude = signed_component(latitude)?;
        let longitude = signed_component(longitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NoFix::OutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NoFix::OutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// The free-text form geocoding services accept, `"<lat>, <lon>"`.
    pub fn query(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GpsCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

fn signed_component(raw: &str) -> Result<f64, NoFix> {
    let mut parts = raw.split_whitespace();
    let magnitude = parts
        .next()
        .ok_or_else(|| NoFix::Unparseable(raw.to_string()))?;
    // checked before the sign so "0.00000000 S" is caught too
    if magnitude == NO_FIX_SENTINEL {
        return Err(NoFix::Sentinel);
    }
    let value: f64 = magnitude
        .parse()
        .map_err(|_| NoFix::Unparseable(raw.to_string()))?;
    if !value.is_finite() {
        return Err(NoFix::Unparseable(raw.to_string()));
    }
    Ok(match parts.next() {
        Some("S") | Some("W") => -value,
        _ => value,
    })
}
