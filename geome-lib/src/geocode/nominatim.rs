use std::{thread, time::Duration};

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use slog::{debug, Logger};

use super::{Error, GeoAddress, Geocoder, RateLimiter, RetryPolicy};
use crate::coordinate::GpsCoordinate;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Full URL of the `reverse` endpoint.
    pub endpoint: String,
    pub user_agent: String,
    /// Sent as `accept-language` when set.
    pub language: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub min_interval: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("geome/", env!("CARGO_PKG_VERSION")).to_string(),
            language: None,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            min_interval: Duration::from_secs(1),
        }
    }
}

/// Reverse geocoding against a Nominatim server over HTTP.
pub struct Nominatim {
    client: Client,
    config: NominatimConfig,
    limiter: RateLimiter,
    logger: Logger,
}

impl Nominatim {
    pub fn new(config: NominatimConfig, logger: Logger) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            limiter: RateLimiter::new(config.min_interval),
            config,
            logger,
        })
    }

    fn request(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        self.limiter.wait();
        let latitude = coordinate.latitude.to_string();
        let longitude = coordinate.longitude.to_string();
        let mut request = self.client.get(&self.config.endpoint).query(&[
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("lat", latitude.as_str()),
            ("lon", longitude.as_str()),
        ]);
        if let Some(language) = &self.config.language {
            request = request.query(&[("accept-language", language.as_str())]);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = ReverseResponse::parse(&response.bytes()?)?;
        let address = body.into_address()?;
        debug!(self.logger, "geocoded"; "query" => coordinate.query(), "address" => address.joined());
        Ok(address)
    }
}

impl Geocoder for Nominatim {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        debug!(self.logger, "querying geocoder";
            "endpoint" => &self.config.endpoint,
            "query" => coordinate.query());
        self.config
            .retry
            .run(&self.logger, || self.request(coordinate), thread::sleep)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<Map<String, Value>>,
}

impl ReverseResponse {
    pub(super) fn parse(body: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(body)?)
    }

    pub(super) fn into_address(self) -> Result<GeoAddress, Error> {
        if let Some(error) = self.error {
            return Err(Error::Service(error));
        }
        let address = self.address.ok_or(Error::MissingAddress)?;
        Ok(GeoAddress::from_levels(|level| {
            address.get(level).and_then(Value::as_str)
        }))
    }
}
