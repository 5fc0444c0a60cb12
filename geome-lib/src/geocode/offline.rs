use reverse_geocoder::ReverseGeocoder;
use slog::{debug, Logger};

use super::{Error, GeoAddress, Geocoder};
use crate::coordinate::GpsCoordinate;

/// Nearest-place lookup in the GeoNames table bundled with `reverse_geocoder`.
///
/// Coarser than a real address: country is the ISO code and there is no
/// town or suburb level.
pub struct OfflineGeocoder {
    geocoder: ReverseGeocoder,
    logger: Logger,
}

impl OfflineGeocoder {
    pub fn new(logger: Logger) -> Self {
        Self {
            geocoder: ReverseGeocoder::new(),
            logger,
        }
    }
}

impl Geocoder for OfflineGeocoder {
    fn reverse(&self, coordinate: &GpsCoordinate) -> Result<GeoAddress, Error> {
        let result = self
            .geocoder
            .search((coordinate.latitude, coordinate.longitude));
        let record = result.record;
        debug!(self.logger, "nearest place";
            "query" => coordinate.query(),
            "place" => &record.name,
            "distance" => result.distance);
        Ok(address_from_place(
            &record.cc,
            &record.admin1,
            &record.admin2,
            &record.name,
        ))
    }
}

fn address_from_place(cc: &str, admin1: &str, admin2: &str, name: &str) -> GeoAddress {
    GeoAddress::from_levels(|level| match level {
        "country" => Some(cc),
        "state" => Some(admin1),
        "state_district" => Some(admin2),
        "city" => Some(name),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_place_test() {
        let address = address_from_place("ES", "Madrid", "Provincia de Madrid", "Madrid");
        insta::assert_debug_snapshot!(address.terms(), @r###"
        [
            "ES",
            "Madrid",
            "Provincia de Madrid",
            "Madrid",
        ]
        "###);
    }

    #[test]
    fn address_from_place_skips_blank_admin() {
        let address = address_from_place("SG", "", "", "Singapore");
        assert_eq!(address.terms(), ["SG", "Singapore"]);
    }

    #[test]
    fn offline_lookup() -> anyhow::Result<()> {
        let geocoder = OfflineGeocoder::new(slog::Logger::root(slog::Discard, slog::o!()));
        let madrid = GpsCoordinate::from_raw("40.41677500 N", "3.70379000 W")?;
        let address = geocoder.reverse(&madrid)?;
        assert_eq!(address.terms().first().map(String::as_str), Some("ES"));
        Ok(())
    }
}
