//! Sorts media into `<destination>/<country>/<state>/...` by where it was shot.

pub mod coordinate;
pub mod destination;
pub mod discover;
pub mod geocode;
pub mod metadata;
pub mod pipeline;
pub mod relocate;
#[cfg(test)]
mod testing;

pub use exiftool::{Exiftool, Metadata};
pub use geome_util::CanonicalizedPathBuf;

pub use coordinate::{GpsCoordinate, NoFix};
pub use destination::{DestinationPath, NamingMode};
pub use geocode::{GeoAddress, Geocoder};
pub use metadata::{EmbeddedExif, MetadataProvider};
pub use pipeline::{Pipeline, Report};
pub use relocate::Relocation;
