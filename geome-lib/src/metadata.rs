//! Sources of per-file metadata.
//!
//! Every provider produces exiftool field names so the rest of the pipeline
//! does not care where the values came from.

use std::{fs::File, io::BufReader, path::Path};

use displaydoc::Display;
use exif::{In, Tag, Value};
use exiftool::{Exiftool, Metadata};
use file_format::FileFormat;
use slog::{debug, Logger};
use thiserror::Error;

use crate::coordinate::{LATITUDE_FIELD, LONGITUDE_FIELD};

pub const EXTENSION_FIELD: &str = "File Type Extension";
pub const MEDIA_CREATE_DATE_FIELD: &str = "Media Create Date";
pub const CREATE_DATE_FIELD: &str = "Create Date";
pub const DATE_TIME_ORIGINAL_FIELD: &str = "Date/Time Original";

#[derive(Debug, Error, Display)]
pub enum Error {
    /// exiftool: {0}
    Exiftool(#[from] exiftool::Error),
    /// io: {0}
    Io(#[from] std::io::Error),
    /// exif: {0}
    Exif(#[from] exif::Error),
}

pub trait MetadataProvider {
    fn metadata(&self, path: &Path, logger: &Logger) -> Result<Metadata, Error>;
}

impl<M: MetadataProvider + ?Sized> MetadataProvider for Box<M> {
    fn metadata(&self, path: &Path, logger: &Logger) -> Result<Metadata, Error> {
        (**self).metadata(path, logger)
    }
}

impl MetadataProvider for Exiftool {
    fn metadata(&self, path: &Path, logger: &Logger) -> Result<Metadata, Error> {
        Ok(self.read(path, logger)?)
    }
}

/// Reads EXIF straight from the file without an external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedExif;

impl MetadataProvider for EmbeddedExif {
    fn metadata(&self, path: &Path, logger: &Logger) -> Result<Metadata, Error> {
        let format = FileFormat::from_file(path)?;
        let file = File::open(path)?;
        let mut bufreader = BufReader::new(&file);
        let exif = exif::Reader::new().read_from_container(&mut bufreader)?;

        let mut metadata = Metadata::new();
        metadata.insert(EXTENSION_FIELD, format.extension());
        let field = |tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);
        if let Some(created) = field(Tag::DateTimeDigitized).and_then(ascii) {
            metadata.insert(CREATE_DATE_FIELD, created);
        }
        if let Some(original) = field(Tag::DateTimeOriginal).and_then(ascii) {
            metadata.insert(DATE_TIME_ORIGINAL_FIELD, original);
        }
        if let Some(latitude) = field(Tag::GPSLatitude)
            .and_then(|v| coordinate(v, field(Tag::GPSLatitudeRef)))
        {
            metadata.insert(LATITUDE_FIELD, latitude);
        }
        if let Some(longitude) = field(Tag::GPSLongitude)
            .and_then(|v| coordinate(v, field(Tag::GPSLongitudeRef)))
        {
            metadata.insert(LONGITUDE_FIELD, longitude);
        }
        debug!(logger, "read embedded exif"; "path" => path.display(), "fields" => metadata.len());
        Ok(metadata)
    }
}

fn ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Degrees/minutes/seconds rationals rendered the way `exiftool -c %.8f` does.
fn coordinate(value: &Value, reference: Option<&Value>) -> Option<String> {
    let Value::Rational(parts) = value else {
        return None;
    };
    let degrees = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(part, scale)| part.to_f64() / scale)
        .sum::<f64>();
    if parts.is_empty() || !degrees.is_finite() {
        return None;
    }
    match reference.and_then(ascii) {
        Some(hemisphere) => Some(format!("{degrees:.8} {hemisphere}")),
        None => Some(format!("{degrees:.8}")),
    }
}
