//! Test doubles shared by the module tests.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use exiftool::Metadata;
use slog::{o, Drain, Logger, Never, OwnedKVList, Record};

pub(crate) use slog::Level;

use crate::{
    coordinate::GpsCoordinate,
    geocode::{self, GeoAddress, Geocoder},
    metadata::{self, MetadataProvider},
};

#[derive(Clone, Default)]
pub(crate) struct Records(Arc<Mutex<Vec<(Level, String)>>>);

impl Records {
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.0
            .lock()
            .unwrap()
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(needle))
    }
}

pub(crate) struct CapturingDrain(Records);

impl CapturingDrain {
    pub fn logger() -> (Logger, Records) {
        let records = Records::default();
        (Logger::root(CapturingDrain(records.clone()), o!()), records)
    }
}

impl Drain for CapturingDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, _values: &OwnedKVList) -> Result<(), Never> {
        let Records(records) = &self.0;
        records
            .lock()
            .unwrap()
            .push((record.level(), record.msg().to_string()));
        Ok(())
    }
}

/// Metadata keyed by file name; unknown files fail like exiftool would.
#[derive(Default)]
pub(crate) struct FakeMetadata {
    files: HashMap<String, Metadata>,
    pub requested: RefCell<Vec<PathBuf>>,
}

impl FakeMetadata {
    pub fn with(mut self, file_name: &str, fields: &[(&str, &str)]) -> Self {
        self.files
            .insert(file_name.to_string(), fields.iter().copied().collect());
        self
    }
}

impl MetadataProvider for FakeMetadata {
    fn metadata(&self, path: &Path, _logger: &Logger) -> Result<Metadata, metadata::Error> {
        self.requested.borrow_mut().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files.get(&name).cloned().ok_or_else(|| {
            metadata::Error::Io(io::Error::new(io::ErrorKind::Other, "exiftool failed"))
        })
    }
}

/// Answers every lookup with the same address, or fails when there is none.
pub(crate) struct FakeGeocoder(pub Option<GeoAddress>);

impl FakeGeocoder {
    pub fn spain_madrid() -> Self {
        Self(Some(GeoAddress::from_levels(|level| match level {
            "country" => Some("Spain"),
            "city" => Some("Madrid"),
            _ => None,
        })))
    }
}

impl Geocoder for FakeGeocoder {
    fn reverse(&self, _coordinate: &GpsCoordinate) -> Result<GeoAddress, geocode::Error> {
        self.0
            .clone()
            .ok_or_else(|| geocode::Error::Service("Unable to geocode".to_string()))
    }
}
