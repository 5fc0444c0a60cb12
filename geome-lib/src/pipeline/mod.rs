use std::path::{Path, PathBuf};

use displaydoc::Display;
use geome_util::CanonicalizedPathBuf;
use slog::{error, info, Logger};
use thiserror::Error;

use crate::{
    coordinate::{GpsCoordinate, NoFix},
    destination::{self, NamingMode},
    geocode::{self, Geocoder},
    metadata::{self, MetadataProvider},
    relocate::{self, relocate, Relocation},
};


#[derive(Debug, Error, Display)]
pub enum Error {
    /// metadata unavailable: {0}
    MetadataUnavailable(#[from] metadata::Error),
    /// no GPS data: {0}
    NoGpsData(#[from] NoFix),
    /// reverse geocoding failed: {0}
    ReverseGeocodeFailure(#[from] geocode::Error),
    /// cannot name destination: {0}
    Destination(#[from] destination::Error),
    /// relocation failed: {0}
    Relocation(#[from] relocate::Error),
}

impl Error {
    /// The file simply carries no usable location.
    pub fn is_untaggable(&self) -> bool {
        matches!(self, Error::MetadataUnavailable(_) | Error::NoGpsData(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Directory,
    InsideDestination,
    Relocated(Relocation),
}

/// Tally of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub moved: usize,
    pub duplicates: usize,
    pub conflicts: usize,
    pub untaggable: usize,
    pub failed: usize,
    pub inside_destination: usize,
    pub directories: usize,
}

impl Report {
    fn record(&mut self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Directory => &mut self.directories,
            Outcome::InsideDestination => &mut self.inside_destination,
            Outcome::Relocated(Relocation::Moved { .. }) => &mut self.moved,
            Outcome::Relocated(Relocation::Duplicate { .. }) => &mut self.duplicates,
            Outcome::Relocated(Relocation::Conflict { .. }) => &mut self.conflicts,
        };
        *counter += 1;
    }
}

/// Sorts files one at a time into `<destination>/<country>/.../<name>`.
pub struct Pipeline<M, G> {
    metadata: M,
    geocoder: G,
    destination: CanonicalizedPathBuf,
    mode: NamingMode,
    logger: Logger,
}

impl<M: MetadataProvider, G: Geocoder> Pipeline<M, G> {
    pub fn new(
        metadata: M,
        geocoder: G,
        destination: CanonicalizedPathBuf,
        mode: NamingMode,
        logger: Logger,
    ) -> Self {
        Self {
            metadata,
            geocoder,
            destination,
            mode,
            logger,
        }
    }

    pub fn process(&self, path: &Path) -> Result<Outcome, Error> {
        if path.is_dir() {
            return Ok(Outcome::Directory);
        }
        if self.destination.contains(path) {
            error!(self.logger, "file is already at destination, is destination inside the scan root?";
                "path" => path.display());
            return Ok(Outcome::InsideDestination);
        }
        info!(self.logger, "processing"; "path" => path.display());

        let metadata = self.metadata.metadata(path, &self.logger)?;
        let coordinate = GpsCoordinate::from_metadata(&metadata)?;
        let address = self.geocoder.reverse(&coordinate)?;
        let destination =
            destination::build(self.destination.as_path(), &metadata, self.mode, &address)?;
        Ok(Outcome::Relocated(relocate(
            path,
            &destination,
            &self.logger,
        )?))
    }

    /// Processes every path; a failing file is logged and counted, never fatal.
    pub fn run(&self, paths: impl IntoIterator<Item = PathBuf>) -> Report {
        let mut report = Report::default();
        for path in paths {
            match self.process(&path) {
                Ok(outcome) => report.record(&outcome),
                Err(e) if e.is_untaggable() => {
                    error!(self.logger, "geotagging not possible"; "path" => path.display(), "error" => %e);
                    report.untaggable += 1;
                }
                Err(e) => {
                    error!(self.logger, "failed to process file"; "path" => path.display(), "error" => %e);
                    report.failed += 1;
                }
            }
        }
        info!(self.logger, "done";
            "moved" => report.moved,
            "duplicates" => report.duplicates,
            "conflicts" => report.conflicts,
            "untaggable" => report.untaggable,
            "failed" => report.failed,
            "inside_destination" => report.inside_destination);
        report
    }
}
