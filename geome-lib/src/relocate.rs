use std::{
    fs, io,
    path::{Path, PathBuf},
};

use displaydoc::Display;
use filetime::FileTime;
use slog::{error, info, warn, Logger};
use thiserror::Error;

use crate::destination::DestinationPath;

#[derive(Debug, Error, Display)]
pub enum Error {
    /// cannot create directory {path:?}: {source}
    CreateDir { path: PathBuf, source: io::Error },
    /// cannot stat {path:?}: {source}
    Stat { path: PathBuf, source: io::Error },
    /// cannot move {from:?} to {to:?}: {source}
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// What happened to a file handed to [`relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    Moved {
        to: PathBuf,
    },
    /// Target exists with the same size, most likely this file from an earlier run.
    Duplicate {
        existing: PathBuf,
        size: u64,
    },
    /// Target exists with a different size; left for the operator to sort out.
    Conflict {
        existing: PathBuf,
        source_size: u64,
        existing_size: u64,
    },
}

/// Moves `source` into place unless something already occupies the target.
pub fn relocate(
    source: &Path,
    destination: &DestinationPath,
    logger: &Logger,
) -> Result<Relocation, Error> {
    fs::create_dir_all(&destination.directory).map_err(|source| Error::CreateDir {
        path: destination.directory.clone(),
        source,
    })?;
    let target = destination.path();
    let source_size = file_size(source)?;

    match fs::metadata(&target) {
        Ok(existing) if existing.len() == source_size => {
            warn!(logger, "file seems to be already geotagged, safe to remove";
                "path" => source.display(),
                "existing" => target.display(),
                "size" => source_size);
            Ok(Relocation::Duplicate {
                existing: target,
                size: source_size,
            })
        }
        Ok(existing) => {
            error!(logger, "destination is taken by a different file, check it";
                "path" => source.display(),
                "existing" => target.display(),
                "size" => source_size,
                "existing_size" => existing.len());
            Ok(Relocation::Conflict {
                existing: target,
                source_size,
                existing_size: existing.len(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            move_file(source, &target).map_err(|e| Error::Move {
                from: source.to_path_buf(),
                to: target.clone(),
                source: e,
            })?;
            info!(logger, "moved"; "path" => source.display(), "to" => target.display());
            Ok(Relocation::Moved { to: target })
        }
        Err(e) => Err(Error::Stat {
            path: target,
            source: e,
        }),
    }
}

fn file_size(path: &Path) -> Result<u64, Error> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to),
        result => result,
    }
}

/// Cross-filesystem move. The copy lands under a hidden name next to the
/// target and is renamed over once complete, so the target never holds a
/// partial file.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let name = to
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"))?;
    let mut staging_name = std::ffi::OsString::from(".");
    staging_name.push(name);
    staging_name.push(".partial");
    let staging = to.with_file_name(staging_name);

    fs::copy(from, &staging)?;
    let finish = fs::metadata(from)
        .and_then(|m| filetime::set_file_mtime(&staging, FileTime::from_last_modification_time(&m)))
        .and_then(|()| fs::rename(&staging, to));
    if let Err(e) = finish {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::remove_file(from)
}
