use std::path::Path;
use std::str::FromStr;
use std::{fs, io::Error, path::PathBuf};

use derive_more::{Display, Into};

/// An absolute path with symlinks resolved.
///
/// Only constructible from a path that exists, so two values can be compared
/// by prefix without `..` or links getting in the way.
#[derive(Clone, Debug, PartialEq, Eq, Into, Display)]
#[display("{}", _0.display())]
pub struct CanonicalizedPathBuf(PathBuf);

impl CanonicalizedPathBuf {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self(path.as_ref().canonicalize()?))
    }

    /// Creates the directory (and parents) first if it is missing.
    pub fn create_dir_all(path: impl AsRef<Path>) -> Result<Self, Error> {
        fs::create_dir_all(path.as_ref())?;
        Self::new(path)
    }

    /// Whether `path` is this directory or lies somewhere beneath it.
    ///
    /// `path` is canonicalized when possible; a path that cannot be resolved
    /// is compared as given.
    pub fn contains(&self, path: &Path) -> bool {
        match path.canonicalize() {
            Ok(resolved) => resolved.starts_with(&self.0),
            Err(_) => path.starts_with(&self.0),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl FromStr for CanonicalizedPathBuf {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<Path> for CanonicalizedPathBuf {
    fn as_ref(&self) -> &Path {
        self.0.as_ref()
    }
}
