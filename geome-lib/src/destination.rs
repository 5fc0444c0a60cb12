//! Where a geotagged file ends up and what it is called.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use displaydoc::Display;
use exiftool::Metadata;
use thiserror::Error;

use crate::{
    geocode::GeoAddress,
    metadata::{
        CREATE_DATE_FIELD, DATE_TIME_ORIGINAL_FIELD, EXTENSION_FIELD, MEDIA_CREATE_DATE_FIELD,
    },
};

/// Timestamp fields in order of preference.
pub const TIMESTAMP_FIELDS: [&str; 3] = [
    MEDIA_CREATE_DATE_FIELD,
    CREATE_DATE_FIELD,
    DATE_TIME_ORIGINAL_FIELD,
];

#[derive(Debug, Error, Display, PartialEq, Eq)]
pub enum Error {
    /// unknown naming mode {0:?}, expected `date` or `date+location`
    UnknownNamingMode(String),
    /// metadata has no {0} field
    MissingField(&'static str),
}

/// Which parts make up the new filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameComponents {
    pub include_date: bool,
    pub include_location: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    #[default]
    Date,
    DateLocation,
}

impl NamingMode {
    pub const ALL: [NamingMode; 2] = [NamingMode::Date, NamingMode::DateLocation];

    pub fn as_str(self) -> &'static str {
        match self {
            NamingMode::Date => "date",
            NamingMode::DateLocation => "date+location",
        }
    }

    pub fn components(self) -> NameComponents {
        match self {
            NamingMode::Date => NameComponents {
                include_date: true,
                include_location: false,
            },
            NamingMode::DateLocation => NameComponents {
                include_date: true,
                include_location: true,
            },
        }
    }
}

impl FromStr for NamingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::UnknownNamingMode(s.to_string()))
    }
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    pub directory: PathBuf,
    pub filename: String,
}

impl DestinationPath {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// `<root>/<country>/<state>/...` plus `<date><location>.<extension>`.
pub fn build(
    root: &Path,
    metadata: &Metadata,
    mode: NamingMode,
    address: &GeoAddress,
) -> Result<DestinationPath, Error> {
    let extension = metadata
        .get(EXTENSION_FIELD)
        .ok_or(Error::MissingField(EXTENSION_FIELD))?;
    let components = mode.components();

    let mut stem = String::new();
    if components.include_date {
        let timestamp = metadata
            .get_first(&TIMESTAMP_FIELDS)
            .ok_or(Error::MissingField(CREATE_DATE_FIELD))?;
        stem.push_str(&timestamp.replace(':', "_"));
    }
    if components.include_location {
        // directly after the date, no separator
        stem.push_str(&address.joined());
    }

    let directory = address
        .terms()
        .iter()
        .fold(root.to_path_buf(), |dir, term| dir.join(path_segment(term)));
    Ok(DestinationPath {
        directory,
        filename: path_segment(&format!("{stem}.{extension}")),
    })
}

/// Keeps a name to exactly one path component.
fn path_segment(name: &str) -> String {
    let segment = name.replace(['/', '\\'], "-");
    if segment == "." || segment == ".." {
        segment.replace('.', "_")
    } else {
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(fields: &[(&str, &str)]) -> Metadata {
        fields.iter().copied().collect()
    }

    fn spain_madrid() -> GeoAddress {
        GeoAddress::from_levels(|level| match level {
            "country" => Some("Spain"),
            "city" => Some("Madrid"),
            _ => None,
        })
    }

    #[test]
    fn naming_mode_from_str() {
        assert_eq!("date".parse::<NamingMode>(), Ok(NamingMode::Date));
        assert_eq!("date+location".parse::<NamingMode>(), Ok(NamingMode::DateLocation));
        // matched by equality, not containment
        for unknown in ["location", "date+loc", "DATE", "date+location+x", ""] {
            assert_eq!(
                unknown.parse::<NamingMode>(),
                Err(Error::UnknownNamingMode(unknown.to_string()))
            );
        }
    }

    #[test]
    fn naming_mode_components() {
        assert!(!NamingMode::Date.components().include_location);
        assert!(NamingMode::DateLocation.components().include_location);
        assert_eq!(NamingMode::DateLocation.to_string(), "date+location");
    }

    #[test]
    fn build_date_name() -> anyhow::Result<()> {
        let metadata = metadata(&[
            (CREATE_DATE_FIELD, "2020:01:02 10:00:00"),
            (EXTENSION_FIELD, "jpg"),
        ]);
        let destination = build(
            Path::new("/sorted"),
            &metadata,
            NamingMode::Date,
            &spain_madrid(),
        )?;
        insta::assert_snapshot!(destination.filename.as_str(), @"2020_01_02 10_00_00.jpg");
        assert_eq!(destination.directory, Path::new("/sorted/Spain/Madrid"));
        assert_eq!(
            destination.path(),
            Path::new("/sorted/Spain/Madrid/2020_01_02 10_00_00.jpg")
        );
        Ok(())
    }

    #[test]
    fn build_date_location_name() -> anyhow::Result<()> {
        let metadata = metadata(&[
            (CREATE_DATE_FIELD, "2020:01:02 10:00:00"),
            (EXTENSION_FIELD, "jpg"),
        ]);
        let destination = build(
            Path::new("/sorted"),
            &metadata,
            NamingMode::DateLocation,
            &spain_madrid(),
        )?;
        insta::assert_snapshot!(destination.filename.as_str(), @"2020_01_02 10_00_00Spain Madrid.jpg");
        Ok(())
    }

    #[test]
    fn media_create_date_wins() -> anyhow::Result<()> {
        let metadata = metadata(&[
            (CREATE_DATE_FIELD, "2001:01:01 00:00:00"),
            (MEDIA_CREATE_DATE_FIELD, "2021:07:08 09:10:11"),
            (DATE_TIME_ORIGINAL_FIELD, "1999:01:01 00:00:00"),
            (EXTENSION_FIELD, "mp4"),
        ]);
        let destination = build(
            Path::new("/sorted"),
            &metadata,
            NamingMode::Date,
            &GeoAddress::default(),
        )?;
        assert_eq!(destination.filename, "2021_07_08 09_10_11.mp4");
        assert_eq!(destination.directory, Path::new("/sorted"));
        Ok(())
    }

    #[test]
    fn missing_fields() {
        let no_extension = metadata(&[(CREATE_DATE_FIELD, "2020:01:02 10:00:00")]);
        assert_eq!(
            build(
                Path::new("/sorted"),
                &no_extension,
                NamingMode::Date,
                &spain_madrid()
            ),
            Err(Error::MissingField(EXTENSION_FIELD))
        );
        let no_date = metadata(&[(EXTENSION_FIELD, "jpg")]);
        assert_eq!(
            build(
                Path::new("/sorted"),
                &no_date,
                NamingMode::DateLocation,
                &spain_madrid()
            ),
            Err(Error::MissingField(CREATE_DATE_FIELD))
        );
    }

    #[test]
    fn address_terms_stay_single_segments() -> anyhow::Result<()> {
        let address = GeoAddress::from_levels(|level| match level {
            "country" => Some("Bosnia/Herzegovina"),
            "state" => Some(".."),
            _ => None,
        });
        let metadata = metadata(&[
            (CREATE_DATE_FIELD, "2020:01:02 10:00:00"),
            (EXTENSION_FIELD, "jpg"),
        ]);
        let destination = build(
            Path::new("/sorted"),
            &metadata,
            NamingMode::DateLocation,
            &address,
        )?;
        assert_eq!(
            destination.directory,
            Path::new("/sorted/Bosnia-Herzegovina/__")
        );
        assert_eq!(
            destination.filename,
            "2020_01_02 10_00_00Bosnia-Herzegovina ...jpg"
        );
        Ok(())
    }
}
