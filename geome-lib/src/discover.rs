use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use slog::{warn, Logger};
use walkdir::WalkDir;

pub const DEFAULT_PATTERN: &str = "**/*";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Every entry under `root` whose relative path matches `pattern`, files and
/// directories alike, in file name order per directory.
///
/// Unreadable entries are logged and skipped.
pub fn discover(
    root: &Path,
    pattern: &str,
    logger: &Logger,
) -> Result<impl Iterator<Item = PathBuf>, PatternError> {
    let pattern = Pattern::new(pattern)?;
    let root = root.to_path_buf();
    let logger = logger.clone();
    Ok(WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let relative = entry.path().strip_prefix(&root).ok()?;
                pattern
                    .matches_path_with(relative, MATCH_OPTIONS)
                    .then(|| entry.into_path())
            }
            Err(e) => {
                warn!(logger, "skipping unreadable entry"; "error" => %e);
                None
            }
        }))
}
