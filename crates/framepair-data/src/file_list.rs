// Path lists: one frame-file path per line

use std::fs;
use std::path::{Path, PathBuf};

use framepair_core::{Error, Result};

/// Read a path-list file.
///
/// Surrounding whitespace is trimmed and blank lines are skipped, so a
/// trailing newline does not produce an empty entry.
pub fn read_file_list(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_file_list(&content))
}

/// Parse the contents of a path-list file.
pub fn parse_file_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect()
}
