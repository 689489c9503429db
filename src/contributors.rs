//! Contributor list reading
//!
//! `CONTRIBUTORS` holds one name per line in attribution order.

use crate::error::BuildError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Default contributors file, relative to the build root
pub const CONTRIBUTORS_FILE: &str = "CONTRIBUTORS";

/// Read contributors, trimming each line.
///
/// Blank lines are kept as empty strings so the list length always matches
/// the file's line count.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the file cannot be opened or read.
pub fn read_contributors(path: &Path) -> Result<Vec<String>, BuildError> {
    let not_found = |source| BuildError::ResourceNotFound {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(not_found)?;
    let mut contributors = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(not_found)?;
        contributors.push(line.trim().to_string());
    }

    Ok(contributors)
}
