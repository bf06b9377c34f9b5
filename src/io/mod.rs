//! CSV and JSON adapters around the I/O-free core.

pub mod consumption;
pub mod export;
pub mod factor_dir;
pub mod holidays;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Deserializes every row of a headed CSV stream.
pub(crate) fn read_rows<T: DeserializeOwned>(
    reader: impl Read,
    origin: &str,
) -> Result<Vec<T>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize()
        .map(|row| row.map_err(|e| LoadError::csv(origin, e)))
        .collect()
}

/// Opens `path` and reads its rows.
pub(crate) fn read_rows_from_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    read_rows(file, &path.display().to_string())
}
