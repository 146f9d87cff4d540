use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::FsError;

#[must_use]
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

/// True for regular files, following symlinks (`test -f` semantics).
#[must_use]
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file())
}

/// Read a whole file into memory.
///
/// # Errors
/// Returns `FsError::Read` when the file cannot be opened or read.
pub fn read_to_bytes(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).map_err(|source| FsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole UTF-8 file into a string.
///
/// # Errors
/// Returns `FsError::Read` when the file cannot be read or is not valid UTF-8.
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).map_err(|source| FsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and decode a TOML document.
///
/// # Errors
/// Returns `FsError::Read` on I/O failure and `FsError::Toml` when decoding fails.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, FsError> {
    let data = read_to_string(path)?;
    toml::from_str(&data).map_err(|source| FsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
