// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Read a manifest from `path` without semantic validation.
///
/// Use [`load_and_validate`] unless you are testing the validator itself.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

pub fn parse_str(contents: &str) -> Result<RawManifest> {
    let manifest: RawManifest = toml::from_str(contents)?;
    Ok(manifest)
}

/// Read and validate a manifest.
///
/// Checks for:
/// - at least one unit,
/// - unique, non-empty unit names and non-empty start commands,
/// - unknown or self-referencing `after` entries,
/// - dependency cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}
