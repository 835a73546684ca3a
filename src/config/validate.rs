// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{Manifest, RawManifest};
use crate::dag::DagGraph;
use crate::errors::{InitdagError, Result};

impl TryFrom<RawManifest> for Manifest {
    type Error = InitdagError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.manager, raw.unit))
    }
}

/// Semantic checks on a raw manifest.
pub fn validate_manifest(raw: &RawManifest) -> Result<()> {
    ensure_has_units(raw)?;
    validate_manager_section(raw)?;
    validate_unit_names(raw)?;
    validate_unit_graph(raw)?;
    Ok(())
}

fn ensure_has_units(raw: &RawManifest) -> Result<()> {
    if raw.unit.is_empty() {
        return Err(InitdagError::ManifestError(
            "manifest must contain at least one [[unit]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_manager_section(raw: &RawManifest) -> Result<()> {
    if raw.manager.shell.trim().is_empty() {
        return Err(InitdagError::ManifestError(
            "[manager].shell must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_unit_names(raw: &RawManifest) -> Result<()> {
    let mut seen = HashSet::new();

    for unit in raw.unit.iter() {
        if unit.name.trim().is_empty() {
            return Err(InitdagError::ManifestError(
                "every [[unit]] needs a non-empty `name`".to_string(),
            ));
        }
        if unit.start.trim().is_empty() {
            return Err(InitdagError::ManifestError(format!(
                "unit '{}' has an empty `start` command",
                unit.name
            )));
        }
        if !seen.insert(unit.name.as_str()) {
            return Err(InitdagError::DuplicateUnit(unit.name.clone()));
        }
    }
    Ok(())
}

fn validate_unit_graph(raw: &RawManifest) -> Result<()> {
    let graph = DagGraph::from_units(
        raw.unit
            .iter()
            .map(|unit| (unit.name.as_str(), unit.after.as_slice())),
    );

    graph.validate().map_err(|err| match err {
        InitdagError::UnresolvedDependency { unit, dependency } => {
            InitdagError::ManifestError(format!(
                "unit '{}' has unknown dependency '{}' in `after`",
                unit, dependency
            ))
        }
        other => other,
    })
}
