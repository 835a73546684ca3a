// src/errors.rs

//! Crate-wide error type.
//!
//! Every variant is a configuration or programming defect. A unit whose start
//! action fails is *not* an error here; the walk reports it through
//! [`crate::manager::WalkOutcome::Failed`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitdagError {
    #[error("Duplicate unit name: '{0}'")]
    DuplicateUnit(String),

    #[error("Unit '{0}' registered after the walk started")]
    RegisterAfterRun(String),

    #[error("Manager already ran; run may only be called once")]
    AlreadyRun,

    #[error("Unit '{unit}' depends on unregistered unit '{dependency}'")]
    UnresolvedDependency { unit: String, dependency: String },

    #[error("Unit '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Cycle detected in unit graph involving: {}", .units.join(", "))]
    DependencyCycle { units: Vec<String> },

    #[error("Manager lock poisoned by a panicking unit action")]
    Poisoned,

    #[error("Manager is busy with a walk or teardown")]
    Busy,

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InitdagError {
    /// Names of the units this defect is about, for diagnostics.
    pub fn offending_units(&self) -> Vec<&str> {
        match self {
            InitdagError::DuplicateUnit(name)
            | InitdagError::RegisterAfterRun(name)
            | InitdagError::SelfDependency(name) => vec![name.as_str()],
            InitdagError::UnresolvedDependency { unit, dependency } => {
                vec![unit.as_str(), dependency.as_str()]
            }
            InitdagError::DependencyCycle { units } => units.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InitdagError>;
