// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Unit manifest exactly as read from TOML, before semantic checks.
///
/// ```toml
/// [manager]
/// name = "boot"
///
/// [[unit]]
/// name = "db"
/// start = "./db.sh start"
/// stop = "./db.sh stop"
///
/// [[unit]]
/// name = "api"
/// start = "./api.sh"
/// after = ["db"]
/// ```
///
/// Units are an array of tables so that declaration order is registration
/// order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub manager: ManagerSection,

    #[serde(default)]
    pub unit: Vec<UnitConfig>,
}

/// A manifest that passed validation. Construct it with
/// `Manifest::try_from(raw)` or [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct Manifest {
    manager: ManagerSection,
    units: Vec<UnitConfig>,
}

impl Manifest {
    /// Only for use after validation.
    pub(crate) fn new_unchecked(manager: ManagerSection, units: Vec<UnitConfig>) -> Self {
        Self { manager, units }
    }

    pub fn manager(&self) -> &ManagerSection {
        &self.manager
    }

    /// Units in declaration order.
    pub fn units(&self) -> &[UnitConfig] {
        &self.units
    }
}

/// `[manager]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerSection {
    /// Subsystem name used in log output.
    #[serde(default = "default_manager_name")]
    pub name: String,

    /// Shell used to run `start` / `stop` commands.
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_manager_name() -> String {
    "initdag".to_string()
}

fn default_shell() -> String {
    if cfg!(windows) {
        "cmd".to_string()
    } else {
        "sh".to_string()
    }
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            name: default_manager_name(),
            shell: default_shell(),
        }
    }
}

/// One `[[unit]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub name: String,

    /// Command whose zero exit status means the unit started.
    pub start: String,

    /// Command run when the unit is unwound. Its exit status is only logged.
    #[serde(default)]
    pub stop: Option<String>,

    /// Units that must start first.
    #[serde(default)]
    pub after: Vec<String>,

    /// Extra environment for both commands.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
