// src/exec/units.rs

//! Turning a validated manifest into registered units.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{Manifest, UnitConfig};
use crate::errors::Result;
use crate::exec::command::ShellCommand;
use crate::manager::{Manager, Observer};
use crate::unit::UnitDef;

/// Arguments shared by every manifest unit's start action.
#[derive(Debug, Clone)]
pub struct BootContext {
    /// Working directory for unit commands (the manifest's directory).
    pub root_dir: PathBuf,
}

impl BootContext {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

/// Register one command-backed unit per manifest entry, in declaration order.
///
/// Stop commands run in `stop_dir`; a stop action takes no arguments, so the
/// directory is fixed here rather than taken from the [`BootContext`].
pub fn build_manager(
    manifest: &Manifest,
    stop_dir: &Path,
    observer: impl Observer + 'static,
) -> Result<Manager<BootContext>> {
    let manager = Manager::with_observer(observer).named(manifest.manager().name.clone());

    for unit in manifest.units() {
        manager.register(command_unit(unit, &manifest.manager().shell, stop_dir))?;
    }

    Ok(manager)
}

fn command_unit(cfg: &UnitConfig, shell: &str, stop_dir: &Path) -> UnitDef<BootContext> {
    let start = ShellCommand::new(&cfg.name, shell, &cfg.start, cfg.env.clone());
    let unit_name = cfg.name.clone();

    let mut def = UnitDef::new(&cfg.name)
        .after_all(cfg.after.iter().cloned())
        .on_start(move |ctx: &BootContext| {
            start
                .run(&ctx.root_dir)
                .with_context(|| format!("starting unit '{unit_name}'"))
        });

    if let Some(line) = &cfg.stop {
        let stop = ShellCommand::new(&cfg.name, shell, line, cfg.env.clone());
        let dir = stop_dir.to_path_buf();
        def = def.on_stop(move || stop.run_logged(&dir));
    }

    def
}
