// src/lib.rs

//! Dependency-ordered lifecycle manager.
//!
//! Register named [`UnitDef`]s on a [`Manager`], call [`Manager::run`] once to
//! start them in dependency order, and [`Manager::teardown`] to stop them in
//! reverse.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use initdag::{Manager, UnitDef, WalkOutcome};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let manager: Manager<()> = Manager::new();
//!
//! for (name, deps) in [("api", vec!["db"]), ("db", vec![])] {
//!     let log = Arc::clone(&log);
//!     manager
//!         .register(UnitDef::new(name).after_all(deps).on_start(move |_| {
//!             log.lock().unwrap().push(name);
//!             Ok(())
//!         }))
//!         .unwrap();
//! }
//!
//! assert_eq!(manager.run(&()).unwrap(), WalkOutcome::Started);
//! assert_eq!(*log.lock().unwrap(), ["db", "api"]);
//! manager.teardown();
//! ```
//!
//! The `initdag` binary drives the same manager from a TOML manifest whose
//! units are shell commands; see [`config`] and [`exec`].

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod manager;
pub mod unit;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::Manifest;
use crate::exec::{BootContext, build_manager};

pub use errors::InitdagError;
pub use manager::{Manager, ManagerState, NoopObserver, Observer, TracingObserver, WalkOutcome};
pub use unit::{UnitDef, UnitId, UnitName};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - manager construction
/// - the walk (on a blocking thread, since start actions block)
/// - Ctrl-C handling and teardown
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest_path = PathBuf::from(&args.manifest);
    let manifest = load_and_validate(&manifest_path)
        .with_context(|| format!("loading manifest {}", manifest_path.display()))?;

    let root_dir = manifest_root_dir(&manifest_path);
    let observer = TracingObserver::new(manifest.manager().name.clone());
    let manager = Arc::new(build_manager(&manifest, &root_dir, observer)?);

    if args.dry_run {
        print_dry_run(&manifest, &manager.plan()?);
        return Ok(());
    }

    let ctx = BootContext::new(root_dir);
    let outcome = {
        let manager = Arc::clone(&manager);
        tokio::task::spawn_blocking(move || manager.run(&ctx)).await??
    };

    if let WalkOutcome::Failed { unit, stopped } = outcome {
        bail!(
            "unit '{unit}' failed to start; stopped {} unit(s): {:?}",
            stopped.len(),
            stopped
        );
    }

    info!(units = manager.len(), "all units started");

    if !args.once {
        info!("waiting for Ctrl-C");
        tokio::signal::ctrl_c()
            .await
            .context("listening for Ctrl-C")?;
        info!("shutdown requested");
    }

    tokio::task::spawn_blocking(move || manager.teardown()).await?;
    Ok(())
}

/// Directory unit commands run in.
///
/// - If the manifest path has a non-empty parent, that directory.
/// - For a bare filename like `Initdag.toml`, the current directory.
fn manifest_root_dir(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print units, their dependencies and the realized start order.
fn print_dry_run(manifest: &Manifest, plan: &[UnitName]) {
    println!("initdag dry-run");
    println!("  manager.name = {}", manifest.manager().name);
    println!("  manager.shell = {}", manifest.manager().shell);
    println!();

    println!("units ({}):", manifest.units().len());
    for unit in manifest.units() {
        println!("  - {}", unit.name);
        println!("      start: {}", unit.start);
        if let Some(ref stop) = unit.stop {
            println!("      stop: {stop}");
        }
        if !unit.after.is_empty() {
            println!("      after: {:?}", unit.after);
        }
        if !unit.env.is_empty() {
            println!("      env: {:?}", unit.env);
        }
    }
    println!();

    println!("start order:");
    for (i, name) in plan.iter().enumerate() {
        println!("  {}. {name}", i + 1);
    }

    debug!("dry-run complete (no execution)");
}
