// src/config/mod.rs

//! Unit manifests.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate names and the dependency graph (`validate.rs`).
//!
//! A validated [`Manifest`] is turned into a running manager by
//! [`crate::exec::build_manager`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ManagerSection, Manifest, RawManifest, UnitConfig};
pub use validate::validate_manifest;
