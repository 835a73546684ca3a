// src/unit/mod.rs

//! Units of initialization work.
//!
//! - [`definition`] holds the builder callers use to describe a unit.
//! - [`record`] holds the arena entry a manager keeps once it is registered.

pub mod definition;
pub mod record;

pub use definition::{StartFn, StopFn, UnitDef};
pub use record::UnitId;
pub(crate) use record::Unit;

/// Unit names are plain strings.
pub type UnitName = String;
