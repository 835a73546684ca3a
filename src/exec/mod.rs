// src/exec/mod.rs

//! Command execution for manifest units.
//!
//! - [`command`] runs a single start/stop command through the configured
//!   shell, synchronously, because start actions are synchronous.
//! - [`units`] wires a validated manifest into a [`crate::Manager`].

pub mod command;
pub mod units;

pub use command::ShellCommand;
pub use units::{BootContext, build_manager};
