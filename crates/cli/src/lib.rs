//! Demonstration driver for the consistent hash rings.
//!
//! Provides commands for:
//! - Comparing load distribution of the basic and virtual-node rings
//! - Measuring key movement when a node joins or leaves
//! - Sweeping the vnode count to show its effect on load skew

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::{CliConfig, OutputFormat};
