//! CLI module for the session sync timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;

pub use commands::{BreakArgs, Cli, Commands, StartArgs};
pub use display::Display;
