//! CLI Module Organization
//!
//! - args: argument structures
//! - commands: command execution
//! - output: printing discovered paths and loaded exports

pub mod args;
pub mod commands;
pub mod output;

pub use args::*;
pub use commands::*;
