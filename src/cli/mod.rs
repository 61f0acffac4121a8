//! Command line interface

pub mod commands;
pub mod display;
pub mod maintenance;

pub use commands::{CliArgs, Commands};
