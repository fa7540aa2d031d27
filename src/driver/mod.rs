//! Command-line collaborator: turns flags into a register description,
//! renders it, and reports failures.

pub mod cli;

pub use self::cli::{CliArgs, CliDriver, CliError, DriverConfig, DriverResult, parse_section};
