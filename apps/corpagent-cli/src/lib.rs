//! corpagent-cli
//!
//! Argument parsing, logging setup and the command implementations behind
//! the `corpagent` binary. Commands write to any `io::Write` so they can be
//! driven from tests.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
