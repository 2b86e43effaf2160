//! Command-line interface.
//!
//! `args` holds the clap definitions, `commands` the handlers. `main`
//! parses, installs logging and hands over to [`run`].

pub mod args;
mod commands;

pub use args::{Cli, Command};
pub use commands::run;
