//! Elizao CLI library.
//!
//! Argument parsing lives in [`cli`]; each subcommand is handled in
//! [`commands`].

pub mod cli;
pub mod commands;
