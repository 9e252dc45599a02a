//! Line-oriented text normalization commands.
//!
//! Four commands (`join-lines`, `remove-empty-lines`,
//! `remove-consecutive-empty-lines`, `trim-leading-trailing-spaces`) run
//! against the selection of a [`TextSource`], falling back to the whole
//! document when nothing is selected.

pub mod commands;
pub mod config;
pub mod runner;
pub mod source;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_utils;

pub use commands::{Applied, Command, Registry, Scope, run as run_command};
pub use config::Config;
pub use source::{Document, LineRange, TextSource};
