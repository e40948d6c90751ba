//! # ig-cli
//!
//! The `igc` console for the identity-governance object model.
//!
//! This crate provides command-line utilities for:
//! - Importing and exporting objects as XML
//! - Listing, showing and resolving stored objects
//! - Deleting objects with reference pruning
//! - Certification statistics
//! - Running task definitions through the executor registry
//!
//! The object store lives in a JSON snapshot file named by the
//! configuration (`~/.idgov/igc.toml`).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use commands::Session;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
