//! # ig-core
//!
//! Core utilities, configuration, and error handling for the
//! identity-governance object model.
//!
//! This crate provides foundational types shared by every other crate in
//! the workspace. It deliberately has no dependency on the entity model so
//! that storage backends, codecs and tools can all agree on error and
//! audit vocabulary.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{AuditAction, AuditEvent, AuditOutcome};
