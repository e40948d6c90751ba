//! # ig-storage
//!
//! Storage for the identity-governance object model.
//!
//! This crate defines the store interfaces and an in-memory
//! implementation that can be persisted to a JSON file.
//!
//! ## Components
//!
//! - [`Resolver`] - lookup by class and id or name
//! - [`ReferenceResolver`] - resolves loose references with id-then-name fallback
//! - [`ObjectStore`] - save, remove, list, count and find
//! - [`InMemoryStore`] - concurrent in-memory store with snapshot files
//! - [`Terminator`] - deletes objects and prunes references to them
//! - [`AuditLog`] - sink for the audit events stores produce

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod audit;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod store;
pub mod terminator;

pub use audit::{AuditLog, InMemoryAuditLog, TracingAuditLog};
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryStore, StoreSnapshot};
pub use resolver::{ReferenceResolver, Resolver};
pub use store::ObjectStore;
pub use terminator::Terminator;
