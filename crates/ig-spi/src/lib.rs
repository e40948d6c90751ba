//! # ig-spi
//!
//! Extension points for the identity-governance object model.
//!
//! Rules and tasks are stored as data; this crate defines how they run.
//!
//! ## Design
//!
//! - [`RuleRunner`] - runs a stored [`ig_model::Rule`]; [`RuleLibrary`] backs
//!   rule names with native functions
//! - [`TaskExecutor`] - runs a [`ig_model::TaskDefinition`] and fills in a
//!   [`ig_model::TaskResult`]
//! - [`ExecutorRegistry`] - maps executor names to implementations and runs
//!   definitions
//! - [`TaskContext`] - the store, rule runner and launcher a run works with

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builtin;
pub mod context;
pub mod error;
pub mod executor;
pub mod registry;
pub mod rule;

pub use builtin::PruneWorkItemsExecutor;
pub use context::TaskContext;
pub use error::{SpiError, SpiResult};
pub use executor::TaskExecutor;
pub use registry::ExecutorRegistry;
pub use rule::{RuleFn, RuleLibrary, RuleRunner};
