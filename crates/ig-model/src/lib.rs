//! # ig-model
//!
//! Domain models for the identity-governance object model (Identity,
//! Application, Bundle, Certification, etc.).
//!
//! Every persistent entity is a plain record with an [`ObjectHeader`] and
//! implements [`PersistentObject`]. Heterogeneous collections use the
//! closed [`AnyObject`] enum, and [`Visitor`] provides double dispatch
//! over it.
//!
//! ## Entities
//!
//! - [`Identity`], [`Link`], [`Application`], [`ManagedAttribute`]
//! - [`Bundle`] (roles), [`Policy`], [`PolicyViolation`]
//! - [`WorkItem`], [`WorkItemArchive`], [`Certification`]
//! - [`Scope`], [`Server`], [`ServerStatistic`]
//! - [`Rule`], [`TaskDefinition`], [`TaskResult`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod macros;

pub mod any;
pub mod application;
pub mod attributes;
pub mod bundle;
pub mod certification;
pub mod class;
pub mod config_objects;
pub mod csv;
pub mod error;
pub mod identity;
pub mod link;
pub mod managed_attribute;
pub mod object;
pub mod policy;
pub mod reference;
pub mod rule;
pub mod scope;
pub mod server;
pub mod snapshot;
pub mod task;
pub mod visitor;
pub mod work_item;

pub use any::AnyObject;
pub use application::{Application, ApplicationAccountSelectorRule, Feature};
pub use attributes::{AttrValue, Attributes};
pub use bundle::Bundle;
pub use certification::{
    Certification, CertificationPhase, CertificationStatistic, CertificationStatistics,
    CertificationType,
};
pub use class::ObjectClass;
pub use config_objects::{CorrelationConfig, MfaConfig, WindowsShare};
pub use error::{ModelError, ModelResult};
pub use identity::{Identity, RoleMetadata};
pub use link::Link;
pub use managed_attribute::{ManagedAttribute, ManagedAttributeType};
pub use object::{Entity, ObjectHeader, PersistentObject};
pub use policy::{Policy, PolicyViolation, SodConstraint};
pub use reference::Reference;
pub use rule::Rule;
pub use scope::{Scope, ScopePath};
pub use server::{Server, ServerStatistic};
pub use snapshot::{BundleSnapshot, IdentitySnapshot, RoleAssignmentSnapshot};
pub use task::{CompletionStatus, TaskDefinition, TaskResult};
pub use visitor::Visitor;
pub use work_item::{WorkItem, WorkItemArchive, WorkItemState, WorkItemType};
