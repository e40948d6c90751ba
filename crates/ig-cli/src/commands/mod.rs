//! Command implementations.
//!
//! Every command runs against a [`Session`]: the object store file named
//! by the configuration, loaded on open and written back by
//! [`Session::commit`] when autosave is on.

pub mod config;
pub mod delete;
pub mod export;
pub mod import;
pub mod query;
pub mod task;

pub use config::run_config;
pub use delete::run_delete;
pub use export::run_export;
pub use import::run_import;
pub use query::{run_count, run_get, run_list, run_resolve, run_stats};
pub use task::run_task;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ig_model::{AnyObject, ObjectClass};
use ig_storage::{InMemoryStore, Resolver};
use ig_xml::XmlCodec;
use tracing::debug;

use crate::{CliConfig, CliError, CliResult};

/// An open object store plus the settings commands need.
#[derive(Debug)]
pub struct Session {
    store: Arc<InMemoryStore>,
    path: PathBuf,
    autosave: bool,
    codec: XmlCodec,
    user: String,
}

impl Session {
    /// Opens the store named by `config`, or by `store_override`.
    pub fn open(config: &CliConfig, store_override: Option<&Path>) -> CliResult<Self> {
        let core = config.core();
        let path = store_override.map_or_else(|| core.storage.path.clone(), Path::to_path_buf);

        let store = InMemoryStore::open(&path, &core.storage)?;
        store.set_source(config.user.as_str());
        debug!(path = %path.display(), user = %config.user, "Opened session");

        Ok(Self {
            store: Arc::new(store),
            path,
            autosave: core.storage.autosave,
            codec: XmlCodec::from_config(&core.xml),
            user: config.user.clone(),
        })
    }

    /// Returns the store.
    #[must_use]
    pub const fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    /// Returns the XML codec.
    #[must_use]
    pub const fn codec(&self) -> &XmlCodec {
        &self.codec
    }

    /// Returns the acting user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks an object up by id, then by name.
    pub async fn find(&self, class: ObjectClass, key: &str) -> CliResult<Option<AnyObject>> {
        if let Some(found) = self.store.get_object_by_id(class, key).await? {
            return Ok(Some(found));
        }
        Ok(self.store.get_object_by_name(class, key).await?)
    }

    /// Looks an object up by id or name, failing if it doesn't exist.
    pub async fn require(&self, class: ObjectClass, key: &str) -> CliResult<AnyObject> {
        self.find(class, key)
            .await?
            .ok_or_else(|| CliError::not_found(class.as_str(), key))
    }

    /// Writes the store back to its file when autosave is on.
    pub fn commit(&self) -> CliResult<()> {
        if self.autosave {
            self.store.save_to(&self.path)?;
        } else {
            debug!(path = %self.path.display(), "Autosave off; store not written");
        }
        Ok(())
    }
}

/// Parses a class argument, simple or fully qualified.
pub fn parse_class(name: &str) -> CliResult<ObjectClass> {
    ObjectClass::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = ObjectClass::ALL.iter().map(|c| c.as_str()).collect();
        CliError::InvalidArgument(format!(
            "unknown class '{name}' (expected one of: {})",
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_parse_loosely() {
        assert_eq!(parse_class("identity").unwrap(), ObjectClass::Identity);
        assert_eq!(parse_class("sailpoint.object.Bundle").unwrap(), ObjectClass::Bundle);
        let err = parse_class("Realm").unwrap_err().to_string();
        assert!(err.contains("Identity"));
    }
}
