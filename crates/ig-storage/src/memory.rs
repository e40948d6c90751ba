//! In-memory object store.
//!
//! Objects live in one table per class. Each table keeps a name index for
//! classes with unique names and a unique-key index for classes identified
//! by a property tuple (links, managed attributes). The whole store can be
//! written to and read from a JSON [`StoreSnapshot`] so that command-line
//! tools can keep state between runs.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ig_core::config::StorageConfig;
use ig_core::event::SYSTEM_SOURCE;
use ig_core::AuditAction;
use ig_model::{AnyObject, ObjectClass};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::audit::{object_event, AuditLog, TracingAuditLog};
use crate::error::{StorageError, StorageResult};
use crate::resolver::Resolver;
use crate::store::{ObjectFilter, ObjectStore};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Default)]
struct ClassTable {
    /// Objects by id.
    objects: HashMap<String, AnyObject>,
    /// Unique name to id.
    names: HashMap<String, String>,
    /// Unique key to id.
    keys: HashMap<String, String>,
}

impl ClassTable {
    fn unindex(&mut self, object: &AnyObject) {
        let obj = object.as_persistent();
        if let Some(name) = obj.name() {
            if self.names.get(name).map(String::as_str) == obj.id() {
                self.names.remove(name);
            }
        }
        if let Some(key) = obj.unique_key() {
            if self.keys.get(&key).map(String::as_str) == obj.id() {
                self.keys.remove(&key);
            }
        }
    }

    fn index(&mut self, object: &AnyObject, id: &str) {
        let obj = object.as_persistent();
        if obj.is_name_unique() {
            if let Some(name) = obj.name() {
                self.names.insert(name.to_string(), id.to_string());
            }
        }
        if let Some(key) = obj.unique_key() {
            self.keys.insert(key, id.to_string());
        }
    }
}

/// Serialized form of a whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Every stored object.
    pub objects: Vec<AnyObject>,
}

/// Object store backed by concurrent hash maps.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: DashMap<ObjectClass, ClassTable>,
    enforce_unique_names: bool,
    source: RwLock<String>,
    audit: Arc<dyn AuditLog>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store that audits to `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            enforce_unique_names: true,
            source: RwLock::new(SYSTEM_SOURCE.to_string()),
            audit: Arc::new(TracingAuditLog::new()),
        }
    }

    /// Creates an empty store configured from `config`.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new().with_unique_names(config.enforce_unique_names)
    }

    /// Sets whether unique names are enforced.
    #[must_use]
    pub const fn with_unique_names(mut self, enforce: bool) -> Self {
        self.enforce_unique_names = enforce;
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the name recorded as the source of audit events.
    pub fn set_source(&self, source: impl Into<String>) {
        *self.source.write() = source.into();
    }

    fn source(&self) -> String {
        self.source.read().clone()
    }

    fn save_sync(&self, mut object: AnyObject) -> StorageResult<AnyObject> {
        let class = object.object_class();
        let now = Utc::now();
        let mut table = self.tables.entry(class).or_default();

        let id = match object.id() {
            Some(id) => id.to_string(),
            None => Uuid::now_v7().simple().to_string(),
        };

        let obj = object.as_persistent();
        if self.enforce_unique_names && obj.is_name_unique() {
            if let Some(name) = obj.name() {
                if table.names.get(name).is_some_and(|owner| *owner != id) {
                    return Err(StorageError::duplicate(class, "name", name));
                }
            }
        }
        if let Some(key) = obj.unique_key() {
            if table.keys.get(&key).is_some_and(|owner| *owner != id) {
                return Err(StorageError::duplicate(class, "uniqueKey", key));
            }
        }

        let previous = table.objects.remove(&id);
        let action = if previous.is_some() {
            AuditAction::Update
        } else {
            AuditAction::Create
        };

        let header = object.as_persistent_mut().header_mut();
        header.set_id(Some(id.clone()));
        match &previous {
            Some(prev) => {
                header.created = header.created.or(prev.as_persistent().header().created);
                header.modified = Some(now);
            }
            None => {
                header.created = header.created.or(Some(now));
            }
        }

        if let Some(prev) = &previous {
            table.unindex(prev);
        }
        table.index(&object, &id);
        table.objects.insert(id.clone(), object.clone());
        drop(table);

        debug!(class = %class, id = %id, action = action.as_str(), "Saved object");
        self.audit
            .record(object_event(action, object.as_persistent(), &self.source()));
        Ok(object)
    }

    fn remove_sync(&self, class: ObjectClass, id: &str) -> StorageResult<AnyObject> {
        let removed = {
            let mut table = self
                .tables
                .get_mut(&class)
                .ok_or_else(|| StorageError::not_found(class, id))?;
            let removed = table
                .objects
                .remove(id)
                .ok_or_else(|| StorageError::not_found(class, id))?;
            table.unindex(&removed);
            removed
        };

        debug!(class = %class, id, "Removed object");
        self.audit.record(object_event(
            AuditAction::Delete,
            removed.as_persistent(),
            &self.source(),
        ));
        Ok(removed)
    }

    fn list_sync(&self, class: ObjectClass) -> Vec<AnyObject> {
        let mut objects: Vec<AnyObject> = self
            .tables
            .get(&class)
            .map(|table| table.objects.values().cloned().collect())
            .unwrap_or_default();
        objects.sort_by(|a, b| (a.name(), a.id()).cmp(&(b.name(), b.id())));
        objects
    }

    /// Takes a snapshot of every stored object.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let objects = ObjectClass::ALL
            .into_iter()
            .flat_map(|class| self.list_sync(class))
            .collect();
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            objects,
        }
    }

    /// Replaces the store contents with a snapshot. No audit events are
    /// recorded.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` for an unsupported version or an
    /// object without an id, and `StorageError::Duplicate` if two objects
    /// collide.
    pub fn restore(&self, snapshot: StoreSnapshot) -> StorageResult<()> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StorageError::InvalidData(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut tables: HashMap<ObjectClass, ClassTable> = HashMap::new();
        for object in snapshot.objects {
            let class = object.object_class();
            let id = object
                .id()
                .ok_or_else(|| StorageError::InvalidData(format!("{object} has no id")))?
                .to_string();
            let table = tables.entry(class).or_default();
            if table.objects.contains_key(&id) {
                return Err(StorageError::duplicate(class, "id", id));
            }
            let obj = object.as_persistent();
            if self.enforce_unique_names && obj.is_name_unique() {
                if let Some(name) = obj.name() {
                    if table.names.contains_key(name) {
                        return Err(StorageError::duplicate(class, "name", name));
                    }
                }
            }
            table.index(&object, &id);
            table.objects.insert(id, object);
        }

        self.tables.clear();
        for (class, table) in tables {
            self.tables.insert(class, table);
        }
        Ok(())
    }

    /// Loads a store from a snapshot file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> StorageResult<Self> {
        let store = Self::new();
        store.reload(path)?;
        Ok(store)
    }

    /// Replaces the store contents with a snapshot file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn reload(&self, path: &Path) -> StorageResult<()> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        let count = snapshot.objects.len();
        self.restore(snapshot)?;
        info!(path = %path.display(), objects = count, "Loaded object store");
        Ok(())
    }

    /// Loads the store at `path` if the file exists, otherwise returns an
    /// empty store.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path, config: &StorageConfig) -> StorageResult<Self> {
        let store = Self::from_config(config);
        if path.exists() {
            store.reload(path)?;
        }
        Ok(store)
    }

    /// Writes a snapshot file. The file is written beside its final
    /// location and renamed into place.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        info!(path = %path.display(), objects = snapshot.objects.len(), "Saved object store");
        Ok(())
    }
}

#[async_trait]
impl Resolver for InMemoryStore {
    async fn get_object_by_id(
        &self,
        class: ObjectClass,
        id: &str,
    ) -> StorageResult<Option<AnyObject>> {
        Ok(self
            .tables
            .get(&class)
            .and_then(|table| table.objects.get(id).cloned()))
    }

    async fn get_object_by_name(
        &self,
        class: ObjectClass,
        name: &str,
    ) -> StorageResult<Option<AnyObject>> {
        let Some(table) = self.tables.get(&class) else {
            return Ok(None);
        };
        if let Some(found) = table.names.get(name).and_then(|id| table.objects.get(id)) {
            return Ok(Some(found.clone()));
        }
        // Classes without unique names are not indexed; take the lowest id.
        Ok(table
            .objects
            .values()
            .filter(|obj| obj.name() == Some(name))
            .min_by(|a, b| a.id().cmp(&b.id()))
            .cloned())
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn save(&self, object: AnyObject) -> StorageResult<AnyObject> {
        self.save_sync(object)
    }

    async fn remove(&self, class: ObjectClass, id: &str) -> StorageResult<AnyObject> {
        self.remove_sync(class, id)
    }

    async fn list(&self, class: ObjectClass) -> StorageResult<Vec<AnyObject>> {
        Ok(self.list_sync(class))
    }

    async fn count(&self, class: ObjectClass) -> StorageResult<usize> {
        Ok(self.tables.get(&class).map_or(0, |table| table.objects.len()))
    }

    async fn find(&self, class: ObjectClass, filter: ObjectFilter<'_>) -> StorageResult<Vec<AnyObject>> {
        Ok(self
            .list_sync(class)
            .into_iter()
            .filter(|obj| filter(obj))
            .collect())
    }

    fn audit_log(&self) -> Arc<dyn AuditLog> {
        Arc::clone(&self.audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditLog;
    use crate::store::{get_by_name, list_of, save_typed};
    use ig_model::{Bundle, Identity, Link, Reference};

    fn audited() -> (InMemoryStore, Arc<InMemoryAuditLog>) {
        let log = Arc::new(InMemoryAuditLog::new());
        let store = InMemoryStore::new().with_audit_log(log.clone());
        (store, log)
    }

    #[tokio::test]
    async fn save_assigns_id_and_timestamps() {
        let (store, log) = audited();
        let saved = save_typed(&store, Identity::new("jsmith")).await.unwrap();

        let id = saved.header.id.clone().unwrap();
        assert_eq!(id.len(), 32);
        assert!(saved.header.created.is_some());
        assert!(saved.header.modified.is_none());

        let updated = save_typed(&store, saved.clone().with_email("j@example.com"))
            .await
            .unwrap();
        assert_eq!(updated.header.id.as_deref(), Some(id.as_str()));
        assert_eq!(updated.header.created, saved.header.created);
        assert!(updated.header.modified.is_some());

        let actions: Vec<_> = log.events().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::Create, AuditAction::Update]);
    }

    #[tokio::test]
    async fn unique_names_are_enforced() {
        let store = InMemoryStore::new();
        store.save(Bundle::new("Employee").into()).await.unwrap();
        let err = store.save(Bundle::new("Employee").into()).await.unwrap_err();
        assert!(err.is_duplicate());

        // Same name in another class is fine.
        store.save(Identity::new("Employee").into()).await.unwrap();
        assert_eq!(store.count(ObjectClass::Bundle).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unique_names_can_be_disabled() {
        let store = InMemoryStore::new().with_unique_names(false);
        store.save(Bundle::new("Employee").into()).await.unwrap();
        store.save(Bundle::new("Employee").into()).await.unwrap();
        assert_eq!(store.count(ObjectClass::Bundle).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rename_frees_old_name() {
        let store = InMemoryStore::new();
        let mut role = save_typed(&store, Bundle::new("Old")).await.unwrap();
        role.header.set_name(Some("New".into()));
        save_typed(&store, role).await.unwrap();

        store.save(Bundle::new("Old").into()).await.unwrap();
        assert!(get_by_name::<Bundle, _>(&store, "New").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn links_are_unique_by_key() {
        let store = InMemoryStore::new();
        let ldap = Reference::by_name(ObjectClass::Application, "LDAP");
        store
            .save(Link::new("uid=jsmith").with_application(ldap.clone()).into())
            .await
            .unwrap();

        let err = store
            .save(Link::new("uid=jsmith").with_application(ldap.clone()).into())
            .await
            .unwrap_err();
        assert!(err.is_duplicate());

        store
            .save(Link::new("uid=amy").with_application(ldap).into())
            .await
            .unwrap();
        assert_eq!(list_of::<Link, _>(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn remove_and_not_found() {
        let (store, log) = audited();
        let saved = store.save(Identity::new("jsmith").into()).await.unwrap();
        let id = saved.id().unwrap().to_string();

        let removed = store.remove(ObjectClass::Identity, &id).await.unwrap();
        assert_eq!(removed.name(), Some("jsmith"));
        assert!(store
            .get_object_by_name(ObjectClass::Identity, "jsmith")
            .await
            .unwrap()
            .is_none());

        let err = store.remove(ObjectClass::Identity, &id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(log.events_for(AuditAction::Delete).len(), 1);
    }

    #[tokio::test]
    async fn find_and_list_order() {
        let store = InMemoryStore::new();
        for name in ["carol", "alice", "bob"] {
            let identity = Identity::new(name);
            store.save(identity.into()).await.unwrap();
        }

        let names: Vec<_> = store
            .list(ObjectClass::Identity)
            .await
            .unwrap()
            .iter()
            .map(|o| o.name().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);

        let starts_with_b = |obj: &AnyObject| obj.name().is_some_and(|n| n.starts_with('b'));
        let found = store.find(ObjectClass::Identity, &starts_with_b).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = InMemoryStore::new();
        store.save(Identity::new("jsmith").into()).await.unwrap();
        store.save(Bundle::new("Employee").into()).await.unwrap();
        store.save_to(&path).unwrap();

        let loaded = InMemoryStore::load_from(&path).unwrap();
        assert_eq!(loaded.count(ObjectClass::Identity).await.unwrap(), 1);
        let role = loaded
            .get_object_by_name(ObjectClass::Bundle, "Employee")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(role.as_persistent().object_class(), ObjectClass::Bundle);

        // Indexes are rebuilt on load.
        assert!(loaded.save(Bundle::new("Employee").into()).await.is_err());
    }

    #[test]
    fn open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::open(&dir.path().join("none.json"), &StorageConfig::default())
            .unwrap();
        assert!(store.snapshot().objects.is_empty());
    }

    #[test]
    fn restore_rejects_objects_without_id() {
        let store = InMemoryStore::new();
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            objects: vec![Identity::new("x").into()],
        };
        let err = store.restore(snapshot).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }
}
