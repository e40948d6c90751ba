//! Import command implementation.

use std::path::Path;

use ig_model::AnyObject;
use ig_storage::{ObjectStore, Resolver};
use tracing::info;

use crate::cli::ImportArgs;
use crate::output::{success, warning};
use crate::CliResult;

use super::Session;

/// Import statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    /// Objects that did not exist before.
    pub created: u32,
    /// Existing objects that were replaced.
    pub updated: u32,
    /// Existing objects left alone.
    pub skipped: u32,
}

/// Runs the import command.
pub async fn run_import(args: ImportArgs, session: &Session) -> CliResult<()> {
    let stats = import_file(session, &args.file, args.skip_existing).await?;
    session.commit()?;

    success(&format!("Imported '{}'", args.file.display()));
    println!("  Created: {}", stats.created);
    println!("  Updated: {}", stats.updated);
    if stats.skipped > 0 {
        warning(&format!("{} existing object(s) skipped", stats.skipped));
    }
    Ok(())
}

/// Reads every object in an XML file and saves it.
///
/// An object matching a stored one by id, or by unique name or unique key
/// when its id is absent or unknown here, replaces it and keeps the stored
/// id.
pub async fn import_file(session: &Session, path: &Path, skip_existing: bool) -> CliResult<ImportStats> {
    let content = std::fs::read_to_string(path)?;
    let objects = session.codec().parse_objects(&content)?;
    info!(path = %path.display(), objects = objects.len(), "Importing objects");

    let mut stats = ImportStats::default();
    for object in objects {
        import_object(session, object, skip_existing, &mut stats).await?;
    }
    Ok(stats)
}

async fn import_object(
    session: &Session,
    mut object: AnyObject,
    skip_existing: bool,
    stats: &mut ImportStats,
) -> CliResult<()> {
    let store = session.store();
    let class = object.object_class();

    let by_id = match object.id() {
        Some(id) => store.get_object_by_id(class, id).await?,
        None => None,
    };
    let existing = match by_id {
        Some(found) => Some(found),
        None => find_existing(session, &object).await?,
    };

    match existing {
        Some(_) if skip_existing => {
            stats.skipped += 1;
            return Ok(());
        }
        Some(current) => {
            object.as_persistent_mut().header_mut().id = current.id().map(ToString::to_string);
            object.as_persistent_mut().header_mut().created = current.as_persistent().header().created;
            stats.updated += 1;
        }
        None => stats.created += 1,
    }

    store.save(object).await?;
    Ok(())
}

async fn find_existing(session: &Session, object: &AnyObject) -> CliResult<Option<AnyObject>> {
    let store = session.store();
    let class = object.object_class();
    let persistent = object.as_persistent();

    if let Some(name) = object.name().filter(|_| persistent.is_name_unique()) {
        return Ok(store.get_object_by_name(class, name).await?);
    }
    let Some(key) = persistent.unique_key() else {
        return Ok(None);
    };
    let same_key = move |o: &AnyObject| o.as_persistent().unique_key().as_deref() == Some(key.as_str());
    Ok(store.find(class, &same_key).await?.into_iter().next())
}
