//! Delete command implementation.

use ig_model::Reference;
use ig_storage::Terminator;
use tracing::info;

use crate::cli::DeleteArgs;
use crate::output::{confirm, success};
use crate::{CliError, CliResult};

use super::{parse_class, Session};

/// Runs the delete command.
pub async fn run_delete(args: DeleteArgs, session: &Session) -> CliResult<()> {
    let class = parse_class(&args.object.class)?;
    let object = session.require(class, &args.object.id).await?;

    if !args.force && !confirm(&format!("Delete {object} and everything that depends on it?"))? {
        return Err(CliError::Cancelled);
    }

    let deleted = delete_object(session, &object).await?;
    session.commit()?;

    success(&format!("Deleted {object}"));
    for reference in &deleted[..deleted.len().saturating_sub(1)] {
        println!("  also deleted {reference}");
    }
    Ok(())
}

/// Deletes an object through the terminator and returns everything it
/// removed. Dependents come first and the object itself last.
pub async fn delete_object(session: &Session, object: &ig_model::AnyObject) -> CliResult<Vec<Reference>> {
    let mut terminator = Terminator::new(session.store().as_ref()).with_source(session.user());
    terminator.delete_object(object).await?;

    let deleted = terminator.deleted().to_vec();
    info!(
        object = %object,
        deleted = deleted.len(),
        pruned = terminator.pruned_count(),
        "Deleted object"
    );
    Ok(deleted)
}
