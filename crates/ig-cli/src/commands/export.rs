//! Export command implementation.

use ig_storage::ObjectStore;

use crate::cli::ExportArgs;
use crate::output::success;
use crate::CliResult;

use super::{parse_class, Session};

/// Runs the export command.
pub async fn run_export(args: ExportArgs, session: &Session) -> CliResult<()> {
    let class = parse_class(&args.class)?;
    let (xml, count) = export_xml(session, class, &args.names).await?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &xml)?;
            success(&format!("Exported {count} {class} object(s) to '{}'", path.display()));
        }
        None => print!("{xml}"),
    }
    Ok(())
}

/// Writes the named objects, or every object of the class, as XML.
///
/// A single named object is written as a bare document; anything else is
/// wrapped in `<sailpoint>`.
pub async fn export_xml(
    session: &Session,
    class: ig_model::ObjectClass,
    names: &[String],
) -> CliResult<(String, usize)> {
    let objects = if names.is_empty() {
        session.store().list(class).await?
    } else {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            found.push(session.require(class, name).await?);
        }
        found
    };

    let xml = match objects.as_slice() {
        [single] if !names.is_empty() => session.codec().to_xml(single)?,
        _ => session.codec().write_objects(&objects)?,
    };
    Ok((xml, objects.len()))
}
