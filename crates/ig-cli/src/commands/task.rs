//! Task commands.

use std::sync::Arc;

use ig_model::{AttrValue, Attributes, ObjectClass, TaskDefinition, TaskResult};
use ig_spi::{ExecutorRegistry, TaskContext};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::TaskCommand;
use crate::config::OutputFormat;
use crate::output::{error, output, success, warning};
use crate::{CliError, CliResult};

use super::Session;

/// One message or return value of a finished task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ResultRow {
    /// Message level, or `return` for return values.
    pub kind: String,
    /// Message text or `key = value`.
    pub detail: String,
}

/// Runs a task command.
pub async fn run_task(cmd: TaskCommand, session: &Session, format: OutputFormat) -> CliResult<()> {
    let registry = ExecutorRegistry::with_builtins();
    match cmd {
        TaskCommand::Executors => {
            for name in registry.list() {
                println!("{name}");
            }
            Ok(())
        }
        TaskCommand::Run { definition, args } => {
            let overrides = parse_overrides(&args)?;
            let result = run_definition(session, &registry, &definition, &overrides).await?;
            session.commit()?;
            report(&result, format)
        }
    }
}

/// Runs a stored task definition and returns its saved result.
pub async fn run_definition(
    session: &Session,
    registry: &ExecutorRegistry,
    definition: &str,
    overrides: &Attributes,
) -> CliResult<TaskResult> {
    let definition: TaskDefinition = session
        .require(ObjectClass::TaskDefinition, definition)
        .await?
        .downcast()?;

    let ctx = TaskContext::new(Arc::clone(session.store()) as Arc<dyn ig_storage::ObjectStore>)
        .with_launcher(session.user());
    let overrides = (!overrides.is_empty()).then_some(overrides);
    Ok(registry.run(&ctx, &definition, overrides).await?)
}

/// Parses `key=value` overrides. `true`/`false` become booleans and
/// integers become numbers; anything else stays a string.
pub fn parse_overrides(args: &[String]) -> CliResult<Attributes> {
    let mut attributes = Attributes::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CliError::InvalidArgument(format!("expected KEY=VALUE, got '{arg}'")))?;
        attributes.put(key.trim(), parse_value(value.trim()));
    }
    Ok(attributes)
}

fn parse_value(value: &str) -> AttrValue {
    if value.eq_ignore_ascii_case("true") {
        AttrValue::Bool(true)
    } else if value.eq_ignore_ascii_case("false") {
        AttrValue::Bool(false)
    } else if let Ok(int) = value.parse::<i32>() {
        AttrValue::Int(int)
    } else if let Ok(long) = value.parse::<i64>() {
        AttrValue::Long(long)
    } else {
        AttrValue::from(value)
    }
}

fn report(result: &TaskResult, format: OutputFormat) -> CliResult<()> {
    let status = result
        .completion_status
        .map_or("unknown", |s| s.as_str());
    if format == OutputFormat::Table {
        let line = format!(
            "{} finished: {status}",
            result.header.name.as_deref().unwrap_or("task")
        );
        if result.has_errors() {
            error(&line);
        } else if result.has_warnings() || result.terminated {
            warning(&line);
        } else {
            success(&line);
        }
    }

    let mut rows: Vec<ResultRow> = result
        .messages
        .iter()
        .map(|m| ResultRow {
            kind: m.level.as_str().to_string(),
            detail: m.text.clone(),
        })
        .collect();
    rows.extend(result.attributes.iter().map(|(key, value)| ResultRow {
        kind: "return".to_string(),
        detail: format!("{key} = {}", display_value(value)),
    }));
    output(&rows, format)
}

fn display_value(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => s.clone(),
        AttrValue::Bool(b) => b.to_string(),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Long(l) => l.to_string(),
        AttrValue::Float(f) => f.to_string(),
        AttrValue::Date(d) => d.to_rfc3339(),
        AttrValue::Reference(r) => r.to_string(),
        AttrValue::List(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        AttrValue::Map(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", display_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_typed() {
        let attrs = parse_overrides(&[
            "dryRun=true".to_string(),
            "limit = 25".to_string(),
            "cutoff=90000000000".to_string(),
            "note=a=b".to_string(),
        ])
        .unwrap();
        assert!(attrs.get_boolean("dryRun"));
        assert_eq!(attrs.get("limit"), Some(&AttrValue::Int(25)));
        assert_eq!(attrs.get_long("cutoff"), Some(90_000_000_000));
        assert_eq!(attrs.get_string("note").as_deref(), Some("a=b"));
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!(parse_overrides(&["dryRun".to_string()]).is_err());
        assert!(parse_overrides(&["=true".to_string()]).is_err());
    }

    #[test]
    fn values_display_flat() {
        let list = AttrValue::List(vec![AttrValue::from("a"), AttrValue::Int(2)]);
        assert_eq!(display_value(&list), "a, 2");
    }
}
