//! Read-only commands: list, get, resolve, count and stats.

use std::sync::Arc;

use ig_model::{AnyObject, Certification, ObjectClass};
use ig_storage::{ObjectStore, ReferenceResolver};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ListArgs, ObjectArgs, ResolveArgs};
use crate::config::OutputFormat;
use crate::output::{info, output, warning};
use crate::{CliError, CliResult};

use super::{parse_class, Session};

/// One object in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ObjectRow {
    /// Object id.
    pub id: String,
    /// Object name.
    pub name: String,
    /// Owner name.
    pub owner: String,
    /// Last modification, RFC 3339.
    pub modified: String,
}

impl From<&AnyObject> for ObjectRow {
    fn from(object: &AnyObject) -> Self {
        let header = object.as_persistent().header();
        Self {
            id: object.id().unwrap_or_default().to_string(),
            name: object.name().unwrap_or_default().to_string(),
            owner: header
                .owner
                .as_ref()
                .map(|o| o.display_name().to_string())
                .unwrap_or_default(),
            modified: header
                .modified
                .or(header.created)
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Object count for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CountRow {
    /// Class name.
    pub class: String,
    /// Number of stored objects.
    pub count: usize,
}

/// One certification statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StatRow {
    /// Statistic name.
    pub metric: String,
    /// Value.
    pub value: String,
}

/// Decision counters for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct DecisionRow {
    /// Category name.
    pub category: String,
    /// Decisions made.
    pub total: u32,
    /// Approved.
    pub approved: u32,
    /// Allowed as exceptions.
    pub allowed: u32,
    /// Sent for remediation.
    pub remediated: u32,
    /// Acknowledged.
    pub acknowledged: u32,
}

/// Runs the list command.
pub async fn run_list(args: ListArgs, session: &Session, format: OutputFormat) -> CliResult<()> {
    let class = parse_class(&args.class)?;
    let rows = list_rows(session, class, args.filter.as_deref()).await?;
    if format == OutputFormat::Quiet {
        rows.iter().for_each(|r| println!("{}", r.id));
        return Ok(());
    }
    output(&rows, format)
}

/// Lists a class, optionally keeping only names containing `filter`.
pub async fn list_rows(
    session: &Session,
    class: ObjectClass,
    filter: Option<&str>,
) -> CliResult<Vec<ObjectRow>> {
    let objects = match filter {
        Some(text) => {
            let text = text.to_lowercase();
            let matches = move |o: &AnyObject| {
                o.name()
                    .is_some_and(|name| name.to_lowercase().contains(&text))
            };
            session.store().find(class, &matches).await?
        }
        None => session.store().list(class).await?,
    };
    Ok(objects.iter().map(ObjectRow::from).collect())
}

/// Runs the get command. Table output prints the object's XML.
pub async fn run_get(args: ObjectArgs, session: &Session, format: OutputFormat) -> CliResult<()> {
    let class = parse_class(&args.class)?;
    let object = session.require(class, &args.id).await?;
    print_object(session, &object, format)
}

fn print_object(session: &Session, object: &AnyObject, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => print!("{}", session.codec().to_xml(object)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(object)?),
        OutputFormat::Quiet => println!("{}", object.id().unwrap_or_default()),
    }
    Ok(())
}

/// Runs the resolve command.
pub async fn run_resolve(args: ResolveArgs, session: &Session, format: OutputFormat) -> CliResult<()> {
    if args.id.is_none() && args.name.is_none() {
        return Err(CliError::InvalidArgument("give --id, --name or both".to_string()));
    }
    let resolver = ReferenceResolver::new(Arc::clone(session.store()));
    let found = resolver
        .resolve(&args.class, args.id.as_deref(), args.name.as_deref())
        .await?;

    match found {
        Some(object) => print_object(session, &object, format),
        None => {
            let key = args.id.or(args.name).unwrap_or_default();
            warning(&format!("No {} matches '{key}'", args.class));
            Err(CliError::not_found(args.class, key))
        }
    }
}

/// Runs the count command.
pub async fn run_count(session: &Session, format: OutputFormat) -> CliResult<()> {
    let rows = count_rows(session).await?;
    output(&rows, format)
}

/// Counts every class that has objects.
pub async fn count_rows(session: &Session) -> CliResult<Vec<CountRow>> {
    let mut rows = Vec::new();
    for class in ObjectClass::ALL {
        let count = session.store().count(class).await?;
        if count > 0 {
            rows.push(CountRow {
                class: class.as_str().to_string(),
                count,
            });
        }
    }
    Ok(rows)
}

/// Runs the stats command.
pub async fn run_stats(certification: &str, session: &Session, format: OutputFormat) -> CliResult<()> {
    let cert: Certification = session
        .require(ObjectClass::Certification, certification)
        .await?
        .downcast()?;
    let (stats, decisions) = certification_rows(&cert);

    if format == OutputFormat::Table {
        info(&format!(
            "{} ({}, {})",
            cert.header.name.as_deref().unwrap_or_default(),
            cert.cert_type.as_str(),
            cert.phase.map_or("staged", |p| p.as_str()),
        ));
    }
    output(&stats, format)?;
    if !decisions.is_empty() {
        output(&decisions, format)?;
    }
    Ok(())
}

/// Flattens a certification's statistics into rows.
#[must_use]
pub fn certification_rows(cert: &Certification) -> (Vec<StatRow>, Vec<DecisionRow>) {
    let s = &cert.statistics;
    let row = |metric: &str, value: String| StatRow {
        metric: metric.to_string(),
        value,
    };

    let stats = vec![
        row("entities", s.total_entities.to_string()),
        row("entities completed", s.completed_entities.to_string()),
        row("entities delegated", s.delegated_entities.to_string()),
        row("entities open", s.open_entities().to_string()),
        row("entities overdue", s.overdue_entities.to_string()),
        row("percent complete", format!("{}%", s.percent_complete)),
        row("items", s.total_items.to_string()),
        row("items completed", s.completed_items.to_string()),
        row("items delegated", s.delegated_items.to_string()),
        row("items open", s.open_items().to_string()),
        row("items overdue", s.overdue_items.to_string()),
        row("item percent complete", format!("{}%", s.item_percent_complete)),
        row("remediations started", s.remediations_kicked_off.to_string()),
        row("remediations completed", s.remediations_completed.to_string()),
        row(
            "remediations percent complete",
            format!("{}%", s.remediations_percent_complete()),
        ),
    ];

    let decisions = s
        .decisions
        .iter()
        .filter(|(_, counts)| counts.total > 0)
        .map(|(category, counts)| DecisionRow {
            category: category.as_str().to_string(),
            total: counts.total,
            approved: counts.approved,
            allowed: counts.allowed,
            remediated: counts.remediated,
            acknowledged: counts.acknowledged,
        })
        .collect();

    (stats, decisions)
}
