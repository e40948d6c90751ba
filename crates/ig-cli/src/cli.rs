//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Identity-governance console.
#[derive(Debug, Parser)]
#[command(name = "igc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.idgov/igc.toml).
    #[arg(short, long, env = "IGC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Object store file (overrides config).
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Name recorded on audit events (overrides config).
    #[arg(short, long, env = "IGC_USER")]
    pub user: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import objects from an XML file.
    Import(ImportArgs),

    /// Export objects as XML.
    Export(ExportArgs),

    /// List objects of a class.
    List(ListArgs),

    /// Show one object.
    Get(ObjectArgs),

    /// Delete an object and prune references to it.
    Delete(DeleteArgs),

    /// Resolve a reference by id and/or name.
    Resolve(ResolveArgs),

    /// Show certification statistics.
    Stats {
        /// Certification id or name.
        certification: String,
    },

    /// Count objects per class.
    Count,

    /// Task commands.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Import arguments.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// XML file holding one object or a `<sailpoint>` document.
    pub file: PathBuf,

    /// Leave objects that already exist untouched.
    #[arg(long)]
    pub skip_existing: bool,
}

/// Export arguments.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Object class.
    pub class: String,

    /// Ids or names to export; every object of the class if omitted.
    pub names: Vec<String>,

    /// Output file (stdout if not specified).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// List arguments.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Object class.
    pub class: String,

    /// Only objects whose name contains this text.
    #[arg(long)]
    pub filter: Option<String>,
}

/// Arguments naming one object.
#[derive(Debug, Args)]
pub struct ObjectArgs {
    /// Object class.
    pub class: String,

    /// Id or name.
    pub id: String,
}

/// Delete arguments.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Object to delete.
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Skip confirmation.
    #[arg(long)]
    pub force: bool,
}

/// Resolve arguments.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Object class, simple or fully qualified.
    pub class: String,

    /// Object id.
    #[arg(long)]
    pub id: Option<String>,

    /// Object name.
    #[arg(long)]
    pub name: Option<String>,
}

/// Task commands.
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// List registered executors.
    Executors,

    /// Run a task definition.
    Run {
        /// Task definition id or name.
        definition: String,

        /// Argument override as key=value; repeatable.
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Print the configuration file path.
    Path,

    /// Set a configuration value.
    Set {
        /// Configuration key, e.g. `storage.path`.
        key: String,

        /// Configuration value.
        value: String,
    },

    /// Write a configuration file with default values.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_options() {
        let cli = Cli::try_parse_from([
            "igc", "--store", "objects.json", "-o", "json", "-v", "list", "Identity", "--filter", "al",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("objects.json")));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.verbose);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.class, "Identity");
                assert_eq!(args.filter.as_deref(), Some("al"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_delete_and_task_run() {
        let cli = Cli::try_parse_from(["igc", "delete", "Bundle", "Auditor", "--force"]).unwrap();
        match cli.command {
            Command::Delete(args) => {
                assert_eq!(args.object.class, "Bundle");
                assert_eq!(args.object.id, "Auditor");
                assert!(args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "igc", "task", "run", "Prune", "--arg", "dryRun=true", "--arg", "archive=false",
        ])
        .unwrap();
        match cli.command {
            Command::Task(TaskCommand::Run { definition, args }) => {
                assert_eq!(definition, "Prune");
                assert_eq!(args, vec!["dryRun=true", "archive=false"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_names_are_optional() {
        let cli = Cli::try_parse_from(["igc", "export", "Rule"]).unwrap();
        match cli.command {
            Command::Export(args) => assert!(args.names.is_empty()),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
