//! # igc
//!
//! Identity-governance console.

#![forbid(unsafe_code)]
#![deny(warnings)]

use clap::Parser;
use ig_cli::{
    cli::{Cli, Command},
    commands::{
        run_config, run_count, run_delete, run_export, run_get, run_import, run_list, run_resolve,
        run_stats, run_task,
    },
    config::OutputFormat,
    output::error,
    CliConfig, CliResult, Session,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => CliConfig::config_path()?,
    };
    let mut config = CliConfig::load_from(&config_path)?;
    if let Some(user) = &cli.user {
        config.user.clone_from(user);
    }

    init_tracing(&config, cli.verbose);

    let format = cli.output.unwrap_or(config.output_format);

    match cli.command {
        Command::Config(cmd) => run_config(cmd, &mut config, &config_path),
        command => {
            let session = Session::open(&config, cli.store.as_deref())?;
            run_command(command, &session, format).await
        }
    }
}

async fn run_command(command: Command, session: &Session, format: OutputFormat) -> CliResult<()> {
    match command {
        Command::Import(args) => run_import(args, session).await,
        Command::Export(args) => run_export(args, session).await,
        Command::List(args) => run_list(args, session, format).await,
        Command::Get(args) => run_get(args, session, format).await,
        Command::Delete(args) => run_delete(args, session).await,
        Command::Resolve(args) => run_resolve(args, session, format).await,
        Command::Stats { certification } => run_stats(&certification, session, format).await,
        Command::Count => run_count(session, format).await,
        Command::Task(cmd) => run_task(cmd, session, format).await,
        Command::Config(_) => unreachable!("config commands run without a session"),
    }
}

fn init_tracing(config: &CliConfig, verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.core().logging.level)
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
