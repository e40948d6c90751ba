//! Configuration management commands.

use std::path::Path;

use crate::cli::ConfigCommand;
use crate::output::{info, success, warning};
use crate::{CliConfig, CliError, CliResult};

/// Runs a config command against the file at `path`.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig, path: &Path) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config, path),
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Init => init_config(path),
    }
}

fn show_config(config: &CliConfig, path: &Path) -> CliResult<()> {
    if path.exists() {
        info(&format!("Configuration file: {}", path.display()));
    } else {
        info(&format!("Configuration file: {} (not created, showing defaults)", path.display()));
    }
    println!();
    let content = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
    print!("{content}");
    Ok(())
}

fn init_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        warning(&format!("Configuration file already exists: {}", path.display()));
        return Ok(());
    }
    CliConfig::default().save_to(path)?;
    success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
