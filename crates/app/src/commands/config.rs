//! Config command - manage configuration.

use std::path::Path;

use clap::{Args, Subcommand};
use struk_core::StrukConfig;

use crate::state::{default_config_path, AppState};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    match args.command {
        ConfigCommand::Show => show(config_path),
        ConfigCommand::Init { force } => init(&path, force),
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn show(config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;
    print!("{}", state.config.to_toml_string()?);
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    StrukConfig::default().save(path)?;
    println!("Created configuration file at {}", path.display());
    Ok(())
}
