use anyhow::Result;
use clap::{Parser, Subcommand};
use recruitctl_core::StoreConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show the effective store configuration (password redacted)
    Show,
}

pub fn run_config(args: ConfigArgs, config: &StoreConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(config),
    }
}

fn run_path() -> Result<()> {
    let path = StoreConfig::config_path();
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(not created yet; defaults apply)");
    }
    Ok(())
}

fn run_show(config: &StoreConfig) -> Result<()> {
    println!("[store]");
    println!("database_url = \"{}\"", config.redacted_url());
    println!("max_connections = {}", config.max_connections);
    println!("acquire_timeout_secs = {}", config.acquire_timeout_secs);
    Ok(())
}
