//! recruitctl - recruitment tracking from the command line
//!
//! Thin front end over `recruitctl-core`:
//! - Register recruits and log activity notes against them
//! - Per-recruiter and per-member views
//! - Rollup stats (active, lifetime, last recruitment), text or JSON
//! - Staff lookup across legacy label formats

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use recruitctl_core::{RecruitmentStore, SqlStore, StoreConfig};
use tracing::{debug, info};

mod commands;
mod config;
mod render;
mod tracing_setup;

use commands::{members, recruiters};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "recruitctl",
    author,
    version,
    about = "Track recruiters, the members they bring in, and activity per member",
    long_about = "Track recruiters, the members they bring in, and activity notes per member. \
                  Backed by a SQLite file or PostgreSQL; the recruiter rollup is reconciled \
                  against member history on every start."
)]
struct Cli {
    /// Store connection string (sqlite://... or postgres://...)
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables and reconcile the recruiter rollup
    Init,
    /// Register a new recruit under a recruiter
    Register(members::RegisterArgs),
    /// Add an activity note to a registered member
    Activity(members::ActivityArgs),
    /// Show a recruiter's recruits with join dates and activity counts
    Recruiter(recruiters::RecruiterArgs),
    /// Show a member's join date and activity log
    Member(members::MemberArgs),
    /// Delete a member and all its activities
    Delete(members::DeleteArgs),
    /// Delete every recruit of a recruiter and reset its lifetime count
    Clear(recruiters::ClearArgs),
    /// List recruiters with active recruit counts
    Recruiters(recruiters::ListArgs),
    /// Full rollup stats per recruiter
    Stats(recruiters::ListArgs),
    /// Active and lifetime counts for a list of staff members
    Staff(recruiters::StaffArgs),
    /// Inspect configuration (path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init_or_warn(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    });

    let result = run(cli).await;
    tracing_setup::shutdown_otel();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = StoreConfig::load().context("Failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let command = match cli.command {
        Commands::Config(args) => return config::run_config(args, &config),
        Commands::Completions(args) => return run_completions(args),
        command => command,
    };

    let store = open_store(&config).await?;
    let reply = dispatch(&store, command).await;
    store.close().await;

    println!("{}", reply?);
    Ok(())
}

/// Connect and run the startup sequence (schema, then backfill)
async fn open_store(config: &StoreConfig) -> Result<SqlStore> {
    let store = SqlStore::connect(config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.redacted_url()))?;

    let report = store.prepare().await.context("Failed to prepare store")?;
    debug!(recruiters = report.recruiters_scanned, "store ready");
    Ok(store)
}

async fn dispatch(store: &dyn RecruitmentStore, command: Commands) -> Result<String> {
    match command {
        Commands::Init => {
            let stats = store.get_full_stats().await?;
            info!(recruiters = stats.len(), "initialized");
            Ok(format!("Store ready ({} recruiters tracked)", stats.len()))
        }
        Commands::Register(args) => commands::run_register(store, args).await,
        Commands::Activity(args) => commands::run_activity(store, args).await,
        Commands::Recruiter(args) => commands::run_recruiter(store, args).await,
        Commands::Member(args) => commands::run_member(store, args).await,
        Commands::Delete(args) => commands::run_delete(store, args).await,
        Commands::Clear(args) => commands::run_clear(store, args).await,
        Commands::Recruiters(args) => commands::run_recruiters(store, args).await,
        Commands::Stats(args) => commands::run_stats(store, args).await,
        Commands::Staff(args) => commands::run_staff(store, args).await,
        Commands::Config(_) | Commands::Completions(_) => {
            bail!("command does not use the store")
        }
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}
