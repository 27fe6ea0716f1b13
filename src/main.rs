use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;

#[derive(Parser)]
#[command(name = "revpass")]
#[command(version, about = "Token budgeting and multi-pass planning for LLM code reviews")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Model to plan for. Overrides revpass.toml.
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Review type (e.g. "security", "architectural"). Overrides revpass.toml.
    #[arg(short = 't', long, global = true)]
    pub review_type: Option<String>,

    /// Fraction of the context window reserved for prompt and response, in [0, 1).
    #[arg(long, global = true)]
    pub overhead_factor: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count tokens in source files and plan review passes
    Analyze {
        /// Files or directories to analyze (defaults to the project directory)
        paths: Vec<PathBuf>,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect a persisted review context
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// List known models and their context windows
    Models,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ContextCommands {
    /// Print the primer for the next pass
    Show {
        /// Review context JSON file
        file: PathBuf,

        /// Files the next pass will review (comma separated)
        #[arg(long, value_delimiter = ',')]
        files: Vec<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default revpass.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Analyze { paths, json } => cmd::cmd_analyze(&cli, &project_dir, paths, *json)?,
        Commands::Context { command } => match command {
            ContextCommands::Show { file, files } => cmd::cmd_context_show(file, files)?,
        },
        Commands::Models => cmd::cmd_models(&project_dir)?,
        Commands::Config { command } => cmd::cmd_config(&cli, &project_dir, command.clone())?,
    }

    Ok(())
}
