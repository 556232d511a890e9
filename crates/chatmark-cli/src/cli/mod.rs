//! CLI entry and dispatch.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chatmark_core::config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(version = "0.1")]
#[command(about = "Render chat-message markdown to interactive HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render a markdown message to HTML
    Render {
        /// Markdown file to render (default: stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// The message is still being generated
        #[arg(long)]
        thinking: bool,

        /// Print the markup tree as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Collapse a thinking block by key (e.g. think-0); repeatable
        #[arg(long, value_name = "KEY")]
        collapse: Vec<String>,

        /// Config file to use instead of the default location
        #[arg(long, value_name = "PATH", env = "CHATMARK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a config file with defaults
    Init,
}

/// Logs go to stderr so rendered output on stdout stays clean.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
    {
        eprintln!("Warning: logging disabled: {err}");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Commands::Render {
            input,
            thinking,
            json,
            collapse,
            config,
        } => {
            let config = match config {
                Some(path) => config::Config::load_from(&path),
                None => config::Config::load(),
            }
            .context("load config")?;

            commands::render::run(commands::render::RenderOptions {
                input: input.as_deref(),
                config,
                thinking,
                json,
                collapse: &collapse,
            })
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
