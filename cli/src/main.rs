//! # genloop CLI
//!
//! Command-line interface for genloop.
//!
//! ## Usage
//!
//! - `genloop generate "prompt"` - Generate content for a prompt
//! - `genloop generate --stream "prompt"` - Stream the response
//! - `genloop models` - List available models

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{generate_command, models_command};
use config::CliConfigLoader;

/// genloop - a client for generative model services
#[derive(Parser)]
#[command(name = "genloop")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate content and list models from the terminal")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key override
    #[arg(long, env = "GENLOOP_API_KEY")]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate content for a prompt
    Generate {
        /// The prompt to send
        prompt: String,

        /// Stream the response fragment by fragment
        #[arg(long)]
        stream: bool,

        /// Maximum remote calls for automatic tool calling
        #[arg(long)]
        max_remote_calls: Option<u32>,
    },

    /// List available models
    Models {
        /// Requested page size
        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    genloop_core::init_tracing_with_debug(cli.verbose);

    let loader = CliConfigLoader::new()
        .with_config_override(cli.config.clone())
        .with_api_key_override(cli.api_key.clone())
        .with_base_url_override(cli.base_url.clone())
        .with_model_override(cli.model.clone());
    let client_config = loader.load()?;
    let client = genloop_core::Client::new(client_config)?;

    match cli.command {
        Command::Generate {
            prompt,
            stream,
            max_remote_calls,
        } => generate_command(&client, prompt, stream, max_remote_calls).await,
        Command::Models { page_size } => models_command(&client, page_size).await,
    }
}
