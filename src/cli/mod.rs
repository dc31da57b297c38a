pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Spend dashboard admin CLI - schema setup, data loads, users and reports")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the database tables if they do not exist")]
    Init,

    #[command(about = "Load the newest household, product and transaction extracts")]
    Ingest {
        #[arg(long, help = "Directory to read extracts from (defaults to INGEST_DATA_DIR)")]
        dir: Option<PathBuf>,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Total spend grouped by a household attribute")]
    Spend {
        #[arg(help = "household-size, children or income-range")]
        dimension: String,
    },

    #[command(about = "List a household's transactions with product details")]
    Search {
        #[arg(help = "Household number")]
        hshd_num: i32,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Ping {
        #[arg(long, help = "Server base URL (defaults to the configured bind address)")]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Ingest { dir } => commands::ingest::handle(dir, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Spend { dimension } => commands::report::spend(&dimension, output_format).await,
        Commands::Search { hshd_num } => commands::report::search(hshd_num, output_format).await,
        Commands::Ping { url } => commands::server::ping(url, output_format).await,
    }
}
