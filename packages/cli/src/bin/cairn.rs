use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cairn_cli::StoreOptions;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "Cairn - inspect and edit persisted settings tables")]
#[command(version)]
struct Cli {
    /// Database URL (defaults to CAIRN_DATABASE_URL or sqlite:cairn.db)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Settings table (defaults to CAIRN_SETTINGS_TABLE or cairn_settings)
    #[arg(long, global = true)]
    table: Option<String>,

    /// Extra default as key=value, repeatable
    #[arg(long = "default", global = true)]
    defaults: Vec<String>,

    /// Keys stored as structured blobs
    #[arg(long, global = true, value_delimiter = ',')]
    serialized: Vec<String>,

    /// Keys stored encrypted
    #[arg(long, global = true, value_delimiter = ',')]
    encrypted: Vec<String>,

    /// Keys split into lines on read
    #[arg(long, global = true, value_delimiter = ',')]
    new_lines: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every resolved setting
    List {
        #[arg(long, help = "Bypass the cache and re-read the table")]
        reload: bool,
    },
    /// Show one resolved setting
    Get { key: String },
    /// Validate and write settings
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
    /// Validate settings without writing
    Validate {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(cli: Cli) -> anyhow::Result<()> {
    let options = StoreOptions {
        database_url: cli.database_url,
        table: cli.table,
        defaults: cli.defaults,
        serialized: cli.serialized,
        encrypted: cli.encrypted,
        new_lines: cli.new_lines,
    };

    match cli.command {
        Commands::List { reload } => cli::settings::list(&options, reload).await,
        Commands::Get { key } => cli::settings::get(&options, &key).await,
        Commands::Set { assignments } => cli::settings::set(&options, &assignments).await,
        Commands::Validate { assignments } => {
            cli::settings::validate(&options, &assignments).await
        }
    }
}
