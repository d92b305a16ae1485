mod config;
mod constants;
mod db;
mod engine;
mod error;
mod ledger;
mod migration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, DatabaseArgs, StoreArgs};
use dotenv::dotenv;
use engine::Engine;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations in version order
    Up {
        #[command(flatten)]
        database_args: DatabaseArgs,

        #[command(flatten)]
        store_args: StoreArgs,
    },

    /// Roll back the most recently applied migration
    Down {
        #[command(flatten)]
        database_args: DatabaseArgs,

        #[command(flatten)]
        store_args: StoreArgs,
    },

    /// Roll back all applied migrations, most recent first
    Reset {
        #[command(flatten)]
        database_args: DatabaseArgs,

        #[command(flatten)]
        store_args: StoreArgs,
    },

    /// Run all seed files, continuing past individual failures
    Seed {
        #[command(flatten)]
        database_args: DatabaseArgs,

        #[command(flatten)]
        store_args: StoreArgs,
    },

    /// Show applied and pending migrations
    Status {
        #[command(flatten)]
        database_args: DatabaseArgs,

        #[command(flatten)]
        store_args: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);
    run_main(cli).await
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_main(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Up {
            database_args,
            store_args,
        } => {
            let config = Config::resolve(database_args, store_args);
            info!("Applying pending migrations");
            let engine = Engine::connect(&config).await?;
            engine.up().await?;
        }
        Commands::Down {
            database_args,
            store_args,
        } => {
            let config = Config::resolve(database_args, store_args);
            info!("Rolling back last migration");
            let engine = Engine::connect(&config).await?;
            engine.down().await?;
        }
        Commands::Reset {
            database_args,
            store_args,
        } => {
            let config = Config::resolve(database_args, store_args);
            info!("Rolling back all migrations");
            let engine = Engine::connect(&config).await?;
            engine.reset().await?;
        }
        Commands::Seed {
            database_args,
            store_args,
        } => {
            let config = Config::resolve(database_args, store_args);
            info!("Running seed files");
            let engine = Engine::connect(&config).await?;
            engine.seed().await?;
        }
        Commands::Status {
            database_args,
            store_args,
        } => {
            let config = Config::resolve(database_args, store_args);
            info!("Checking migration status");
            let engine = Engine::connect(&config).await?;
            engine.status().await?;
        }
    }

    Ok(())
}
