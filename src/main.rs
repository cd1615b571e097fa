use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;
mod lookup;

use commands::{
    ConfigCommand, DayCommand, EntryCommand, EntryRepos, FoodCommand, WaterCommand,
};
use config::Config;
use db::{init_db, EntryRepository, FoodRepository, WaterRepository};
use lookup::FoodLookup;

#[derive(Parser)]
#[command(name = "macrotrack")]
#[command(version)]
#[command(about = "Log what you eat: calories, carbs and protein", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the food catalog and look up foods
    Food(FoodCommand),

    /// Log, edit and list food entries
    Entry(EntryCommand),

    /// Log water
    Water(WaterCommand),

    /// Show one day's entries, totals and water
    Day(DayCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Food(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let repo = FoodRepository::new(pool);
            let lookup = FoodLookup::new(&config.lookup)?;
            cmd.run(&repo, &lookup).await?;
        }
        Some(Commands::Entry(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let entries = EntryRepository::new(pool.clone());
            let foods = FoodRepository::new(pool);
            cmd.run(&EntryRepos {
                entries: &entries,
                foods: &foods,
            })
            .await?;
        }
        Some(Commands::Water(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let repo = WaterRepository::new(pool);
            cmd.run(&repo).await?;
        }
        Some(Commands::Day(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let entries = EntryRepository::new(pool.clone());
            let water = WaterRepository::new(pool);
            cmd.run(&entries, &water).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
