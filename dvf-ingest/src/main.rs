use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use dvf_core::storage::{DatabaseStorage, Storage};
use dvf_core::DatabaseManager;
use dvf_ingest::{loader, observability};

#[derive(Parser)]
#[command(name = "dvf-ingest")]
#[command(about = "Load DVF mutation exports into the local database")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "dvf.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a DVF CSV export
    Load {
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Field separator used by the export (one character)
        #[arg(long, default_value = ";")]
        delimiter: String,
    },
    /// Print the number of rows currently stored
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    observability::logging::init_logging();

    info!("Opening database at {}", cli.database.display());
    let manager = DatabaseManager::open(&cli.database).await?;
    let storage = DatabaseStorage::new(manager).await?;

    match cli.command {
        Commands::Load { csv, delimiter } => {
            let delimiter = loader::parse_delimiter(&delimiter)?;
            let report = loader::load_csv(&storage, &csv, delimiter).await?;
            println!(
                "Loaded {} rows ({} duplicates skipped, {} rows rejected)",
                report.inserted, report.skipped_duplicates, report.rejected_rows
            );
        }
        Commands::Count => {
            let count = storage.count_records().await?;
            println!("{count}");
        }
    }

    Ok(())
}
