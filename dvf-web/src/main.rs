// main.rs only boots the storage handle, the initial load, and the server

mod error;
mod handlers;
mod models;
mod router;
mod state;

use dvf_core::storage::{DatabaseStorage, Storage};
use dvf_core::DatabaseManager;
use state::AppState;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dvf_web=debug,dvf_core=debug,info")),
        )
        .init();

    let db_path = env::var("DVF_DB_PATH").unwrap_or_else(|_| "dvf.db".to_string());

    // The initial load only runs against a fresh database file; an existing
    // file is assumed to be fully loaded (single-loader rule).
    let needs_load = !Path::new(&db_path).exists();

    let manager = DatabaseManager::open(&db_path).await?;
    let storage = DatabaseStorage::new(manager).await?;

    if needs_load {
        let csv_path = env::var("DVF_CSV_PATH").unwrap_or_else(|_| "donnees_dvf.csv".to_string());
        let delimiter = env::var("DVF_CSV_DELIMITER").unwrap_or_else(|_| ";".to_string());
        let delimiter = dvf_ingest::loader::parse_delimiter(&delimiter)?;

        let report =
            dvf_ingest::loader::load_csv(&storage, Path::new(&csv_path), delimiter).await?;
        info!(
            "Initial load finished: {} rows inserted, {} rejected",
            report.inserted, report.rejected_rows
        );
    }

    let row_count = storage.count_records().await?;
    info!("Serving {row_count} DVF rows");

    let app_state = AppState {
        storage: Arc::new(storage),
    };
    let app = router::app_router(app_state);

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000);
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("DVF API listening on {bind_addr} (visit http://127.0.0.1:{port})");
    axum::serve(listener, app).await?;
    Ok(())
}
