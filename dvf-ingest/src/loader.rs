//! Bulk file load: stream rows through the normalizer, then hand the batch
//! to the storage layer, which runs it in a single transaction.

use crate::normalize::{normalize_record, HeaderIndex};
use anyhow::{bail, Context};
use csv::ReaderBuilder;
use dvf_core::storage::DatabaseStorage;
use std::path::Path;
use tracing::{info, warn};

/// Counters for one completed file load.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadReport {
    pub inserted: u64,
    pub skipped_duplicates: u64,
    pub rejected_rows: u64,
}

/// Parse a delimiter argument into the single byte the CSV reader expects.
/// DVF exports vary between semicolon and comma depending on the vintage.
pub fn parse_delimiter(raw: &str) -> anyhow::Result<u8> {
    match raw.as_bytes() {
        [byte] => Ok(*byte),
        _ => bail!("delimiter must be a single one-byte character, got {raw:?}"),
    }
}

/// Read a DVF export once and load every normalizable row.
///
/// The load either commits in full or leaves the table untouched. Rows
/// without an `id_mutation` are dropped and counted; they never abort the
/// load.
pub async fn load_csv(
    storage: &DatabaseStorage,
    path: &Path,
    delimiter: u8,
) -> anyhow::Result<LoadReport> {
    info!("Loading DVF export from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        // short rows are normal: trailing columns normalize to null
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .context("failed to read the CSV header row")?
        .clone();
    let index = HeaderIndex::new(&headers);

    let mut records = Vec::new();
    let mut rejected_rows = 0u64;
    for (position, result) in reader.records().enumerate() {
        // +2: one for the header row, one for 1-based numbering
        let line = position + 2;
        let row = result.with_context(|| format!("unreadable CSV record at line {line}"))?;

        match normalize_record(&index, &row) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("Rejecting row at line {line}: {err}");
                rejected_rows += 1;
            }
        }
    }

    let summary = storage
        .load_records(records)
        .await
        .context("bulk load failed, transaction rolled back")?;

    let report = LoadReport {
        inserted: summary.inserted,
        skipped_duplicates: summary.skipped_duplicates,
        rejected_rows,
    };
    info!(
        "Load complete: {} inserted, {} duplicates skipped, {} rows rejected",
        report.inserted, report.skipped_duplicates, report.rejected_rows
    );
    Ok(report)
}
