use super::traits::{DwellingFilter, Storage};
use crate::common::error::{DvfError, Result};
use crate::database::DatabaseManager;
use crate::domain::schema;
use crate::domain::{DvfRecord, LoadSummary};
use async_trait::async_trait;
use libsql::{Connection, Row, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, info};

/// Sales considered by every price aggregate. Exchanges, expropriations and
/// adjudications are excluded.
const QUALIFYING_SALES: &str =
    "nature_mutation IN ('Vente', 'Vente en l''état futur d''achèvement')";

/// A NULL or zero built surface never reaches the price division.
const PRICED_SURFACE: &str =
    "valeur_fonciere IS NOT NULL AND surface_reelle_bati IS NOT NULL AND surface_reelle_bati > 0";

static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let placeholders = (1..=schema::COLUMNS.len())
        .map(|position| format!("?{position}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO dvf ({}) VALUES ({placeholders})",
        schema::column_list()
    )
});

static SELECT_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT {} FROM dvf", schema::column_list()));

/// SQLite-backed implementation of the DVF store.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub async fn new(db: DatabaseManager) -> Result<Self> {
        db.run_migrations().await?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Load normalized records into the table, at most once per identifier.
    ///
    /// The whole batch runs inside one transaction: the existence check for
    /// each record sees the rows inserted earlier in the same load, so
    /// intra-file duplicates are skipped too (first write wins). Any insert
    /// failure aborts the transaction and discards the batch.
    pub async fn load_records<I>(&self, records: I) -> Result<LoadSummary>
    where
        I: IntoIterator<Item = DvfRecord>,
    {
        let conn = self.db.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to open load transaction: {e}"),
            })?;

        let mut summary = LoadSummary::default();
        for record in records {
            if record_exists(&tx, &record.id_mutation).await? {
                debug!("Skipping duplicate mutation {}", record.id_mutation);
                summary.skipped_duplicates += 1;
                continue;
            }
            insert_record(&tx, &record).await?;
            summary.inserted += 1;
        }

        tx.commit().await.map_err(|e| DvfError::Database {
            message: format!("Failed to commit load transaction: {e}"),
        })?;

        info!(
            "Load committed: {} inserted, {} duplicates skipped",
            summary.inserted, summary.skipped_duplicates
        );
        Ok(summary)
    }

    /// Fetch one row by its mutation identifier.
    pub async fn get_record(&self, id_mutation: &str) -> Result<Option<DvfRecord>> {
        let conn = self.db.get_connection().await?;
        let sql = format!("{} WHERE id_mutation = ?1", SELECT_SQL.as_str());

        let mut rows = conn
            .query(&sql, libsql::params![id_mutation])
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to query mutation {id_mutation}: {e}"),
            })?;

        match next_row(&mut rows).await? {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn query_records(&self, sql: &str, param: &str) -> Result<Vec<DvfRecord>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(sql, libsql::params![param])
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to query records: {e}"),
            })?;

        let mut records = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            records.push(record_from_row(&row)?);
        }

        Ok(records)
    }

    /// Run an aggregate returning one nullable value; NULL means no row
    /// satisfied the filter.
    async fn query_aggregate(&self, sql: &str, param: &str) -> Result<Option<f64>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(sql, libsql::params![param])
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to run aggregate query: {e}"),
            })?;

        match next_row(&mut rows).await? {
            Some(row) => real_value(&row, 0),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn average_price_per_m2_by_commune(&self) -> Result<Vec<(String, f64)>> {
        let conn = self.db.get_connection().await?;
        let sql = format!(
            "SELECT nom_commune, AVG(valeur_fonciere / surface_reelle_bati) \
             FROM dvf \
             WHERE {QUALIFYING_SALES} AND {PRICED_SURFACE} AND nom_commune IS NOT NULL \
             GROUP BY nom_commune \
             ORDER BY nom_commune"
        );

        let mut rows = conn
            .query(&sql, libsql::params![])
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to query per-commune averages: {e}"),
            })?;

        let mut averages = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            let commune = text_value(&row, 0)?.unwrap_or_default();
            if let Some(average) = real_value(&row, 1)? {
                averages.push((commune, average));
            }
        }

        Ok(averages)
    }

    async fn average_price_per_m2_for_commune(
        &self,
        nom_commune: &str,
        filter: DwellingFilter,
    ) -> Result<Option<f64>> {
        let sql = format!(
            "SELECT AVG(valeur_fonciere / surface_reelle_bati) \
             FROM dvf \
             WHERE {QUALIFYING_SALES} AND {PRICED_SURFACE} AND {} AND nom_commune = ?1",
            filter.predicate()
        );
        self.query_aggregate(&sql, nom_commune).await
    }

    async fn average_built_area_for_commune(
        &self,
        nom_commune: &str,
        filter: DwellingFilter,
    ) -> Result<Option<f64>> {
        let sql = format!(
            "SELECT AVG(surface_reelle_bati) \
             FROM dvf \
             WHERE {QUALIFYING_SALES} AND {} AND nom_commune = ?1",
            filter.predicate()
        );
        self.query_aggregate(&sql, nom_commune).await
    }

    async fn average_land_area_for_houses(&self, nom_commune: &str) -> Result<Option<f64>> {
        // AVG skips NULL land areas, keeping them out of both sum and count.
        let sql = format!(
            "SELECT AVG(surface_terrain) \
             FROM dvf \
             WHERE {QUALIFYING_SALES} AND {} AND nom_commune = ?1",
            DwellingFilter::Houses.predicate()
        );
        self.query_aggregate(&sql, nom_commune).await
    }

    async fn records_by_postal_code(&self, code_postal: &str) -> Result<Vec<DvfRecord>> {
        let sql = format!("{} WHERE code_postal = ?1", SELECT_SQL.as_str());
        self.query_records(&sql, code_postal).await
    }

    async fn houses_for_commune(&self, nom_commune: &str) -> Result<Vec<DvfRecord>> {
        let sql = format!(
            "{} WHERE {} AND nom_commune = ?1",
            SELECT_SQL.as_str(),
            DwellingFilter::Houses.predicate()
        );
        self.query_records(&sql, nom_commune).await
    }

    async fn count_records(&self) -> Result<u64> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query("SELECT COUNT(*) FROM dvf", libsql::params![])
            .await
            .map_err(|e| DvfError::Database {
                message: format!("Failed to count records: {e}"),
            })?;

        match next_row(&mut rows).await? {
            Some(row) => Ok(integer_value(&row, 0)?.unwrap_or(0) as u64),
            None => Ok(0),
        }
    }
}

async fn record_exists(conn: &Connection, id_mutation: &str) -> Result<bool> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM dvf WHERE id_mutation = ?1 LIMIT 1",
            libsql::params![id_mutation],
        )
        .await
        .map_err(|e| DvfError::Database {
            message: format!("Failed to check for existing mutation: {e}"),
        })?;

    Ok(next_row(&mut rows).await?.is_some())
}

async fn insert_record(conn: &Connection, record: &DvfRecord) -> Result<()> {
    // Binding order matches schema::COLUMNS.
    conn.execute(
        INSERT_SQL.as_str(),
        libsql::params![
            record.id_mutation.as_str(),
            record.date_mutation.as_deref(),
            record.numero_disposition.as_deref(),
            record.nature_mutation.as_deref(),
            record.valeur_fonciere,
            record.adresse_numero.as_deref(),
            record.adresse_suffixe.as_deref(),
            record.adresse_nom_voie.as_deref(),
            record.adresse_code_voie.as_deref(),
            record.code_postal.as_deref(),
            record.code_commune.as_deref(),
            record.nom_commune.as_deref(),
            record.code_departement.as_deref(),
            record.ancien_code_commune.as_deref(),
            record.ancien_nom_commune.as_deref(),
            record.id_parcelle.as_deref(),
            record.ancien_id_parcelle.as_deref(),
            record.numero_volume.as_deref(),
            record.lot1_numero.as_deref(),
            record.lot1_surface_carrez,
            record.lot2_numero.as_deref(),
            record.lot2_surface_carrez,
            record.lot3_numero.as_deref(),
            record.lot3_surface_carrez,
            record.lot4_numero.as_deref(),
            record.lot4_surface_carrez,
            record.lot5_numero.as_deref(),
            record.lot5_surface_carrez,
            record.nombre_lots,
            record.code_type_local.as_deref(),
            record.type_local.as_deref(),
            record.surface_reelle_bati,
            record.nombre_pieces_principales,
            record.code_nature_culture.as_deref(),
            record.nature_culture.as_deref(),
            record.code_nature_culture_speciale.as_deref(),
            record.nature_culture_speciale.as_deref(),
            record.surface_terrain,
            record.longitude,
            record.latitude,
        ],
    )
    .await
    .map_err(|e| DvfError::Database {
        message: format!("Failed to insert mutation {}: {e}", record.id_mutation),
    })?;

    Ok(())
}

async fn next_row(rows: &mut libsql::Rows) -> Result<Option<Row>> {
    rows.next().await.map_err(|e| DvfError::Database {
        message: format!("Failed to read row: {e}"),
    })
}

fn text_value(row: &Row, idx: i32) -> Result<Option<String>> {
    match get_value(row, idx)? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        other => Err(DvfError::Database {
            message: format!("Expected text in column {idx}, got {other:?}"),
        }),
    }
}

fn real_value(row: &Row, idx: i32) -> Result<Option<f64>> {
    match get_value(row, idx)? {
        Value::Null => Ok(None),
        Value::Real(value) => Ok(Some(value)),
        Value::Integer(value) => Ok(Some(value as f64)),
        other => Err(DvfError::Database {
            message: format!("Expected a number in column {idx}, got {other:?}"),
        }),
    }
}

fn integer_value(row: &Row, idx: i32) -> Result<Option<i64>> {
    match get_value(row, idx)? {
        Value::Null => Ok(None),
        Value::Integer(value) => Ok(Some(value)),
        other => Err(DvfError::Database {
            message: format!("Expected an integer in column {idx}, got {other:?}"),
        }),
    }
}

fn get_value(row: &Row, idx: i32) -> Result<Value> {
    row.get_value(idx).map_err(|e| DvfError::Database {
        message: format!("Failed to read column {idx}: {e}"),
    })
}

/// Rebuild a record from a full-width row; column order matches
/// schema::COLUMNS.
fn record_from_row(row: &Row) -> Result<DvfRecord> {
    Ok(DvfRecord {
        id_mutation: text_value(row, 0)?.unwrap_or_default(),
        date_mutation: text_value(row, 1)?,
        numero_disposition: text_value(row, 2)?,
        nature_mutation: text_value(row, 3)?,
        valeur_fonciere: real_value(row, 4)?,
        adresse_numero: text_value(row, 5)?,
        adresse_suffixe: text_value(row, 6)?,
        adresse_nom_voie: text_value(row, 7)?,
        adresse_code_voie: text_value(row, 8)?,
        code_postal: text_value(row, 9)?,
        code_commune: text_value(row, 10)?,
        nom_commune: text_value(row, 11)?,
        code_departement: text_value(row, 12)?,
        ancien_code_commune: text_value(row, 13)?,
        ancien_nom_commune: text_value(row, 14)?,
        id_parcelle: text_value(row, 15)?,
        ancien_id_parcelle: text_value(row, 16)?,
        numero_volume: text_value(row, 17)?,
        lot1_numero: text_value(row, 18)?,
        lot1_surface_carrez: real_value(row, 19)?,
        lot2_numero: text_value(row, 20)?,
        lot2_surface_carrez: real_value(row, 21)?,
        lot3_numero: text_value(row, 22)?,
        lot3_surface_carrez: real_value(row, 23)?,
        lot4_numero: text_value(row, 24)?,
        lot4_surface_carrez: real_value(row, 25)?,
        lot5_numero: text_value(row, 26)?,
        lot5_surface_carrez: real_value(row, 27)?,
        nombre_lots: integer_value(row, 28)?,
        code_type_local: text_value(row, 29)?,
        type_local: text_value(row, 30)?,
        surface_reelle_bati: real_value(row, 31)?,
        nombre_pieces_principales: integer_value(row, 32)?,
        code_nature_culture: text_value(row, 33)?,
        nature_culture: text_value(row, 34)?,
        code_nature_culture_speciale: text_value(row, 35)?,
        nature_culture_speciale: text_value(row, 36)?,
        surface_terrain: real_value(row, 37)?,
        longitude: real_value(row, 38)?,
        latitude: real_value(row, 39)?,
    })
}
