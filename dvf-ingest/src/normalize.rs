//! Row normalization: raw CSV cells to typed `DvfRecord` values.
//!
//! Coercion is lenient by contract. A cell that is empty or fails to parse
//! for its declared type becomes `None`; the only fatal condition is a
//! missing `id_mutation`, which would make the row impossible to dedup.

use csv::StringRecord;
use dvf_core::common::error::{DvfError, Result};
use dvf_core::domain::schema::{self, ColumnType};
use dvf_core::domain::DvfRecord;
use std::collections::HashMap;

/// Column name to field position, built once per file from the header row.
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            // data.gouv.fr exports carry a UTF-8 BOM on the first header
            .map(|(position, name)| (name.trim_start_matches('\u{feff}').to_string(), position))
            .collect();

        Self { positions }
    }

    /// Raw cell for a column, with empty cells and absent columns collapsed
    /// to `None`.
    fn raw<'a>(&self, row: &'a StringRecord, column: &str) -> Option<&'a str> {
        self.positions
            .get(column)
            .and_then(|&position| row.get(position))
            .filter(|value| !value.is_empty())
    }
}

fn text(index: &HeaderIndex, row: &StringRecord, column: &str) -> Option<String> {
    debug_assert_eq!(schema::column_type(column), Some(ColumnType::Text));
    index.raw(row, column).map(str::to_string)
}

fn real(index: &HeaderIndex, row: &StringRecord, column: &str) -> Option<f64> {
    debug_assert_eq!(schema::column_type(column), Some(ColumnType::Real));
    index.raw(row, column).and_then(|value| value.parse().ok())
}

fn integer(index: &HeaderIndex, row: &StringRecord, column: &str) -> Option<i64> {
    debug_assert_eq!(schema::column_type(column), Some(ColumnType::Integer));
    index.raw(row, column).and_then(|value| value.parse().ok())
}

/// Normalize one raw row into a typed record.
pub fn normalize_record(index: &HeaderIndex, row: &StringRecord) -> Result<DvfRecord> {
    let id_mutation = index
        .raw(row, "id_mutation")
        .ok_or_else(|| DvfError::MissingField("id_mutation".to_string()))?
        .to_string();

    Ok(DvfRecord {
        id_mutation,
        date_mutation: text(index, row, "date_mutation"),
        numero_disposition: text(index, row, "numero_disposition"),
        nature_mutation: text(index, row, "nature_mutation"),
        valeur_fonciere: real(index, row, "valeur_fonciere"),
        adresse_numero: text(index, row, "adresse_numero"),
        adresse_suffixe: text(index, row, "adresse_suffixe"),
        adresse_nom_voie: text(index, row, "adresse_nom_voie"),
        adresse_code_voie: text(index, row, "adresse_code_voie"),
        code_postal: text(index, row, "code_postal"),
        code_commune: text(index, row, "code_commune"),
        nom_commune: text(index, row, "nom_commune"),
        code_departement: text(index, row, "code_departement"),
        ancien_code_commune: text(index, row, "ancien_code_commune"),
        ancien_nom_commune: text(index, row, "ancien_nom_commune"),
        id_parcelle: text(index, row, "id_parcelle"),
        ancien_id_parcelle: text(index, row, "ancien_id_parcelle"),
        numero_volume: text(index, row, "numero_volume"),
        lot1_numero: text(index, row, "lot1_numero"),
        lot1_surface_carrez: real(index, row, "lot1_surface_carrez"),
        lot2_numero: text(index, row, "lot2_numero"),
        lot2_surface_carrez: real(index, row, "lot2_surface_carrez"),
        lot3_numero: text(index, row, "lot3_numero"),
        lot3_surface_carrez: real(index, row, "lot3_surface_carrez"),
        lot4_numero: text(index, row, "lot4_numero"),
        lot4_surface_carrez: real(index, row, "lot4_surface_carrez"),
        lot5_numero: text(index, row, "lot5_numero"),
        lot5_surface_carrez: real(index, row, "lot5_surface_carrez"),
        nombre_lots: integer(index, row, "nombre_lots"),
        code_type_local: text(index, row, "code_type_local"),
        type_local: text(index, row, "type_local"),
        surface_reelle_bati: real(index, row, "surface_reelle_bati"),
        nombre_pieces_principales: integer(index, row, "nombre_pieces_principales"),
        code_nature_culture: text(index, row, "code_nature_culture"),
        nature_culture: text(index, row, "nature_culture"),
        code_nature_culture_speciale: text(index, row, "code_nature_culture_speciale"),
        nature_culture_speciale: text(index, row, "nature_culture_speciale"),
        surface_terrain: real(index, row, "surface_terrain"),
        longitude: real(index, row, "longitude"),
        latitude: real(index, row, "latitude"),
    })
}
