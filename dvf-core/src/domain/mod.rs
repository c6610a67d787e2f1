pub mod schema;

use serde::Serialize;

/// One DVF mutation row, as normalized from a source export.
///
/// Field names match the table columns one-to-one. Everything except the
/// dedup key is nullable: an empty or unparsable cell in the source file
/// lands here as `None`, never as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DvfRecord {
    pub id_mutation: String,
    pub date_mutation: Option<String>,
    pub numero_disposition: Option<String>,
    pub nature_mutation: Option<String>,
    pub valeur_fonciere: Option<f64>,
    pub adresse_numero: Option<String>,
    pub adresse_suffixe: Option<String>,
    pub adresse_nom_voie: Option<String>,
    pub adresse_code_voie: Option<String>,
    pub code_postal: Option<String>,
    pub code_commune: Option<String>,
    pub nom_commune: Option<String>,
    pub code_departement: Option<String>,
    pub ancien_code_commune: Option<String>,
    pub ancien_nom_commune: Option<String>,
    pub id_parcelle: Option<String>,
    pub ancien_id_parcelle: Option<String>,
    pub numero_volume: Option<String>,
    pub lot1_numero: Option<String>,
    pub lot1_surface_carrez: Option<f64>,
    pub lot2_numero: Option<String>,
    pub lot2_surface_carrez: Option<f64>,
    pub lot3_numero: Option<String>,
    pub lot3_surface_carrez: Option<f64>,
    pub lot4_numero: Option<String>,
    pub lot4_surface_carrez: Option<f64>,
    pub lot5_numero: Option<String>,
    pub lot5_surface_carrez: Option<f64>,
    pub nombre_lots: Option<i64>,
    pub code_type_local: Option<String>,
    pub type_local: Option<String>,
    pub surface_reelle_bati: Option<f64>,
    pub nombre_pieces_principales: Option<i64>,
    pub code_nature_culture: Option<String>,
    pub nature_culture: Option<String>,
    pub code_nature_culture_speciale: Option<String>,
    pub nature_culture_speciale: Option<String>,
    pub surface_terrain: Option<f64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Counters reported by one committed bulk load.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadSummary {
    pub inserted: u64,
    pub skipped_duplicates: u64,
}
