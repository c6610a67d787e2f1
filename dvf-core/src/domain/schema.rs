//! Static catalog of the `dvf` table schema.
//!
//! The column list is the single source of truth for statement generation:
//! insert placeholders, select lists, and the binding order in the storage
//! layer all derive from it. `DvfRecord` declares its fields in the same
//! order.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// SQL target type of a DVF column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Real,
    Integer,
}

/// One column of the `dvf` table.
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
    }
}

const fn real(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Real,
    }
}

const fn integer(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Integer,
    }
}

/// Every column of the `dvf` table, in declaration order.
pub const COLUMNS: &[Column] = &[
    text("id_mutation"),
    text("date_mutation"),
    text("numero_disposition"),
    text("nature_mutation"),
    real("valeur_fonciere"),
    text("adresse_numero"),
    text("adresse_suffixe"),
    text("adresse_nom_voie"),
    text("adresse_code_voie"),
    text("code_postal"),
    text("code_commune"),
    text("nom_commune"),
    text("code_departement"),
    text("ancien_code_commune"),
    text("ancien_nom_commune"),
    text("id_parcelle"),
    text("ancien_id_parcelle"),
    text("numero_volume"),
    text("lot1_numero"),
    real("lot1_surface_carrez"),
    text("lot2_numero"),
    real("lot2_surface_carrez"),
    text("lot3_numero"),
    real("lot3_surface_carrez"),
    text("lot4_numero"),
    real("lot4_surface_carrez"),
    text("lot5_numero"),
    real("lot5_surface_carrez"),
    integer("nombre_lots"),
    text("code_type_local"),
    text("type_local"),
    real("surface_reelle_bati"),
    integer("nombre_pieces_principales"),
    text("code_nature_culture"),
    text("nature_culture"),
    text("code_nature_culture_speciale"),
    text("nature_culture_speciale"),
    real("surface_terrain"),
    real("longitude"),
    real("latitude"),
];

static COLUMN_TYPES: Lazy<HashMap<&'static str, ColumnType>> =
    Lazy::new(|| COLUMNS.iter().map(|column| (column.name, column.ty)).collect());

/// Declared type of a column, if it belongs to the schema.
pub fn column_type(name: &str) -> Option<ColumnType> {
    COLUMN_TYPES.get(name).copied()
}

/// Comma-separated column list for SELECT and INSERT statements.
pub fn column_list() -> String {
    COLUMNS
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(", ")
}
