use serde::Deserialize;

/// Query parameters for the single-ville average endpoints.
#[derive(Debug, Deserialize)]
pub struct VilleQuery {
    pub nom_ville: String,
}

/// Query parameters for the per-commune surface endpoints.
#[derive(Debug, Deserialize)]
pub struct CommuneQuery {
    pub nom_commune: String,
}

/// Comma-separated commune list for the multi-ville endpoint.
#[derive(Debug, Deserialize)]
pub struct VillesQuery {
    pub villes: String,
}
