use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use dvf_core::domain::DvfRecord;
use dvf_core::storage::DwellingFilter;

use crate::error::ApiError;
use crate::models::{CommuneQuery, VilleQuery, VillesQuery};
use crate::state::AppState;

pub async fn health() -> &'static str {
    "OK"
}

/// GET /prix-moyen-m2/ — average price per m² for every commune.
pub async fn prix_moyen_m2(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let averages = state.storage.average_price_per_m2_by_commune().await?;
    Ok(Json(averages.into_iter().collect()))
}

/// GET /dvf/:code_postal — every row recorded for a postal code.
pub async fn dvf_par_code_postal(
    State(state): State<AppState>,
    Path(code_postal): Path<String>,
) -> Result<Json<Vec<DvfRecord>>, ApiError> {
    let records = state.storage.records_by_postal_code(&code_postal).await?;
    if records.is_empty() {
        return Err(ApiError::not_found(format!(
            "No mutation recorded for postal code {code_postal}"
        )));
    }
    Ok(Json(records))
}

async fn prix_moyen_for(
    state: &AppState,
    nom_ville: &str,
    filter: DwellingFilter,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    match state
        .storage
        .average_price_per_m2_for_commune(nom_ville, filter)
        .await?
    {
        Some(average) => {
            let mut body = BTreeMap::new();
            body.insert(nom_ville.to_string(), average);
            Ok(Json(body))
        }
        None => Err(ApiError::not_found(format!(
            "No qualifying sale found for {nom_ville}"
        ))),
    }
}

/// GET /prix-moyen-m2-par-ville-maisons/
pub async fn prix_moyen_m2_maisons(
    State(state): State<AppState>,
    Query(query): Query<VilleQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    prix_moyen_for(&state, &query.nom_ville, DwellingFilter::Houses).await
}

/// GET /prix-moyen-m2-par-ville-appartement/
pub async fn prix_moyen_m2_appartements(
    State(state): State<AppState>,
    Query(query): Query<VilleQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    prix_moyen_for(&state, &query.nom_ville, DwellingFilter::Apartments).await
}

/// GET /prix-moyen-m2-par-ville/ — either dwelling type.
pub async fn prix_moyen_m2_ville(
    State(state): State<AppState>,
    Query(query): Query<VilleQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    prix_moyen_for(&state, &query.nom_ville, DwellingFilter::Any).await
}

/// GET /prix-moyen-m2-par-villes/ — one entry per requested commune,
/// null for communes without a qualifying sale. Always 200.
pub async fn prix_moyen_m2_villes(
    State(state): State<AppState>,
    Query(query): Query<VillesQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let mut body = Map::new();
    for ville in query
        .villes
        .split(',')
        .map(str::trim)
        .filter(|ville| !ville.is_empty())
    {
        let average = state
            .storage
            .average_price_per_m2_for_commune(ville, DwellingFilter::Any)
            .await?;
        body.insert(
            ville.to_string(),
            average.map_or(Value::Null, Value::from),
        );
    }
    Ok(Json(body))
}

async fn moyenne_surface_for(
    state: &AppState,
    nom_commune: &str,
    filter: DwellingFilter,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    match state
        .storage
        .average_built_area_for_commune(nom_commune, filter)
        .await?
    {
        Some(average) => {
            let mut body = BTreeMap::new();
            body.insert(nom_commune.to_string(), average);
            Ok(Json(body))
        }
        None => Err(ApiError::not_found(format!(
            "No qualifying sale found for {nom_commune}"
        ))),
    }
}

/// GET /moyenne-m2-maison-par-commune/
pub async fn moyenne_m2_maison(
    State(state): State<AppState>,
    Query(query): Query<CommuneQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    moyenne_surface_for(&state, &query.nom_commune, DwellingFilter::Houses).await
}

/// GET /moyenne-m2-appartement-par-commune/
pub async fn moyenne_m2_appartement(
    State(state): State<AppState>,
    Query(query): Query<CommuneQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    moyenne_surface_for(&state, &query.nom_commune, DwellingFilter::Apartments).await
}

/// GET /moyenne-m2-terrain-maison-par-commune/
pub async fn moyenne_m2_terrain_maison(
    State(state): State<AppState>,
    Query(query): Query<CommuneQuery>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    match state
        .storage
        .average_land_area_for_houses(&query.nom_commune)
        .await?
    {
        Some(average) => {
            let mut body = BTreeMap::new();
            body.insert(query.nom_commune, average);
            Ok(Json(body))
        }
        None => Err(ApiError::not_found(format!(
            "No house sale with a land area found for {}",
            query.nom_commune
        ))),
    }
}

/// GET /maisons-par-commune/ — raw house rows for one commune.
pub async fn maisons_par_commune(
    State(state): State<AppState>,
    Query(query): Query<CommuneQuery>,
) -> Result<Json<Vec<DvfRecord>>, ApiError> {
    let records = state.storage.houses_for_commune(&query.nom_commune).await?;
    if records.is_empty() {
        return Err(ApiError::not_found(format!(
            "No house sale recorded for {}",
            query.nom_commune
        )));
    }
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dvf_core::common::error::Result as CoreResult;
    use dvf_core::storage::Storage;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Canned storage: one average per commune, no rows.
    struct MockStorage {
        averages: HashMap<String, f64>,
    }

    impl MockStorage {
        fn with_lyon() -> Self {
            let mut averages = HashMap::new();
            averages.insert("Lyon".to_string(), 3000.0);
            Self { averages }
        }
    }

    #[async_trait]
    impl Storage for MockStorage {
        async fn average_price_per_m2_by_commune(&self) -> CoreResult<Vec<(String, f64)>> {
            let mut averages: Vec<_> = self
                .averages
                .iter()
                .map(|(commune, average)| (commune.clone(), *average))
                .collect();
            averages.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(averages)
        }

        async fn average_price_per_m2_for_commune(
            &self,
            nom_commune: &str,
            _filter: DwellingFilter,
        ) -> CoreResult<Option<f64>> {
            Ok(self.averages.get(nom_commune).copied())
        }

        async fn average_built_area_for_commune(
            &self,
            nom_commune: &str,
            _filter: DwellingFilter,
        ) -> CoreResult<Option<f64>> {
            Ok(self.averages.get(nom_commune).map(|_| 50.0))
        }

        async fn average_land_area_for_houses(
            &self,
            nom_commune: &str,
        ) -> CoreResult<Option<f64>> {
            Ok(self.averages.get(nom_commune).map(|_| 300.0))
        }

        async fn records_by_postal_code(&self, _code_postal: &str) -> CoreResult<Vec<DvfRecord>> {
            Ok(Vec::new())
        }

        async fn houses_for_commune(&self, _nom_commune: &str) -> CoreResult<Vec<DvfRecord>> {
            Ok(Vec::new())
        }

        async fn count_records(&self) -> CoreResult<u64> {
            Ok(self.averages.len() as u64)
        }
    }

    fn state() -> AppState {
        AppState {
            storage: Arc::new(MockStorage::with_lyon()),
        }
    }

    #[tokio::test]
    async fn known_commune_returns_its_average() {
        let query = Query(VilleQuery {
            nom_ville: "Lyon".to_string(),
        });

        let Json(body) = prix_moyen_m2_maisons(State(state()), query).await.unwrap();
        assert_eq!(body.get("Lyon"), Some(&3000.0));
    }

    #[tokio::test]
    async fn unknown_commune_is_not_found() {
        let query = Query(VilleQuery {
            nom_ville: "Nulle-Part".to_string(),
        });

        let err = prix_moyen_m2_ville(State(state()), query).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn multi_ville_reports_null_for_unmatched_names() {
        let query = Query(VillesQuery {
            villes: "Lyon, Nulle-Part".to_string(),
        });

        let Json(body) = prix_moyen_m2_villes(State(state()), query).await.unwrap();
        assert_eq!(body.get("Lyon"), Some(&Value::from(3000.0)));
        assert_eq!(body.get("Nulle-Part"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn empty_postal_code_result_is_not_found() {
        let err = dvf_par_code_postal(State(state()), Path("75001".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_house_listing_is_not_found() {
        let query = Query(CommuneQuery {
            nom_commune: "Lyon".to_string(),
        });

        let err = maisons_par_commune(State(state()), query).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
