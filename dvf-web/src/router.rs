use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::handlers::{
    dvf_par_code_postal, health, maisons_par_commune, moyenne_m2_appartement, moyenne_m2_maison,
    moyenne_m2_terrain_maison, prix_moyen_m2, prix_moyen_m2_appartements, prix_moyen_m2_maisons,
    prix_moyen_m2_ville, prix_moyen_m2_villes,
};
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prix-moyen-m2/", get(prix_moyen_m2))
        .route("/dvf/:code_postal", get(dvf_par_code_postal))
        .route("/prix-moyen-m2-par-ville-maisons/", get(prix_moyen_m2_maisons))
        .route(
            "/prix-moyen-m2-par-ville-appartement/",
            get(prix_moyen_m2_appartements),
        )
        .route("/prix-moyen-m2-par-ville/", get(prix_moyen_m2_ville))
        .route("/prix-moyen-m2-par-villes/", get(prix_moyen_m2_villes))
        .route("/moyenne-m2-maison-par-commune/", get(moyenne_m2_maison))
        .route(
            "/moyenne-m2-appartement-par-commune/",
            get(moyenne_m2_appartement),
        )
        .route(
            "/moyenne-m2-terrain-maison-par-commune/",
            get(moyenne_m2_terrain_maison),
        )
        .route("/maisons-par-commune/", get(maisons_par_commune))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
