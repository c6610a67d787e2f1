use dvf_core::storage::{DatabaseStorage, DwellingFilter, Storage};
use dvf_core::{DatabaseManager, DvfRecord};
use tempfile::tempdir;

async fn storage_in(dir: &tempfile::TempDir) -> DatabaseStorage {
    let manager = DatabaseManager::open(dir.path().join("dvf.db"))
        .await
        .expect("failed to open database");
    DatabaseStorage::new(manager)
        .await
        .expect("failed to run migrations")
}

fn sale(
    id_mutation: &str,
    nom_commune: &str,
    type_local: &str,
    valeur_fonciere: Option<f64>,
    surface_reelle_bati: Option<f64>,
) -> DvfRecord {
    DvfRecord {
        id_mutation: id_mutation.to_string(),
        nature_mutation: Some("Vente".to_string()),
        nom_commune: Some(nom_commune.to_string()),
        type_local: Some(type_local.to_string()),
        valeur_fonciere,
        surface_reelle_bati,
        ..Default::default()
    }
}

#[tokio::test]
async fn average_price_matches_the_worked_example() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![sale(
            "2023-1",
            "Lyon",
            "Maison",
            Some(150_000.0),
            Some(50.0),
        )])
        .await
        .unwrap();

    let average = storage
        .average_price_per_m2_for_commune("Lyon", DwellingFilter::Houses)
        .await
        .unwrap();
    assert_eq!(average, Some(3000.0));
}

#[tokio::test]
async fn null_or_zero_surface_rows_stay_out_of_the_average() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
            sale("2023-2", "Lyon", "Maison", Some(999_999.0), None),
            sale("2023-3", "Lyon", "Maison", Some(999_999.0), Some(0.0)),
        ])
        .await
        .unwrap();

    let average = storage
        .average_price_per_m2_for_commune("Lyon", DwellingFilter::Houses)
        .await
        .unwrap();
    assert_eq!(average, Some(3000.0));
}

#[tokio::test]
async fn commune_without_qualifying_sale_yields_none() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![sale(
            "2023-1",
            "Lyon",
            "Maison",
            Some(150_000.0),
            Some(50.0),
        )])
        .await
        .unwrap();

    let average = storage
        .average_price_per_m2_for_commune("Paris", DwellingFilter::Houses)
        .await
        .unwrap();
    assert_eq!(average, None);
}

#[tokio::test]
async fn non_sale_mutations_are_filtered_out() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let mut exchange = sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0));
    exchange.nature_mutation = Some("Echange".to_string());

    storage.load_records(vec![exchange]).await.unwrap();

    let average = storage
        .average_price_per_m2_for_commune("Lyon", DwellingFilter::Houses)
        .await
        .unwrap();
    assert_eq!(average, None);
}

#[tokio::test]
async fn any_dwelling_filter_matches_both_types() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(100_000.0), Some(50.0)),
            sale("2023-2", "Lyon", "Appartement", Some(200_000.0), Some(50.0)),
            sale("2023-3", "Lyon", "Local industriel", Some(900_000.0), Some(50.0)),
        ])
        .await
        .unwrap();

    // (2000 + 4000) / 2; the industrial sale never enters the average
    let average = storage
        .average_price_per_m2_for_commune("Lyon", DwellingFilter::Any)
        .await
        .unwrap();
    assert_eq!(average, Some(3000.0));
}

#[tokio::test]
async fn per_commune_listing_covers_every_commune() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
            sale("2023-2", "Annecy", "Appartement", Some(200_000.0), Some(40.0)),
        ])
        .await
        .unwrap();

    let averages = storage.average_price_per_m2_by_commune().await.unwrap();
    assert_eq!(
        averages,
        vec![("Annecy".to_string(), 5000.0), ("Lyon".to_string(), 3000.0)]
    );
}

#[tokio::test]
async fn land_average_excludes_rows_without_land() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let mut with_land = sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0));
    with_land.surface_terrain = Some(300.0);
    let without_land = sale("2023-2", "Lyon", "Maison", Some(120_000.0), Some(45.0));

    storage
        .load_records(vec![with_land, without_land])
        .await
        .unwrap();

    // The landless row is out of both sum and count: 300, not 150
    let average = storage.average_land_area_for_houses("Lyon").await.unwrap();
    assert_eq!(average, Some(300.0));
}

#[tokio::test]
async fn duplicate_identifiers_keep_the_first_row() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let summary = storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
            sale("2023-1", "Paris", "Maison", Some(999_999.0), Some(10.0)),
        ])
        .await
        .unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped_duplicates, 1);

    let record = storage.get_record("2023-1").await.unwrap().unwrap();
    assert_eq!(record.nom_commune.as_deref(), Some("Lyon"));
    assert_eq!(record.valeur_fonciere, Some(150_000.0));
}

#[tokio::test]
async fn reloading_the_same_batch_inserts_nothing() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let batch = vec![
        sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
        sale("2023-2", "Lyon", "Appartement", Some(90_000.0), Some(30.0)),
    ];

    storage.load_records(batch.clone()).await.unwrap();
    let second = storage.load_records(batch).await.unwrap();

    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_duplicates, 2);
    assert_eq!(storage.count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn postal_code_lookup_returns_full_rows() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    let mut record = sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0));
    record.code_postal = Some("69001".to_string());
    record.nombre_pieces_principales = Some(4);

    storage.load_records(vec![record]).await.unwrap();

    let rows = storage.records_by_postal_code("69001").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id_mutation, "2023-1");
    assert_eq!(rows[0].nombre_pieces_principales, Some(4));
    assert_eq!(rows[0].longitude, None);

    assert!(storage
        .records_by_postal_code("75001")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn house_listing_filters_by_type() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
            sale("2023-2", "Lyon", "Appartement", Some(90_000.0), Some(30.0)),
        ])
        .await
        .unwrap();

    let houses = storage.houses_for_commune("Lyon").await.unwrap();
    assert_eq!(houses.len(), 1);
    assert_eq!(houses[0].type_local.as_deref(), Some("Maison"));
}

#[tokio::test]
async fn built_area_average_per_dwelling_type() {
    let dir = tempdir().unwrap();
    let storage = storage_in(&dir).await;

    storage
        .load_records(vec![
            sale("2023-1", "Lyon", "Maison", Some(150_000.0), Some(50.0)),
            sale("2023-2", "Lyon", "Maison", Some(200_000.0), Some(70.0)),
            sale("2023-3", "Lyon", "Appartement", Some(90_000.0), Some(30.0)),
        ])
        .await
        .unwrap();

    let houses = storage
        .average_built_area_for_commune("Lyon", DwellingFilter::Houses)
        .await
        .unwrap();
    assert_eq!(houses, Some(60.0));

    let apartments = storage
        .average_built_area_for_commune("Lyon", DwellingFilter::Apartments)
        .await
        .unwrap();
    assert_eq!(apartments, Some(30.0));
}
