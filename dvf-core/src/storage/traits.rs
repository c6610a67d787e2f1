use crate::common::error::Result;
use crate::domain::DvfRecord;
use async_trait::async_trait;

/// Which dwelling types an aggregate query considers.
///
/// `Any` matches either dwelling type; sales of bare land, outbuildings and
/// commercial premises never enter a per-m² average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellingFilter {
    Houses,
    Apartments,
    Any,
}

impl DwellingFilter {
    /// SQL predicate over `type_local`.
    pub(crate) fn predicate(self) -> &'static str {
        match self {
            DwellingFilter::Houses => "type_local = 'Maison'",
            DwellingFilter::Apartments => "type_local = 'Appartement'",
            DwellingFilter::Any => "type_local IN ('Maison', 'Appartement')",
        }
    }
}

/// Read side of the DVF store. The table is loaded once at startup and
/// never mutated by these operations.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Average price per square meter for every commune with at least one
    /// qualifying sale.
    async fn average_price_per_m2_by_commune(&self) -> Result<Vec<(String, f64)>>;

    /// Average price per square meter for one commune, restricted to `filter`.
    /// `None` means no qualifying sale was recorded for that commune.
    async fn average_price_per_m2_for_commune(
        &self,
        nom_commune: &str,
        filter: DwellingFilter,
    ) -> Result<Option<f64>>;

    /// Mean built area for one commune, restricted to `filter`.
    async fn average_built_area_for_commune(
        &self,
        nom_commune: &str,
        filter: DwellingFilter,
    ) -> Result<Option<f64>>;

    /// Mean land area for house sales in one commune. Rows without a land
    /// area stay out of both the sum and the count.
    async fn average_land_area_for_houses(&self, nom_commune: &str) -> Result<Option<f64>>;

    /// Every row recorded for a postal code.
    async fn records_by_postal_code(&self, code_postal: &str) -> Result<Vec<DvfRecord>>;

    /// Every house row recorded for a commune.
    async fn houses_for_commune(&self, nom_commune: &str) -> Result<Vec<DvfRecord>>;

    /// Number of rows currently in the store.
    async fn count_records(&self) -> Result<u64>;
}
