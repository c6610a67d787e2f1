use dvf_core::storage::Storage;
use std::sync::Arc;

/// Shared handler state. The storage handle is constructed in `main` and
/// passed explicitly; there is no process-wide connection global.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}
