pub mod overrides;
pub mod reports;
pub mod stats;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(reports::routes())
        .merge(stats::routes())
        .merge(overrides::routes())
}
