//! reports.rs
//!
//! Граница "скрейпер -> ядро": адаптеры источников присылают сюда уже
//! распарсенные отчёты о секторах. Никакого разбора HTML/JSON источников
//! здесь нет - отчёт обязан приходить в каноническом виде.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::models::{Vendor, VendorReport};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{id}/reports/{vendor}", put(submit_report))
        .route("/events/{id}/reports", delete(clear_reports))
}

/// PUT /api/events/{id}/reports/{vendor}
///
/// Кладёт отчёт источника в кеш скрейпа. Пустой список секторов - валидный
/// отчёт ("источник недоступен"), а не ошибка.
async fn submit_report(
    State(state): State<Arc<AppState>>,
    Path((event_id, vendor)): Path<(String, String)>,
    Json(report): Json<VendorReport>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Some(vendor) = Vendor::parse(&vendor) else {
        return Err((StatusCode::BAD_REQUEST, format!("Unknown vendor: {vendor}")));
    };

    let sectors = report.sectors.len();
    state.cache.put(&event_id, vendor, report).await;
    info!("Stored report for event {} from {}: {} sectors", event_id, vendor, sectors);

    Ok(Json(json!({
        "success": true,
        "vendor": vendor,
        "sectors": sectors
    })))
}

/// DELETE /api/events/{id}/reports - сброс кеша скрейпа по событию.
/// Ручные правки при этом переживают сброс, у них свой жизненный цикл.
async fn clear_reports(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    state.cache.clear(&event_id).await;
    Json(json!({ "success": true }))
}
