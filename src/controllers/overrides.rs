//! overrides.rs
//!
//! Ручные правки оператора и схема зала с их учётом. Правки хранятся
//! отдельно от данных скрейпа и применяются поверх живого статуса по
//! фиксированному стеку приоритетов (см. `core::overrides`).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::core::overrides::merge;
use crate::models::{OverrideMap, ResolvedSeat};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/events/{id}/overrides",
            get(get_overrides).put(put_overrides).delete(clear_overrides),
        )
        .route("/events/{id}/seatmap", get(get_seatmap))
}

/// GET /api/events/{id}/overrides
async fn get_overrides(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    Json(state.overrides.load(&event_id).await)
}

/// PUT /api/events/{id}/overrides - карта правок целиком (single-writer).
async fn put_overrides(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(overrides): Json<OverrideMap>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.overrides.save(&event_id, &overrides).await.map_err(|e| {
        tracing::error!("Failed to save overrides for event {}: {}", event_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save overrides".to_string())
    })?;

    info!("Saved {} overrides for event {}", overrides.seats.len(), event_id);
    Ok(Json(json!({ "success": true, "count": overrides.seats.len() })))
}

/// DELETE /api/events/{id}/overrides
async fn clear_overrides(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.overrides.clear(&event_id).await.map_err(|e| {
        tracing::error!("Failed to clear overrides for event {}: {}", event_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear overrides".to_string())
    })?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/events/{id}/seatmap
///
/// Объединённый вид по секторам с применёнными правками - то, что рисует
/// интерфейс. Снимок продаж при этом не трогается, чтобы не обнулять дельту
/// следующего запроса статистики.
async fn get_seatmap(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let stats = super::stats::compute_stats(&state, &event_id, false).await?;
    let overrides = state.overrides.load(&event_id).await;

    let mut sectors = stats.sectors;
    for view in &mut sectors {
        for (seat_key, resolved) in view.seats.iter_mut() {
            if let Some(entry) = overrides.seats.get(seat_key) {
                let (class, vendor) = merge(resolved.class, resolved.vendor, entry.class, entry.vendor);
                *resolved = ResolvedSeat { class, vendor };
            }
        }
    }

    Ok(Json(json!({
        "eventId": event_id,
        "sectors": sectors,
        "combinedTotals": stats.combined_totals
    })))
}
