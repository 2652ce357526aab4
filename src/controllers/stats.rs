//! stats.rs
//!
//! Запрос объединённой статистики по событию. Один запрос = один полный
//! проход сверки над свежими отчётами из кеша, под пер-событийным замком
//! (проход делает read-modify-write по истории и снимку).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::core::pipeline::{self, PipelineInput};
use crate::models::CombinedEventStats;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{id}/stats", get(get_stats))
        .route("/events/{id}/history", delete(reset_history))
}

/// GET /api/events/{id}/stats
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let stats = compute_stats(&state, &event_id, true).await?;
    Ok(Json(stats))
}

/// Полный проход сверки. `persist_snapshot` выключается для вспомогательных
/// запросов (схема зала), чтобы они не обнуляли дельту продаж следующего
/// основного запроса.
pub(crate) async fn compute_stats(
    state: &Arc<AppState>,
    event_id: &str,
    persist_snapshot: bool,
) -> Result<CombinedEventStats, (StatusCode, String)> {
    let _guard = state.lock_event(event_id).await;

    let reports = state.cache.fresh(event_id).await;
    let history = state.history.load(event_id).await;
    let snapshot = state.snapshots.load(event_id).await;

    let out = pipeline::run(PipelineInput {
        reports,
        history,
        snapshot,
        now: Utc::now(),
    });

    state.history.save(event_id, &out.history).await.map_err(|e| {
        tracing::error!("Failed to save history for event {}: {}", event_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save seat history".to_string())
    })?;

    if persist_snapshot {
        state.snapshots.save(event_id, &out.snapshot).await.map_err(|e| {
            tracing::error!("Failed to save snapshot for event {}: {}", event_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save stats snapshot".to_string())
        })?;
    }

    info!(
        "Stats for event {}: {} seats, {} free, {} inferred sold",
        event_id,
        out.stats.combined_totals.total,
        out.stats.combined_totals.free,
        out.stats.inferred_sold.len()
    );

    Ok(out.stats)
}

/// DELETE /api/events/{id}/history - явный сброс истории и снимка.
async fn reset_history(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let _guard = state.lock_event(&event_id).await;

    state.history.clear(&event_id).await.map_err(|e| {
        tracing::error!("Failed to clear history for event {}: {}", event_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear history".to_string())
    })?;
    state.snapshots.clear(&event_id).await.map_err(|e| {
        tracing::error!("Failed to clear snapshot for event {}: {}", event_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear snapshot".to_string())
    })?;

    info!("History reset for event {}", event_id);
    Ok(Json(json!({ "success": true })))
}
