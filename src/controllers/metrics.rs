use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::bulletin::{BulletinService, BulletinServiceApi, DetailedMetrics, MetricsSummary};

const DEFAULT_RECENT: usize = 20;
const MAX_RECENT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub recent: Option<usize>,
}

/// GET /metrics - Generation counts, success rate, latency and timing accuracy
pub async fn metrics(State(service): State<Arc<BulletinService>>) -> Json<MetricsSummary> {
    Json(service.metrics_summary().await)
}

/// GET /performance - Summary plus per-preset breakdown and recent generations
pub async fn performance(
    State(service): State<Arc<BulletinService>>,
    Query(query): Query<PerformanceQuery>,
) -> Json<DetailedMetrics> {
    let recent = query.recent.unwrap_or(DEFAULT_RECENT).min(MAX_RECENT);
    Json(service.detailed_metrics(recent).await)
}
