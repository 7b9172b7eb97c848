//! Dashboard statistics endpoint

use api_types::stats::DailyStats;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Day to roll up; defaults to today.
    date: Option<NaiveDate>,
}

pub async fn daily(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DailyStats>, ServerError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let stats = state.engine.daily_stats(date).await?;
    Ok(Json(DailyStats {
        vehicle_count: stats.vehicle_count,
        active_jobs: stats.active_jobs,
        total_revenue: stats.total_revenue.minor(),
        pending_payments: stats.pending_payments.minor(),
    }))
}
