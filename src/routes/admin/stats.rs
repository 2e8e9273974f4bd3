use axum::{Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{ActivityLog, DashboardStats, SalesChartResponse},
    queries::{activity_queries, stats_queries},
};

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = stats_queries::dashboard(&state.db).await?;

    Ok(Json(stats))
}

pub async fn sales_chart(State(state): State<AppState>) -> Result<Json<SalesChartResponse>> {
    let points = stats_queries::sales_chart(&state.db).await?;

    Ok(Json(SalesChartResponse { points }))
}

pub async fn recent_activity(State(state): State<AppState>) -> Result<Json<Vec<ActivityLog>>> {
    let entries = activity_queries::recent_activity(&state.db, 100).await?;

    Ok(Json(entries))
}
