use axum::{extract::State, routing::get, Json, Router};

use super::guard::AdminOnly;
use crate::{
    error::ApiResult,
    models::{AdminStats, OrderStat},
    state::AppState,
};

// GET /admin-stats
async fn admin_stats(AdminOnly(_): AdminOnly, State(state): State<AppState>) -> ApiResult<Json<AdminStats>> {
    Ok(Json(state.store.admin_stats().await?))
}

// GET /order-stats
async fn order_stats(AdminOnly(_): AdminOnly, State(state): State<AppState>) -> ApiResult<Json<Vec<OrderStat>>> {
    Ok(Json(state.store.order_stats().await?))
}

pub fn stats_router() -> Router<AppState> {
    Router::new()
        .route("/admin-stats", get(admin_stats))
        .route("/order-stats", get(order_stats))
}
