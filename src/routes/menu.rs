use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use mongodb::bson::Document;
use tracing::info;

use super::{
    common::{documents_response, parse_object_id, JsonBody},
    guard::AdminOnly,
};
use crate::{
    error::ApiResult,
    models::{DeleteAck, InsertAck},
    state::AppState,
};

// GET /menu
async fn list_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(documents_response(state.store.list_menu().await?))
}

// POST /menu
async fn add_menu_item(
    AdminOnly(claims): AdminOnly,
    State(state): State<AppState>,
    JsonBody(item): JsonBody<Document>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.insert_menu_item(item).await?;
    info!("{} added menu item {}", claims.email, ack.inserted_id);
    Ok(Json(ack))
}

// DELETE /menu/{id}
async fn delete_menu_item(
    AdminOnly(claims): AdminOnly,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<DeleteAck>> {
    let id = parse_object_id(&id)?;
    let ack = state.store.delete_menu_item(id).await?;
    info!("{} deleted menu item {id} ({} removed)", claims.email, ack.deleted_count);
    Ok(Json(ack))
}

// GET /reviews
async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(documents_response(state.store.list_reviews().await?))
}

pub fn menu_router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(add_menu_item))
        .route("/menu/{id}", delete(delete_menu_item))
        .route("/reviews", get(list_reviews))
}
