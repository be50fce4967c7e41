use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use mongodb::bson::Document;
use tracing::debug;

use super::{
    common::{documents_response, parse_object_id, EmailQuery, JsonBody},
    guard::Authenticated,
};
use crate::{
    error::{ApiResult, AppError},
    models::{DeleteAck, InsertAck},
    state::AppState,
};

// POST /carts
async fn add_to_cart(State(state): State<AppState>, JsonBody(item): JsonBody<Document>) -> ApiResult<Json<InsertAck>> {
    Ok(Json(state.store.insert_cart_item(item).await?))
}

// GET /carts?email=
async fn list_cart(
    Authenticated(claims): Authenticated,
    Query(query): Query<EmailQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Document>>> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };

    if email != claims.email {
        debug!("{} asked for the cart of {email}", claims.email);
        return Err(AppError::Forbidden("forbidden access"));
    }

    Ok(documents_response(state.store.list_cart_items(email).await?))
}

// DELETE /carts/{id}
// Ownership is not checked; anyone holding the id can remove the item.
async fn delete_cart_item(Path(id): Path<String>, State(state): State<AppState>) -> ApiResult<Json<DeleteAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.store.delete_cart_item(id).await?))
}

pub fn cart_router() -> Router<AppState> {
    Router::new()
        .route("/carts", get(list_cart).post(add_to_cart))
        .route("/carts/{id}", delete(delete_cart_item))
}
