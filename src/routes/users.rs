use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use mongodb::bson::{doc, Document};
use tracing::info;

use super::{
    common::{documents_response, parse_object_id, JsonBody},
    guard::{AdminOnly, Authenticated},
};
use crate::{
    error::{ApiResult, AppError},
    models::{DeleteAck, UpdateAck, ADMIN_ROLE},
    state::AppState,
    store::document::get_string,
};

// POST /users
// Lookup-then-insert is not atomic: concurrent sign-ins with one email can both insert.
async fn create_user(State(state): State<AppState>, JsonBody(user): JsonBody<Document>) -> ApiResult<Response> {
    let email = get_string(&user, "email").ok_or_else(|| AppError::BadRequest("email required".to_string()))?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Ok(Json(doc! { "ex": "user already exists" }).into_response());
    }

    let ack = state.store.insert_user(user).await?;
    info!("Created user {email}");
    Ok(Json(ack).into_response())
}

// GET /users
async fn list_users(AdminOnly(_): AdminOnly, State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(documents_response(state.store.list_users().await?))
}

// DELETE /users/{id}
async fn delete_user(Path(id): Path<String>, State(state): State<AppState>) -> ApiResult<Json<DeleteAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.store.delete_user(id).await?))
}

// PATCH /users/admin/{id}
async fn promote_user(Path(id): Path<String>, State(state): State<AppState>) -> ApiResult<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    let ack = state.store.promote_user(id).await?;
    info!("Promoted user {id} to admin (matched {})", ack.matched_count);
    Ok(Json(ack))
}

// GET /users/admin/{email}
async fn check_admin(
    Authenticated(claims): Authenticated,
    Path(email): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<Document>> {
    if claims.email != email {
        return Ok(Json(doc! { "admin": false }));
    }

    let user = state.store.find_user_by_email(&email).await?;
    let admin = user
        .as_ref()
        .and_then(|user| get_string(user, "role"))
        .is_some_and(|role| role == ADMIN_ROLE);
    Ok(Json(doc! { "admin": admin }))
}

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        // one pattern serves both: the segment is a user id for PATCH and an email for GET
        .route("/users/admin/{key}", get(check_admin).patch(promote_user))
}
