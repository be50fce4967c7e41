use axum::{extract::State, routing::post, Json, Router};
use mongodb::bson::{doc, Document};

use super::common::JsonBody;
use crate::{error::ApiResult, state::AppState, token::TokenPayload};

// POST /jwt
async fn issue_token(State(state): State<AppState>, JsonBody(payload): JsonBody<TokenPayload>) -> ApiResult<Json<Document>> {
    let token = state.tokens.issue(payload)?;
    Ok(Json(doc! { "token": token }))
}

pub fn auth_router() -> Router<AppState> {
    Router::new().route("/jwt", post(issue_token))
}
