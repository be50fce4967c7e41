use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use mongodb::bson::{doc, Bson, Document};
use serde::Deserialize;
use tracing::info;

use super::{
    common::{documents_response, parse_object_id, EmailQuery, JsonBody},
    guard::Authenticated,
};
use crate::{
    error::{ApiResult, AppError},
    models::PaymentReceipt,
    payment::to_minor_units,
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct IntentRequest {
    price: f64,
}

// POST /create-payment-intent
async fn create_payment_intent(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<IntentRequest>,
) -> ApiResult<Json<Document>> {
    let amount = to_minor_units(request.price);
    let intent = state.payments.create_intent(amount, &state.currency).await?;
    info!("Created payment intent {} for {} ({amount} {})", intent.id, claims.email, state.currency);
    Ok(Json(doc! { "clientSecret": intent.client_secret }))
}

// POST /payment
//
// The payment insert and the cart cleanup are separate writes; a failure in
// between leaves the purchased items in the cart.
async fn record_payment(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    JsonBody(payment): JsonBody<Document>,
) -> ApiResult<Json<PaymentReceipt>> {
    let cart_ids = match payment.get("cartItems") {
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| match item {
                Bson::String(id) => parse_object_id(id),
                Bson::ObjectId(id) => Ok(*id),
                other => Err(AppError::BadRequest(format!("invalid cart item id: {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(AppError::BadRequest(format!("cartItems must be an array, got {other}"))),
        None => Vec::new(),
    };

    let insert_result = state.store.insert_payment(payment).await?;
    let delete_result = state.store.delete_cart_items(&cart_ids).await?;
    info!(
        "{} paid: payment {}, {} cart items cleared",
        claims.email, insert_result.inserted_id, delete_result.deleted_count
    );

    Ok(Json(PaymentReceipt { insert_result, delete_result }))
}

// GET /payment-history?email=
async fn payment_history(Query(query): Query<EmailQuery>, State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    Ok(documents_response(state.store.list_payments(email).await?))
}

pub fn payment_router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payment", post(record_payment))
        .route("/payment-history", get(payment_history))
}
