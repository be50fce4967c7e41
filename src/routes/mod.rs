use axum::{routing::get, Router};

use crate::state::AppState;

pub mod common;
pub mod guard;

mod auth;
mod cart;
mod menu;
mod payment;
mod stats;
mod users;


async fn root_handler() -> &'static str {
    "bistro server is running"
}

pub fn api_router(state: AppState) -> Router {
    // merge all routes here; guards are declared per handler
    Router::new()
        .route("/", get(root_handler))
        .merge(auth::auth_router())
        .merge(users::users_router())
        .merge(menu::menu_router())
        .merge(cart::cart_router())
        .merge(payment::payment_router())
        .merge(stats::stats_router())
        .with_state(state)
}
