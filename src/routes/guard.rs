//! Request guards.
//!
//! Guards are extractors: axum runs a handler's extractors in argument order,
//! and the first one to reject short-circuits the request with its
//! [`AppError`]. A handler opts in by naming [`Authenticated`] or
//! [`AdminOnly`] among its arguments.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use super::common::bearer_token;
use crate::{error::AppError, models::ADMIN_ROLE, state::AppState, store::document::get_string, token::Claims};

/// A request carrying a valid, unexpired token.
pub struct Authenticated(pub Claims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self(claims.clone()));
        }

        let token = bearer_token(&parts.headers)
            .ok_or(AppError::Unauthorized("unauthorized access"))?
            .ok_or(AppError::Forbidden("unauthorized access"))?;
        let claims = state.tokens.verify(&token).map_err(|e| {
            debug!("Rejected token: {e}");
            AppError::Forbidden("unauthorized access")
        })?;

        parts.extensions.insert(claims.clone());
        Ok(Self(claims))
    }
}

/// An authenticated request whose user record has the admin role.
pub struct AdminOnly(pub Claims);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;

        let user = state.store.find_user_by_email(&claims.email).await?;
        let is_admin = user
            .as_ref()
            .and_then(|user| get_string(user, "role"))
            .is_some_and(|role| role == ADMIN_ROLE);
        if !is_admin {
            debug!("{} is not an admin", claims.email);
            return Err(AppError::Forbidden("forbidden access"));
        }

        Ok(Self(claims))
    }
}
