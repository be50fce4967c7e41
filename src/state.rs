use std::sync::Arc;

use crate::{payment::PaymentGateway, store::Store, token::TokenService};

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub payments: Arc<dyn PaymentGateway>,
    pub currency: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        payments: Arc<dyn PaymentGateway>,
        currency: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            payments,
            currency: currency.into(),
        }
    }
}
