//! Signed, time-limited identity tokens (HS256 JWT).
//!
//! Tokens carry whatever the client sent to `POST /jwt` plus `iat`/`exp`. The
//! only claim the server relies on is `email`.

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const TOKEN_TTL_SECS: u64 = 60 * 60;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Body of `POST /jwt`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    pub fn issue(&self, payload: TokenPayload) -> Result<String, TokenError> {
        self.issue_at(payload, get_current_timestamp())
    }

    /// Issues a token as if it had been signed at `issued_at` (unix seconds).
    pub fn issue_at(&self, payload: TokenPayload, issued_at: u64) -> Result<String, TokenError> {
        let TokenPayload { email, mut extra } = payload;
        // client-supplied timing fields would shadow ours
        extra.remove("iat");
        extra.remove("exp");

        let claims = Claims {
            email,
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
            extra,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
