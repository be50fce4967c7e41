use axum::{
    extract::FromRequest,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::Deserialize;

use crate::error::AppError;

/// JSON body extractor whose rejections render as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The requested email; `?email=` with an empty value counts as absent.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("invalid id: {id}")))
}

/// Credential part of the `Authorization` header.
///
/// `None` when the header is missing, `Some(None)` when it is present but has
/// no second word.
pub fn bearer_token(headers: &HeaderMap) -> Option<Option<String>> {
    let header = headers.get(AUTHORIZATION)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string());
    Some(token)
}

fn public_bson(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Document(doc) => Bson::Document(public_document(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(public_bson).collect()),
        other => other,
    }
}

/// Renders ObjectIds as plain hex strings so clients can send them back in paths.
pub fn public_document(doc: Document) -> Document {
    doc.into_iter().map(|(key, value)| (key, public_bson(value))).collect()
}

pub fn documents_response(docs: Vec<Document>) -> Json<Vec<Document>> {
    Json(docs.into_iter().map(public_document).collect())
}
