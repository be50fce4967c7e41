//! Document store access.
//!
//! Handlers never touch the driver directly; they go through [`Store`], which
//! is implemented for MongoDB by [`mongo::MongoStore`] and, in tests, by an
//! in-memory double.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use thiserror::Error;

use crate::models::{AdminStats, DeleteAck, InsertAck, OrderStat, UpdateAck};

pub mod document;
#[cfg(test)]
pub mod memory;
pub mod mongo;

pub const USERS: &str = "users";
pub const MENU: &str = "menu";
pub const REVIEWS: &str = "reviews";
pub const CARTS: &str = "carts";
pub const PAYMENTS: &str = "payments";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("unexpected document shape: {0}")]
    Decode(#[from] mongodb::bson::de::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Document>>;
    async fn insert_user(&self, user: Document) -> StoreResult<InsertAck>;
    async fn list_users(&self) -> StoreResult<Vec<Document>>;
    async fn delete_user(&self, id: ObjectId) -> StoreResult<DeleteAck>;
    /// Sets `role = "admin"` on the user.
    async fn promote_user(&self, id: ObjectId) -> StoreResult<UpdateAck>;

    async fn list_menu(&self) -> StoreResult<Vec<Document>>;
    async fn insert_menu_item(&self, item: Document) -> StoreResult<InsertAck>;
    async fn delete_menu_item(&self, id: ObjectId) -> StoreResult<DeleteAck>;

    async fn list_reviews(&self) -> StoreResult<Vec<Document>>;

    async fn insert_cart_item(&self, item: Document) -> StoreResult<InsertAck>;
    async fn list_cart_items(&self, email: &str) -> StoreResult<Vec<Document>>;
    async fn delete_cart_item(&self, id: ObjectId) -> StoreResult<DeleteAck>;
    async fn delete_cart_items(&self, ids: &[ObjectId]) -> StoreResult<DeleteAck>;

    async fn insert_payment(&self, payment: Document) -> StoreResult<InsertAck>;
    async fn list_payments(&self, email: &str) -> StoreResult<Vec<Document>>;

    async fn admin_stats(&self) -> StoreResult<AdminStats>;
    /// Sold menu items grouped by category, totals rounded to cents.
    async fn order_stats(&self) -> StoreResult<Vec<OrderStat>>;
}

/// Rounds a money amount to 2 decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
