//! In-memory [`Store`] used by the router tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{
    document::{category_label, get_f64, get_string, object_id_ref},
    round_cents, Store, StoreResult, CARTS, MENU, PAYMENTS, REVIEWS, USERS,
};
use crate::models::{AdminStats, DeleteAck, InsertAck, OrderStat, UpdateAck, ADMIN_ROLE};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document directly, assigning an `_id` when missing.
    pub fn seed(&self, collection: &'static str, mut document: Document) -> ObjectId {
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };
        self.collections.lock().unwrap().entry(collection).or_default().push(document);
        id
    }

    pub fn all(&self, collection: &'static str) -> Vec<Document> {
        self.collections.lock().unwrap().get(collection).cloned().unwrap_or_default()
    }

    fn filter(&self, collection: &'static str, field: &str, value: &str) -> Vec<Document> {
        self.all(collection)
            .into_iter()
            .filter(|doc| get_string(doc, field).as_deref() == Some(value))
            .collect()
    }

    fn remove(&self, collection: &'static str, ids: &[ObjectId]) -> DeleteAck {
        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection).or_default();
        let before = docs.len();
        docs.retain(|doc| doc.get_object_id("_id").map_or(true, |id| !ids.contains(&id)));
        DeleteAck::new((before - docs.len()) as u64)
    }

    fn insert(&self, collection: &'static str, document: Document) -> InsertAck {
        let id = self.seed(collection, document);
        InsertAck::new(&Bson::ObjectId(id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Document>> {
        Ok(self.filter(USERS, "email", email).into_iter().next())
    }

    async fn insert_user(&self, user: Document) -> StoreResult<InsertAck> {
        Ok(self.insert(USERS, user))
    }

    async fn list_users(&self) -> StoreResult<Vec<Document>> {
        Ok(self.all(USERS))
    }

    async fn delete_user(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        Ok(self.remove(USERS, &[id]))
    }

    async fn promote_user(&self, id: ObjectId) -> StoreResult<UpdateAck> {
        let mut collections = self.collections.lock().unwrap();
        let users = collections.entry(USERS).or_default();
        let Some(user) = users.iter_mut().find(|doc| doc.get_object_id("_id").ok() == Some(id)) else {
            return Ok(UpdateAck::new(0, 0));
        };
        let modified = user.get_str("role").ok() != Some(ADMIN_ROLE);
        user.insert("role", ADMIN_ROLE);
        Ok(UpdateAck::new(1, u64::from(modified)))
    }

    async fn list_menu(&self) -> StoreResult<Vec<Document>> {
        Ok(self.all(MENU))
    }

    async fn insert_menu_item(&self, item: Document) -> StoreResult<InsertAck> {
        Ok(self.insert(MENU, item))
    }

    async fn delete_menu_item(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        Ok(self.remove(MENU, &[id]))
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Document>> {
        Ok(self.all(REVIEWS))
    }

    async fn insert_cart_item(&self, item: Document) -> StoreResult<InsertAck> {
        Ok(self.insert(CARTS, item))
    }

    async fn list_cart_items(&self, email: &str) -> StoreResult<Vec<Document>> {
        Ok(self.filter(CARTS, "email", email))
    }

    async fn delete_cart_item(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        Ok(self.remove(CARTS, &[id]))
    }

    async fn delete_cart_items(&self, ids: &[ObjectId]) -> StoreResult<DeleteAck> {
        Ok(self.remove(CARTS, ids))
    }

    async fn insert_payment(&self, payment: Document) -> StoreResult<InsertAck> {
        Ok(self.insert(PAYMENTS, payment))
    }

    async fn list_payments(&self, email: &str) -> StoreResult<Vec<Document>> {
        Ok(self.filter(PAYMENTS, "email", email))
    }

    async fn admin_stats(&self) -> StoreResult<AdminStats> {
        let payments = self.all(PAYMENTS);
        let revenue = payments.iter().filter_map(|doc| get_f64(doc, "price")).sum();
        Ok(AdminStats {
            users: self.all(USERS).len() as u64,
            menu_items: self.all(MENU).len() as u64,
            orders: payments.len() as u64,
            revenue: round_cents(revenue),
        })
    }

    async fn order_stats(&self) -> StoreResult<Vec<OrderStat>> {
        let menu = self.all(MENU);
        let mut stats: Vec<OrderStat> = Vec::new();

        for payment in self.all(PAYMENTS) {
            let Ok(items) = payment.get_array("menuItems") else {
                continue;
            };
            for oid in items.iter().filter_map(object_id_ref) {
                let Some(item) = menu.iter().find(|doc| doc.get_object_id("_id").ok() == Some(oid)) else {
                    continue;
                };
                let category = category_label(item.get("category"));
                let price = get_f64(item, "price").unwrap_or(0.0);
                match stats.iter_mut().find(|stat| stat.category == category) {
                    Some(stat) => {
                        stat.count += 1;
                        stat.total += price;
                    }
                    None => stats.push(OrderStat { category, count: 1, total: price }),
                }
            }
        }

        for stat in &mut stats {
            stat.total = round_cents(stat.total);
        }
        Ok(stats)
    }
}
