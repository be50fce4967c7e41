use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, oid::ObjectId, Bson, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use tracing::{debug, info};

use super::{document::get_f64, round_cents, Store, StoreError, StoreResult, CARTS, MENU, PAYMENTS, REVIEWS, USERS};
use crate::models::{AdminStats, DeleteAck, InsertAck, OrderStat, UpdateAck, ADMIN_ROLE};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        options.server_api = Some(server_api);

        let client = Client::with_options(options)?;
        Ok(Self::new(client.database(db_name)))
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        info!("Pinged deployment, database {} is reachable", self.db.name());
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    async fn find_all(&self, name: &str, filter: Document) -> StoreResult<Vec<Document>> {
        debug!("{name}: find {filter}");
        let cursor = self.collection(name).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, name: &str, document: Document) -> StoreResult<InsertAck> {
        let result = self.collection(name).insert_one(document).await?;
        Ok(InsertAck::new(&result.inserted_id))
    }

    async fn delete_by_id(&self, name: &str, id: ObjectId) -> StoreResult<DeleteAck> {
        let result = self.collection(name).delete_one(doc! { "_id": id }).await?;
        Ok(DeleteAck::new(result.deleted_count))
    }

    async fn count(&self, name: &str) -> StoreResult<u64> {
        Ok(self.collection(name).estimated_document_count().await?)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Document>> {
        Ok(self.collection(USERS).find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: Document) -> StoreResult<InsertAck> {
        self.insert(USERS, user).await
    }

    async fn list_users(&self) -> StoreResult<Vec<Document>> {
        self.find_all(USERS, doc! {}).await
    }

    async fn delete_user(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        self.delete_by_id(USERS, id).await
    }

    async fn promote_user(&self, id: ObjectId) -> StoreResult<UpdateAck> {
        let result = self
            .collection(USERS)
            .update_one(doc! { "_id": id }, doc! { "$set": { "role": ADMIN_ROLE } })
            .await?;
        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn list_menu(&self) -> StoreResult<Vec<Document>> {
        self.find_all(MENU, doc! {}).await
    }

    async fn insert_menu_item(&self, item: Document) -> StoreResult<InsertAck> {
        self.insert(MENU, item).await
    }

    async fn delete_menu_item(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        self.delete_by_id(MENU, id).await
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Document>> {
        self.find_all(REVIEWS, doc! {}).await
    }

    async fn insert_cart_item(&self, item: Document) -> StoreResult<InsertAck> {
        self.insert(CARTS, item).await
    }

    async fn list_cart_items(&self, email: &str) -> StoreResult<Vec<Document>> {
        self.find_all(CARTS, doc! { "email": email }).await
    }

    async fn delete_cart_item(&self, id: ObjectId) -> StoreResult<DeleteAck> {
        self.delete_by_id(CARTS, id).await
    }

    async fn delete_cart_items(&self, ids: &[ObjectId]) -> StoreResult<DeleteAck> {
        let result = self
            .collection(CARTS)
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(DeleteAck::new(result.deleted_count))
    }

    async fn insert_payment(&self, payment: Document) -> StoreResult<InsertAck> {
        self.insert(PAYMENTS, payment).await
    }

    async fn list_payments(&self, email: &str) -> StoreResult<Vec<Document>> {
        self.find_all(PAYMENTS, doc! { "email": email }).await
    }

    async fn admin_stats(&self) -> StoreResult<AdminStats> {
        let mut cursor = self.collection(PAYMENTS).aggregate(revenue_pipeline()).await?;
        let revenue = cursor
            .try_next()
            .await?
            .and_then(|row| get_f64(&row, "revenue"))
            .unwrap_or(0.0);

        Ok(AdminStats {
            users: self.count(USERS).await?,
            menu_items: self.count(MENU).await?,
            orders: self.count(PAYMENTS).await?,
            revenue: round_cents(revenue),
        })
    }

    async fn order_stats(&self) -> StoreResult<Vec<OrderStat>> {
        let rows: Vec<Document> = self
            .collection(PAYMENTS)
            .aggregate(order_stats_pipeline())
            .await?
            .try_collect()
            .await?;
        rows.into_iter()
            .map(|row| from_document::<OrderStat>(row).map_err(StoreError::from))
            .collect()
    }
}

/// Sum of `price` over all payments, as a single `{ revenue }` row.
fn revenue_pipeline() -> Vec<Document> {
    vec![doc! {
        "$group": { "_id": Bson::Null, "revenue": { "$sum": "$price" } }
    }]
}

/// Joins every sold menu id of every payment to its menu item and groups by
/// category. Ids may be stored as ObjectIds or hex strings; ids that convert
/// to neither never match a menu item.
fn order_stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$menuItems" },
        doc! {
            "$addFields": {
                "menuItemId": {
                    "$convert": { "input": "$menuItems", "to": "objectId", "onError": Bson::Null, "onNull": Bson::Null }
                }
            }
        },
        doc! {
            "$lookup": { "from": MENU, "localField": "menuItemId", "foreignField": "_id", "as": "menuItem" }
        },
        doc! { "$unwind": "$menuItem" },
        doc! {
            "$group": {
                "_id": "$menuItem.category",
                "count": { "$sum": 1 },
                "total": { "$sum": "$menuItem.price" }
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "category": {
                    "$convert": { "input": "$_id", "to": "string", "onError": "", "onNull": "" }
                },
                "count": "$count",
                "total": { "$round": [{ "$toDouble": "$total" }, 2] }
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_names(pipeline: &[Document]) -> Vec<&str> {
        pipeline
            .iter()
            .map(|stage| stage.keys().next().map(String::as_str).unwrap_or_default())
            .collect()
    }

    #[test]
    fn revenue_sums_payment_prices_into_one_row() {
        let pipeline = revenue_pipeline();
        assert_eq!(pipeline.len(), 1);

        let group = pipeline[0].get_document("$group").unwrap();
        assert_eq!(group.get("_id"), Some(&Bson::Null));
        assert_eq!(group.get_document("revenue").unwrap().get_str("$sum").unwrap(), "$price");
    }

    #[test]
    fn order_stats_join_sold_ids_to_menu_categories() {
        let pipeline = order_stats_pipeline();
        assert_eq!(stage_names(&pipeline), ["$unwind", "$addFields", "$lookup", "$unwind", "$group", "$project"]);

        let convert = pipeline[1]
            .get_document("$addFields")
            .and_then(|fields| fields.get_document("menuItemId"))
            .and_then(|id| id.get_document("$convert"))
            .unwrap();
        assert_eq!(convert.get_str("to").unwrap(), "objectId");
        assert_eq!(convert.get("onError"), Some(&Bson::Null));

        let lookup = pipeline[2].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), MENU);
        assert_eq!(lookup.get_str("localField").unwrap(), "menuItemId");
        assert_eq!(lookup.get_str("foreignField").unwrap(), "_id");

        let group = pipeline[4].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$menuItem.category");
    }

    #[test]
    fn order_stats_rows_decode_as_stats() {
        let project = order_stats_pipeline().pop().unwrap();
        let project = project.get_document("$project").unwrap();
        let category = project
            .get_document("category")
            .and_then(|category| category.get_document("$convert"))
            .unwrap();
        assert_eq!(category.get_str("to").unwrap(), "string");
        assert_eq!(category.get_str("onError").unwrap(), "");
        assert_eq!(category.get_str("onNull").unwrap(), "");

        // the shape the projection emits
        let row = doc! { "category": "pizza", "count": 2_i32, "total": 25.0 };
        let stat: OrderStat = from_document(row).unwrap();
        assert_eq!(stat, OrderStat { category: "pizza".into(), count: 2, total: 25.0 });
    }
}
