//! Redis backend.
//!
//! Documents are JSON strings under `product:{id}` / `lot:{id}` keys, with
//! id sets (`products`, `lots`, `product:{id}:lots`) for scans and a
//! `product:names` hash enforcing name uniqueness through `HSETNX`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Lot, Product},
};

use super::Store;

const PRODUCTS_KEY: &str = "products";
const LOTS_KEY: &str = "lots";
const NAMES_KEY: &str = "product:names";

fn product_key(id: Uuid) -> String {
    format!("product:{id}")
}

fn lot_key(id: Uuid) -> String {
    format!("lot:{id}")
}

fn product_lots_key(product_id: Uuid) -> String {
    format!("product:{product_id}:lots")
}

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect at startup. Panics on a bad URL or unreachable server, the
    /// process cannot do anything useful without its store.
    pub async fn connect(redis_url: &str) -> Self {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(100));

        let client = Client::open(redis_url).expect("Invalid REDIS_URL");
        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .expect("Failed to connect to redis");

        Self { conn }
    }

    async fn read_doc<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, AppError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(AppError::from)
    }

    async fn read_all<T: serde::de::DeserializeOwned>(
        &self,
        ids_key: &str,
        doc_key: fn(Uuid) -> String,
    ) -> Result<Vec<T>, AppError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(ids_key).await?;

        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            let id = Uuid::parse_str(&id)
                .map_err(|e| AppError::Internal(Box::new(e)))?;
            // A member without its document means a delete raced us; skip.
            if let Some(doc) = self.read_doc(&doc_key(id)).await? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        let mut conn = self.conn.clone();

        let claimed: bool = conn
            .hset_nx(NAMES_KEY, &product.name, product.id.to_string())
            .await?;
        if !claimed {
            return Err(AppError::DuplicateName);
        }

        let doc = serde_json::to_string(product)?;
        let _: () = redis::pipe()
            .atomic()
            .set(product_key(product.id), doc)
            .sadd(PRODUCTS_KEY, product.id.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.read_doc(&product_key(id)).await
    }

    async fn products(&self) -> Result<Vec<Product>, AppError> {
        self.read_all(PRODUCTS_KEY, product_key).await
    }

    async fn insert_lot(&self, lot: &Lot) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let doc = serde_json::to_string(lot)?;
        let _: () = redis::pipe()
            .atomic()
            .set(lot_key(lot.id), doc)
            .sadd(LOTS_KEY, lot.id.to_string())
            .sadd(product_lots_key(lot.product_id), lot.id.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn lots(&self) -> Result<Vec<Lot>, AppError> {
        self.read_all(LOTS_KEY, lot_key).await
    }

    async fn lots_for_product(&self, product_id: Uuid) -> Result<Vec<Lot>, AppError> {
        self.read_all(&product_lots_key(product_id), lot_key).await
    }

    async fn update_lot_quantity(
        &self,
        id: Uuid,
        quantity: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, AppError> {
        let Some(mut lot) = self.read_doc::<Lot>(&lot_key(id)).await? else {
            return Ok(None);
        };

        lot.quantity = quantity;
        lot.updated_at = updated_at;

        let mut conn = self.conn.clone();
        let doc = serde_json::to_string(&lot)?;
        let _: () = conn.set(lot_key(id), doc).await?;
        Ok(Some(lot))
    }

    async fn delete_lot(&self, id: Uuid) -> Result<bool, AppError> {
        let Some(lot) = self.read_doc::<Lot>(&lot_key(id)).await? else {
            return Ok(false);
        };

        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .del(lot_key(id))
            .srem(LOTS_KEY, id.to_string())
            .srem(product_lots_key(lot.product_id), id.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(true)
    }
}
