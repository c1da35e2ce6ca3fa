//! Persistence seam for products and lots.
//!
//! Handlers only build and validate documents; everything that touches
//! storage goes through [`Store`]. The redis backend is the deployment
//! target, the in-memory backend backs tests and local runs without a
//! redis instance. Sorting and aggregation live outside the store so both
//! backends answer queries identically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Lot, Product},
};

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new product. Fails with [`AppError::DuplicateName`] when a
    /// product with the same name already exists.
    async fn insert_product(&self, product: &Product) -> Result<(), AppError>;

    async fn product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn products(&self) -> Result<Vec<Product>, AppError>;

    async fn insert_lot(&self, lot: &Lot) -> Result<(), AppError>;

    async fn lots(&self) -> Result<Vec<Lot>, AppError>;

    async fn lots_for_product(&self, product_id: Uuid) -> Result<Vec<Lot>, AppError>;

    /// Overwrite a lot's quantity, returning the updated document, or
    /// `None` when the lot does not exist.
    async fn update_lot_quantity(
        &self,
        id: Uuid,
        quantity: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, AppError>;

    /// Returns `true` when a lot was actually removed.
    async fn delete_lot(&self, id: Uuid) -> Result<bool, AppError>;
}
