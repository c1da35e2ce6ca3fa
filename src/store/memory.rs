use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Lot, Product},
};

use super::Store;

/// In-process backend over `BTreeMap`s. Name uniqueness is enforced the
/// same way the redis backend does it, via a name index.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    products: BTreeMap<Uuid, Product>,
    names: BTreeMap<String, Uuid>,
    lots: BTreeMap<Uuid, Lot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        let mut inner = self.inner.write();
        if inner.names.contains_key(&product.name) {
            return Err(AppError::DuplicateName);
        }
        inner.names.insert(product.name.clone(), product.id);
        inner.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.inner.read().products.get(&id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.inner.read().products.values().cloned().collect())
    }

    async fn insert_lot(&self, lot: &Lot) -> Result<(), AppError> {
        self.inner.write().lots.insert(lot.id, lot.clone());
        Ok(())
    }

    async fn lots(&self) -> Result<Vec<Lot>, AppError> {
        Ok(self.inner.read().lots.values().cloned().collect())
    }

    async fn lots_for_product(&self, product_id: Uuid) -> Result<Vec<Lot>, AppError> {
        Ok(self
            .inner
            .read()
            .lots
            .values()
            .filter(|lot| lot.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn update_lot_quantity(
        &self,
        id: Uuid,
        quantity: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Lot>, AppError> {
        let mut inner = self.inner.write();
        Ok(inner.lots.get_mut(&id).map(|lot| {
            lot.quantity = quantity;
            lot.updated_at = updated_at;
            lot.clone()
        }))
    }

    async fn delete_lot(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.inner.write().lots.remove(&id).is_some())
    }
}
