//! Wire-level documents for products and stock lots.
//!
//! The JSON shape mirrors what the warehouse frontend already consumes:
//! camelCase fields with ids serialized as `_id`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: f64,
    pub expiration_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /api/products`.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub unit: Option<String>,
}

impl NewProduct {
    pub fn into_product(self, now: DateTime<Utc>) -> Result<Product, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Product name is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("Product category is required".into()));
        }

        Ok(Product {
            id: Uuid::new_v4(),
            name: self.name,
            category: self.category,
            description: self.description,
            unit: self.unit,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Payload for `POST /api/products/{productId}/lots`.
///
/// The expiration date is kept as a raw string so a malformed date surfaces
/// as a 400 with a message instead of a body-rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLot {
    pub quantity: f64,
    pub expiration_date: String,
    pub batch_number: Option<String>,
}

impl NewLot {
    pub fn into_lot(self, product_id: Uuid, now: DateTime<Utc>) -> Result<Lot, AppError> {
        validate_quantity(self.quantity)?;
        let expiration_date = parse_expiration(&self.expiration_date)?;

        Ok(Lot {
            id: Uuid::new_v4(),
            product_id,
            quantity: self.quantity,
            expiration_date,
            batch_number: self.batch_number,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Payload for `PUT /api/lots/{lotId}`.
#[derive(Debug, Deserialize)]
pub struct UpdateLot {
    pub quantity: f64,
}

pub fn validate_quantity(quantity: f64) -> Result<(), AppError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(AppError::Validation(
            "Quantity must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_expiration(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| AppError::Validation(format!("Invalid expiration date: {raw}")))
}

/// Response body for `GET /api/products/{productId}`.
#[derive(Debug, Serialize)]
pub struct ProductDetails {
    pub product: Product,
    pub lots: Vec<Lot>,
}

/// One product row of the `GET /api/inventory` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub total_quantity: f64,
    pub lots: Vec<InventoryLot>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub quantity: f64,
    pub expiration_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of the `GET /api/alerts/expiring` response. `productId` carries
/// the populated product summary rather than the bare id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringLot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub quantity: f64,
    pub expiration_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "productId")]
    pub product: ProductSummary,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}
