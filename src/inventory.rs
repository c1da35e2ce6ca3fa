//! Inventory aggregation and expiration alerts.
//!
//! Both queries are computed in-process over full product/lot scans so the
//! redis and in-memory backends behave identically. Dataset sizes here are
//! a community warehouse, not a supply chain; a scan per request is fine.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{ExpiringLot, InventoryEntry, InventoryLot, Lot, Product, ProductSummary};

/// Fallback alert window in days.
pub const DEFAULT_ALERT_DAYS: i64 = 30;

/// FIFO order: soonest expiration first, insertion order as tie-break.
pub fn sort_fifo(lots: &mut [Lot]) {
    lots.sort_by(|a, b| {
        a.expiration_date
            .cmp(&b.expiration_date)
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Group lots by product, sum quantities, and order everything for
/// consumption: lots FIFO within each product, products by name. Products
/// without lots are kept with a zero total.
pub fn build_inventory(mut products: Vec<Product>, lots: Vec<Lot>) -> Vec<InventoryEntry> {
    let mut by_product: BTreeMap<Uuid, Vec<Lot>> = BTreeMap::new();
    for lot in lots {
        by_product.entry(lot.product_id).or_default().push(lot);
    }

    products.sort_by(|a, b| a.name.cmp(&b.name));

    products
        .into_iter()
        .map(|product| {
            let mut lots = by_product.remove(&product.id).unwrap_or_default();
            sort_fifo(&mut lots);

            let total_quantity = lots.iter().map(|lot| lot.quantity).sum();
            let lots = lots
                .into_iter()
                .map(|lot| InventoryLot {
                    id: lot.id,
                    quantity: lot.quantity,
                    expiration_date: lot.expiration_date,
                    batch_number: lot.batch_number,
                    created_at: lot.created_at,
                })
                .collect();

            InventoryEntry {
                id: product.id,
                name: product.name,
                category: product.category,
                description: product.description,
                unit: product.unit,
                total_quantity,
                lots,
            }
        })
        .collect()
}

/// Resolve the `days` query parameter: missing, non-numeric, and zero all
/// fall back to the default window.
pub fn alert_days(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|days| *days != 0)
        .unwrap_or(DEFAULT_ALERT_DAYS)
}

/// Lots expiring within `[now, now + days]`, soonest first, populated with
/// their product summary. Already-expired lots are not alerts.
pub fn expiring_lots(
    lots: Vec<Lot>,
    products: &[Product],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<ExpiringLot> {
    let horizon = Duration::try_days(days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let summaries: BTreeMap<Uuid, &Product> =
        products.iter().map(|p| (p.id, p)).collect();

    let mut inside: Vec<Lot> = lots
        .into_iter()
        .filter(|lot| lot.expiration_date >= now && lot.expiration_date <= horizon)
        .collect();
    sort_fifo(&mut inside);

    inside
        .into_iter()
        .filter_map(|lot| {
            // Orphaned lots (product deleted underneath) carry no alert.
            let product = summaries.get(&lot.product_id)?;
            Some(ExpiringLot {
                id: lot.id,
                quantity: lot.quantity,
                expiration_date: lot.expiration_date,
                batch_number: lot.batch_number,
                created_at: lot.created_at,
                updated_at: lot.updated_at,
                product: ProductSummary {
                    id: product.id,
                    name: product.name.clone(),
                    category: product.category.clone(),
                    unit: product.unit.clone(),
                },
            })
        })
        .collect()
}
