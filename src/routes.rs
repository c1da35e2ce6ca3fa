use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::AppError,
    inventory::{alert_days, build_inventory, expiring_lots, sort_fifo},
    models::{NewLot, NewProduct, ProductDetails, UpdateLot, validate_quantity},
    state::AppState,
};

fn parse_id(raw: &str, kind: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidId(kind))
}

pub async fn root_handler() -> &'static str {
    "Community warehouse inventory API is running"
}

pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = payload.into_product(Utc::now())?;
    state.store.insert_product(&product).await?;

    debug!("Created product {} ({})", product.name, product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn product_details_handler(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = parse_id(&product_id, "product")?;

    let product = state
        .store
        .product(product_id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let mut lots = state.store.lots_for_product(product_id).await?;
    sort_fifo(&mut lots);

    Ok(Json(ProductDetails { product, lots }))
}

pub async fn create_lot_handler(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    Json(payload): Json<NewLot>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = parse_id(&product_id, "product")?;

    if state.store.product(product_id).await?.is_none() {
        return Err(AppError::NotFound("Product"));
    }

    let lot = payload.into_lot(product_id, Utc::now())?;
    state.store.insert_lot(&lot).await?;

    debug!("Created lot {} for product {product_id}", lot.id);
    Ok((StatusCode::CREATED, Json(lot)))
}

pub async fn update_lot_handler(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<String>,
    Json(payload): Json<UpdateLot>,
) -> Result<impl IntoResponse, AppError> {
    let lot_id = parse_id(&lot_id, "lot")?;
    validate_quantity(payload.quantity)?;

    let lot = state
        .store
        .update_lot_quantity(lot_id, payload.quantity, Utc::now())
        .await?
        .ok_or(AppError::NotFound("Lot"))?;

    Ok(Json(lot))
}

pub async fn delete_lot_handler(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lot_id = parse_id(&lot_id, "lot")?;

    if !state.store.delete_lot(lot_id).await? {
        return Err(AppError::NotFound("Lot"));
    }

    Ok(Json(json!({ "message": "Lot deleted successfully" })))
}

pub async fn inventory_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.store.products().await?;
    let lots = state.store.lots().await?;

    Ok(Json(build_inventory(products, lots)))
}

#[derive(Deserialize)]
pub struct AlertParams {
    days: Option<String>,
}

pub async fn expiring_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = alert_days(params.days.as_deref());

    let products = state.store.products().await?;
    let lots = state.store.lots().await?;

    Ok(Json(expiring_lots(lots, &products, Utc::now(), days)))
}
