//! Community-warehouse inventory backend.
//!
//! HTTP API for products and expiration-dated stock lots: CRUD, a
//! FIFO-ordered inventory aggregation, and an expiration-alert query.
//! Storage sits behind [`store::Store`], redis in deployment and an
//! in-memory backend for tests and local runs.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    create_lot_handler, create_product_handler, delete_lot_handler, expiring_handler,
    inventory_handler, product_details_handler, root_handler, update_lot_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(state.config.cors_max_age_secs));

    Router::new()
        .route("/", get(root_handler))
        .route("/api/products", post(create_product_handler))
        .route("/api/products/{product_id}", get(product_details_handler))
        .route("/api/products/{product_id}/lots", post(create_lot_handler))
        .route(
            "/api/lots/{lot_id}",
            put(update_lot_handler).delete(delete_lot_handler),
        )
        .route("/api/inventory", get(inventory_handler))
        .route("/api/alerts/expiring", get(expiring_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
