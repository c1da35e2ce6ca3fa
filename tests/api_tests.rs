//! Integration tests for the inventory API over the in-memory store.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use bodega::{app, config::Config, state::AppState, store::MemoryStore};

fn server() -> TestServer {
    let state = AppState::with_store(Config::load(), Box::new(MemoryStore::new()));
    TestServer::new(app(state)).expect("Failed to build test server")
}

fn in_days(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

async fn create_product(server: &TestServer, name: &str, category: &str) -> Value {
    let res = server
        .post("/api/products")
        .json(&json!({ "name": name, "category": category, "unit": "kg" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    res.json::<Value>()
}

async fn create_lot(server: &TestServer, product_id: &str, quantity: f64, expiration: &str) -> Value {
    let res = server
        .post(&format!("/api/products/{product_id}/lots"))
        .json(&json!({ "quantity": quantity, "expirationDate": expiration }))
        .await;
    assert_eq!(res.status_code(), StatusCode::CREATED);
    res.json::<Value>()
}

fn id_of(doc: &Value) -> String {
    doc["_id"].as_str().expect("document has an _id").to_string()
}

#[tokio::test]
async fn root_is_alive() {
    let server = server();
    let res = server.get("/").await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn create_product_returns_document() {
    let server = server();
    let product = create_product(&server, "Whole Milk", "Dairy").await;

    assert_eq!(product["name"], "Whole Milk");
    assert_eq!(product["category"], "Dairy");
    assert!(product["_id"].is_string());
    assert!(product["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_product_name_is_a_bad_request() {
    let server = server();
    create_product(&server, "Rice", "Grains").await;

    let res = server
        .post("/api/products")
        .json(&json!({ "name": "Rice", "category": "Grains" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>()["message"].is_string());
}

#[tokio::test]
async fn blank_product_name_is_a_bad_request() {
    let server = server();
    let res = server
        .post("/api/products")
        .json(&json!({ "name": "   ", "category": "Grains" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_details_rejects_malformed_id() {
    let server = server();
    let res = server.get("/api/products/not-a-uuid").await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_details_reports_missing_product() {
    let server = server();
    let res = server
        .get("/api/products/00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_details_lists_lots_fifo() {
    let server = server();
    let product = create_product(&server, "Beans", "Legumes").await;
    let product_id = id_of(&product);

    let late = create_lot(&server, &product_id, 10.0, &in_days(90)).await;
    let soon = create_lot(&server, &product_id, 5.0, &in_days(10)).await;

    let res = server.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let details = res.json::<Value>();
    assert_eq!(details["product"]["name"], "Beans");

    let lots = details["lots"].as_array().unwrap();
    assert_eq!(lots.len(), 2);
    assert_eq!(id_of(&lots[0]), id_of(&soon));
    assert_eq!(id_of(&lots[1]), id_of(&late));
}

#[tokio::test]
async fn lot_for_unknown_product_is_not_found() {
    let server = server();
    let res = server
        .post("/api/products/00000000-0000-4000-8000-000000000000/lots")
        .json(&json!({ "quantity": 1.0, "expirationDate": "2027-01-01" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lot_with_negative_quantity_is_a_bad_request() {
    let server = server();
    let product = create_product(&server, "Oats", "Grains").await;

    let res = server
        .post(&format!("/api/products/{}/lots", id_of(&product)))
        .json(&json!({ "quantity": -2.0, "expirationDate": "2027-01-01" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lot_with_malformed_date_is_a_bad_request() {
    let server = server();
    let product = create_product(&server, "Oats", "Grains").await;

    let res = server
        .post(&format!("/api/products/{}/lots", id_of(&product)))
        .json(&json!({ "quantity": 2.0, "expirationDate": "soon-ish" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lot_accepts_plain_date() {
    let server = server();
    let product = create_product(&server, "Oats", "Grains").await;

    let lot = create_lot(&server, &id_of(&product), 2.0, "2027-06-15").await;
    let expiration = lot["expirationDate"].as_str().unwrap();
    assert!(expiration.starts_with("2027-06-15T00:00:00"));
}

#[tokio::test]
async fn update_lot_quantity_round_trips() {
    let server = server();
    let product = create_product(&server, "Milk", "Dairy").await;
    let lot = create_lot(&server, &id_of(&product), 8.0, &in_days(14)).await;
    let lot_id = id_of(&lot);

    let res = server
        .put(&format!("/api/lots/{lot_id}"))
        .json(&json!({ "quantity": 3.5 }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let updated = res.json::<Value>();
    assert_eq!(updated["quantity"].as_f64(), Some(3.5));
    assert_ne!(updated["updatedAt"], lot["updatedAt"]);
}

#[tokio::test]
async fn update_lot_rejects_negative_quantity() {
    let server = server();
    let product = create_product(&server, "Milk", "Dairy").await;
    let lot = create_lot(&server, &id_of(&product), 8.0, &in_days(14)).await;

    let res = server
        .put(&format!("/api/lots/{}", id_of(&lot)))
        .json(&json!({ "quantity": -1.0 }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_lot_is_not_found() {
    let server = server();
    let res = server
        .put("/api/lots/00000000-0000-4000-8000-000000000000")
        .json(&json!({ "quantity": 1.0 }))
        .await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_lot_removes_it() {
    let server = server();
    let product = create_product(&server, "Milk", "Dairy").await;
    let product_id = id_of(&product);
    let lot = create_lot(&server, &product_id, 8.0, &in_days(14)).await;
    let lot_id = id_of(&lot);

    let res = server.delete(&format!("/api/lots/{lot_id}")).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let details = server.get(&format!("/api/products/{product_id}")).await;
    assert!(details.json::<Value>()["lots"].as_array().unwrap().is_empty());

    // Deleting again reports the lot as gone.
    let res = server.delete(&format!("/api/lots/{lot_id}")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inventory_aggregates_and_orders() {
    let server = server();
    let beans = create_product(&server, "Beans", "Legumes").await;
    let apples = create_product(&server, "Apples", "Fruit").await;
    create_product(&server, "Zucchini", "Vegetables").await;

    let beans_id = id_of(&beans);
    create_lot(&server, &beans_id, 10.0, &in_days(90)).await;
    create_lot(&server, &beans_id, 2.5, &in_days(10)).await;
    create_lot(&server, &id_of(&apples), 4.0, &in_days(5)).await;

    let res = server.get("/api/inventory").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let inventory = res.json::<Value>();
    let entries = inventory.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    // Sorted by product name.
    let names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Apples", "Beans", "Zucchini"]);

    // Totals are summed per product; lot-less products stay with zero.
    assert_eq!(entries[0]["totalQuantity"].as_f64(), Some(4.0));
    assert_eq!(entries[1]["totalQuantity"].as_f64(), Some(12.5));
    assert_eq!(entries[2]["totalQuantity"].as_f64(), Some(0.0));
    assert!(entries[2]["lots"].as_array().unwrap().is_empty());

    // Lots within a product come back FIFO.
    let bean_lots = entries[1]["lots"].as_array().unwrap();
    assert_eq!(bean_lots[0]["quantity"].as_f64(), Some(2.5));
    assert_eq!(bean_lots[1]["quantity"].as_f64(), Some(10.0));
}

#[tokio::test]
async fn expiring_alerts_use_default_window() {
    let server = server();
    let milk = create_product(&server, "Milk", "Dairy").await;
    let milk_id = id_of(&milk);

    let soon = create_lot(&server, &milk_id, 2.0, &in_days(3)).await;
    create_lot(&server, &milk_id, 9.0, &in_days(60)).await;

    let res = server.get("/api/alerts/expiring").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let alerts = res.json::<Value>();
    let rows = alerts.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(id_of(&rows[0]), id_of(&soon));

    // Populated product summary, not a bare id.
    assert_eq!(rows[0]["productId"]["name"], "Milk");
    assert_eq!(rows[0]["productId"]["category"], "Dairy");
}

#[tokio::test]
async fn expiring_alerts_honor_days_parameter() {
    let server = server();
    let milk = create_product(&server, "Milk", "Dairy").await;
    create_lot(&server, &id_of(&milk), 9.0, &in_days(60)).await;

    let res = server.get("/api/alerts/expiring?days=90").await;
    assert_eq!(res.json::<Value>().as_array().unwrap().len(), 1);

    // Non-numeric values fall back to the 30-day default.
    let res = server.get("/api/alerts/expiring?days=abc").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn expired_lots_are_not_alerts() {
    let server = server();
    let milk = create_product(&server, "Milk", "Dairy").await;
    create_lot(&server, &id_of(&milk), 1.0, &in_days(-2)).await;

    let res = server.get("/api/alerts/expiring").await;
    assert!(res.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn alerts_order_soonest_first() {
    let server = server();
    let milk = create_product(&server, "Milk", "Dairy").await;
    let milk_id = id_of(&milk);

    let later = create_lot(&server, &milk_id, 1.0, &in_days(20)).await;
    let soon = create_lot(&server, &milk_id, 1.0, &in_days(2)).await;

    let res = server.get("/api/alerts/expiring").await;
    let alerts = res.json::<Value>();
    let rows = alerts.as_array().unwrap();

    assert_eq!(id_of(&rows[0]), id_of(&soon));
    assert_eq!(id_of(&rows[1]), id_of(&later));
}
