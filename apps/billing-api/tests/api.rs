//! End-to-end tests against a server on an ephemeral port with an
//! in-memory database.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use billing_api::{router, ApiConfig, AppState};
use billing_core::{Item, Money, Party, Sale};
use billing_db::{Database, DbConfig};

struct TestServer {
    base: String,
    client: reqwest::Client,
    uploads: TempDir,
    documents: TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let documents = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            port: 0,
            database_path: PathBuf::from(":memory:"),
            upload_dir: uploads.path().to_path_buf(),
            documents_dir: documents.path().to_path_buf(),
            public_base_url: "http://localhost:8080".to_string(),
            notify_webhook_url: None,
            notify_timeout_secs: 5,
            default_country_code: "91".to_string(),
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState::open(config, db).await.unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        TestServer {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            uploads,
            documents,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn create_rice(&self) -> Item {
        let (status, body) = self
            .post(
                "/api/items",
                json!({
                    "productName": "Rice",
                    "category": "Primary",
                    "purchasePrice": "28",
                    "salePrice": "32.5",
                    "openingStock": "10",
                    "lowStockAlert": "2"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        serde_json::from_value(body).unwrap()
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_database_and_bardana() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["migrationsApplied"], body["migrationsTotal"]);
    assert!(!body["bardanaId"].as_str().unwrap().is_empty());
    assert_eq!(body["notifications"], false);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn sale_round_trip_restores_stock_and_balance() {
    let server = TestServer::spawn().await;
    let rice = server.create_rice().await;

    let (status, body) = server
        .post(
            "/api/sales",
            json!({
                "partyName": "Ramesh Traders",
                "phoneNumber": "9876543210",
                "totalAmount": "1",
                "items": [
                    { "id": rice.id, "itemName": "Rice", "quantity": "45", "rate": "32.5" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["compensation"]["failures"], json!([]));

    let sale: Sale = serde_json::from_value(body["record"].clone()).unwrap();
    assert_eq!(sale.total_amount, Money::new(dec!(1462.5)));

    let (_, item) = server.get(&format!("/api/items/{}", rice.id)).await;
    let item: Item = serde_json::from_value(item).unwrap();
    assert_eq!(item.opening_stock.value(), dec!(8.5));

    let (_, parties) = server.get("/api/parties?query=ramesh").await;
    let parties: Vec<Party> = serde_json::from_value(parties).unwrap();
    assert_eq!(parties.len(), 1);
    assert_eq!(parties[0].balance, Money::new(dec!(1462.5)));

    let (status, _) = server.delete(&format!("/api/sales/{}", sale.id)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, item) = server.get(&format!("/api/items/{}", rice.id)).await;
    let item: Item = serde_json::from_value(item).unwrap();
    assert_eq!(item.opening_stock.value(), dec!(10));

    let (_, party) = server.get(&format!("/api/parties/{}", parties[0].id)).await;
    let party: Party = serde_json::from_value(party).unwrap();
    assert!(party.balance.is_zero());

    let (status, body) = server.get(&format!("/api/sales/{}", sale.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn sale_listing_honours_search_and_limit() {
    let server = TestServer::spawn().await;
    let rice = server.create_rice().await;

    for (name, phone) in [("Ramesh Traders", "9876543210"), ("Anita Stores", "9123456780")] {
        let (status, _) = server
            .post(
                "/api/sales",
                json!({
                    "partyName": name,
                    "phoneNumber": phone,
                    "items": [{ "id": rice.id, "itemName": "Rice", "quantity": "15", "rate": "30" }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = server.get("/api/sales?search=RAMESH").await;
    assert_eq!(status, StatusCode::OK);
    let sales: Vec<Sale> = serde_json::from_value(body).unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].party_name, "Ramesh Traders");

    let (_, body) = server.get("/api/sales?limit=1").await;
    let sales: Vec<Sale> = serde_json::from_value(body).unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].party_name, "Anita Stores");
}

#[tokio::test]
async fn invalid_sale_lists_every_failure() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .post(
            "/api/sales",
            json!({ "partyName": "", "phoneNumber": "", "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].as_array().unwrap().len() >= 3);

    let (_, sales) = server.get("/api/sales").await;
    assert_eq!(sales, json!([]));
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let server = TestServer::spawn().await;

    let res = server
        .client
        .post(server.url("/api/sales"))
        .header("content-type", "application/json")
        .body("{\"partyName\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn oversized_sale_is_rejected_and_server_keeps_serving() {
    let server = TestServer::spawn().await;
    let rice = server.create_rice().await;

    let (status, body) = server
        .post(
            "/api/sales",
            json!({
                "partyName": "Ramesh Traders",
                "phoneNumber": "9876543210",
                "items": [{
                    "id": rice.id,
                    "itemName": "Rice",
                    "quantity": "1000000000000000",
                    "rate": "1000000000000000"
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]
        .as_array()
        .unwrap()
        .contains(&json!("items[0].quantity must be at most 10000000")));

    let (status, _) = server.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    let (_, parties) = server.get("/api/parties").await;
    assert_eq!(parties, json!([]));
}

#[tokio::test]
async fn fractional_stock_text_survives_sale_round_trip() {
    let server = TestServer::spawn().await;
    let (status, item) = server
        .post(
            "/api/items",
            json!({ "productName": "Sona Masoori", "openingStock": "12345.678" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    let item_id = item["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            "/api/sales",
            json!({
                "partyName": "Ramesh Traders",
                "phoneNumber": "9876543210",
                "items": [{ "id": item_id, "itemName": "Sona Masoori", "quantity": "10", "rate": "40" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let sale_id = body["record"]["id"].as_str().unwrap().to_string();

    let (status, _) = server.delete(&format!("/api/sales/{sale_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, item) = server.get(&format!("/api/items/{item_id}")).await;
    assert_eq!(item["openingStock"], "12345.678");
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn duplicate_bill_no_conflicts_without_side_effects() {
    let server = TestServer::spawn().await;
    let rice = server.create_rice().await;

    let purchase = json!({
        "billNo": "PB-7",
        "partyName": "Suresh Agencies",
        "phoneNumber": "9123456780",
        "items": [{ "id": rice.id, "itemName": "Rice", "quantity": "30", "rate": "28" }]
    });

    let (status, _) = server.post("/api/purchases", purchase.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.post("/api/purchases", purchase).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, item) = server.get(&format!("/api/items/{}", rice.id)).await;
    let item: Item = serde_json::from_value(item).unwrap();
    assert_eq!(item.opening_stock.value(), dec!(11));

    let (_, parties) = server.get("/api/parties").await;
    let parties: Vec<Party> = serde_json::from_value(parties).unwrap();
    assert_eq!(parties.len(), 1);
    assert_eq!(parties[0].balance, Money::new(dec!(-840)));
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn bardana_cannot_be_deleted() {
    let server = TestServer::spawn().await;

    let (_, health) = server.get("/api/health").await;
    let bardana_id = health["bardanaId"].as_str().unwrap().to_string();

    let (status, body) = server.delete(&format!("/api/items/{bardana_id}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = server.get(&format!("/api/items/{bardana_id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn low_stock_lists_items_at_their_alert_level() {
    let server = TestServer::spawn().await;
    let rice = server.create_rice().await;

    let (status, _) = server
        .put(
            &format!("/api/items/{}", rice.id),
            json!({ "openingStock": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get("/api/items/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    let low: Vec<Item> = serde_json::from_value(body).unwrap();
    assert!(low.iter().any(|i| i.id == rice.id));
}

// =============================================================================
// Payments & Reconciliation
// =============================================================================

#[tokio::test]
async fn payment_moves_balance_and_manual_edit_is_repairable() {
    let server = TestServer::spawn().await;

    let (status, party) = server
        .post(
            "/api/parties",
            json!({ "name": "Kavita Kirana Store", "phoneNumber": "9988776655" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let party: Party = serde_json::from_value(party).unwrap();

    let (status, _) = server
        .put(
            &format!("/api/parties/{}/balance", party.id),
            json!({ "balance": "500" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post(
            "/api/payments",
            json!({
                "type": "payment-in",
                "partyName": "Kavita Kirana Store",
                "phoneNumber": "9988776655",
                "amount": "200"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["record"]["paymentNo"]
        .as_str()
        .unwrap()
        .starts_with("PAY-IN-"));

    let (_, after) = server.get(&format!("/api/parties/{}", party.id)).await;
    let after: Party = serde_json::from_value(after).unwrap();
    assert_eq!(after.balance, Money::new(dec!(300)));

    let (_, drift) = server.get("/api/reconciliation/balances").await;
    assert_eq!(drift.as_array().unwrap().len(), 1);
    assert_eq!(drift[0]["partyId"], party.id.as_str());

    let (status, repaired) = server
        .post(
            &format!("/api/reconciliation/balances/{}/repair", party.id),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let repaired: Party = serde_json::from_value(repaired).unwrap();
    assert_eq!(repaired.balance, Money::new(dec!(-200)));

    let (_, drift) = server.get("/api/reconciliation/balances").await;
    assert_eq!(drift, json!([]));

    let (status, report) = server
        .post("/api/payments/cleanup-duplicates", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["scanned"], 1);
    assert_eq!(report["removedIds"], json!([]));
}

// =============================================================================
// Documents
// =============================================================================

#[tokio::test]
async fn share_without_webhook_uploads_and_reports_unsent() {
    let server = TestServer::spawn().await;
    std::fs::write(server.documents.path().join("invoice.pdf"), b"%PDF-1.4 test").unwrap();

    let (status, body) = server
        .post(
            "/api/documents/share",
            json!({
                "filePath": "invoice.pdf",
                "fileName": "INV-1.pdf",
                "phoneNumber": "09876543210",
                "documentType": "invoice"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["phoneNumber"], "+919876543210");
    assert_eq!(body["notification"]["success"], false);
    assert!(body["url"]
        .as_str()
        .unwrap()
        .ends_with("/uploads/documents/INV-1.pdf"));
    assert!(server.uploads.path().join("documents/INV-1.pdf").exists());

    let served = server
        .client
        .get(server.url("/uploads/documents/INV-1.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"%PDF-1.4 test");
}

#[tokio::test]
async fn share_accepts_absolute_path_inside_documents_dir() {
    let server = TestServer::spawn().await;
    let file = server.documents.path().join("bill.pdf");
    std::fs::write(&file, b"%PDF").unwrap();

    let (status, body) = server
        .post(
            "/api/documents/share",
            json!({ "filePath": file, "fileName": "PB-1.pdf", "phoneNumber": "9876543210" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(server.uploads.path().join("documents/PB-1.pdf").exists());
}

#[tokio::test]
async fn share_refuses_files_outside_documents_dir() {
    let server = TestServer::spawn().await;
    let outside = tempfile::tempdir().unwrap();
    let stray = outside.path().join("stray.pdf");
    std::fs::write(&stray, b"%PDF").unwrap();

    for path in [
        json!("/etc/passwd"),
        json!("../../etc/passwd"),
        json!(stray),
    ] {
        let (status, body) = server
            .post(
                "/api/documents/share",
                json!({
                    "filePath": path,
                    "fileName": "passwd.txt",
                    "folder": "leaks",
                    "phoneNumber": "9876543210"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}: {body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert!(!server.uploads.path().join("leaks").exists());
    let served = server
        .client
        .get(server.url("/uploads/leaks/passwd.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn share_of_missing_file_is_not_found() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .post(
            "/api/documents/share",
            json!({
                "filePath": "not-generated-yet.pdf",
                "fileName": "INV-2.pdf",
                "phoneNumber": "9876543210"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
