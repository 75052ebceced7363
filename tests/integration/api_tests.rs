//! API integration tests against a running server (PostgreSQL + Redis)

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8089/api/v1";

/// Suffix keeping barcodes and names unique across runs
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Borrower phone unique across runs, within the 20-character column
fn unique_phone() -> String {
    format!("555-{}", chrono::Utc::now().timestamp_micros() % 10_000_000)
}

async fn post(client: &Client, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_json(client: &Client, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

/// Create a book shelved on a fresh area/bookshelf/layer
async fn create_book(client: &Client, barcode: &str, quantity: i32) -> Value {
    let area: Value = post(client, "/areas", json!({ "name": unique("Area") }))
        .await
        .json()
        .await
        .unwrap();
    let shelf: Value = post(client, "/bookshelves", json!({ "area_id": area["id"], "name": "B1" }))
        .await
        .json()
        .await
        .unwrap();
    let layer: Value = post(
        client,
        "/shelf-layers",
        json!({ "bookshelf_id": shelf["id"], "name": "L1" }),
    )
    .await
    .json()
    .await
    .unwrap();

    let response = post(
        client,
        "/books",
        json!({
            "barcode": barcode,
            "name": "Integration Book",
            "quantity": quantity,
            "shelf_layer_id": layer["id"]
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let body = get_json(&client, "/health").await;
    assert_eq!(body["status"], "healthy");

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_book_location_name_and_stock_conflict() {
    let client = Client::new();
    let barcode = unique("LOC");
    let book = create_book(&client, &barcode, 2).await;

    let summary = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert!(summary["location_name"]
        .as_str()
        .unwrap()
        .ends_with("-B1-L1"));

    // Two filters exercise consecutive placeholders
    let page = get_json(
        &client,
        &format!("/books?barcode={}&name=Integration&stock=available", barcode),
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["barcode"], barcode.as_str());

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .json(&json!({ "in_stock": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_staged_borrow_scenario() {
    let client = Client::new();
    let bc1 = unique("BC1");
    let bc2 = unique("BC2");
    create_book(&client, &bc1, 2).await;

    let response = post(
        &client,
        "/borrow/user",
        json!({ "name": "Ada", "phone": "555-0100" }),
    )
    .await;
    assert!(response.status().is_success());

    // Remove by index: [A, B, C] minus index 1 leaves [A, C]
    for barcode in ["A", "B", "C"] {
        let response = post(&client, "/borrow/books", json!({ "barcode": barcode })).await;
        assert_eq!(response.status(), 201);
    }
    let remaining: Value = client
        .delete(format!("{}/borrow/books/1", BASE_URL))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order: Vec<&str> = remaining
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["barcode"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["A", "C"]);

    let response = client
        .delete(format!("{}/borrow/books/5", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    for _ in 0..2 {
        client
            .delete(format!("{}/borrow/books/0", BASE_URL))
            .send()
            .await
            .unwrap();
    }

    // BC1 is cataloged with stock 2, BC2 is unknown
    post(&client, "/borrow/books", json!({ "barcode": bc1 })).await;
    post(&client, "/borrow/books", json!({ "barcode": bc2 })).await;

    let response = post(&client, "/borrow/complete", json!({})).await;
    assert_eq!(response.status(), 201);
    let receipt: Value = response.json().await.unwrap();
    assert_eq!(receipt["record"]["status"], "active");
    assert_eq!(receipt["books"].as_array().unwrap().len(), 2);
    assert!(receipt["books"][0]["book_id"].is_i64());
    assert!(receipt["books"][1]["book_id"].is_null());

    let book = get_json(&client, &format!("/books/barcode/{}", bc1)).await;
    assert_eq!(book["in_stock"], 1);

    let cart = get_json(&client, "/borrow/user").await;
    assert!(cart["user"].is_null());

    // Nothing staged any more
    let response = post(&client, "/borrow/complete", json!({})).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_staged_return_closes_record() {
    let client = Client::new();
    let barcode = unique("RET");
    let phone = unique_phone();
    create_book(&client, &barcode, 1).await;

    let response = post(
        &client,
        "/borrow",
        json!({ "borrower_name": "Grace", "borrower_phone": phone, "barcodes": [barcode] }),
    )
    .await;
    assert_eq!(response.status(), 201);

    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 0);

    let loans = get_json(&client, &format!("/borrowers/{}/loans", phone)).await;
    assert_eq!(loans["books"].as_array().unwrap().len(), 1);

    post(&client, "/return/user", json!({ "name": "Grace", "phone": phone })).await;
    post(&client, "/return/books", json!({ "barcode": barcode })).await;
    post(&client, "/return/books", json!({ "barcode": "NEVER-BORROWED" })).await;

    let lines: Value = post(&client, "/return/complete", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(lines[0]["status"], "returned");
    assert_eq!(lines[0]["record_closed"], true);
    assert_eq!(lines[1]["status"], "skipped");

    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 1);

    let cart = get_json(&client, "/return/user").await;
    assert!(cart["user"].is_null());
    assert!(cart["items"].as_array().unwrap().is_empty());

    let response = client
        .get(format!("{}/borrowers/{}/loans", BASE_URL, phone))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_scan_unknown_barcode() {
    let client = Client::new();

    let body: Value = post(&client, "/borrow/scan", json!({ "barcode": unique("NOPE") }))
        .await
        .json()
        .await
        .unwrap();
    assert!(body["barcode"].is_string());
    assert!(body.get("in_stock").is_none());
}

#[tokio::test]
#[ignore]
async fn test_delete_area_with_bookshelves() {
    let client = Client::new();
    let area: Value = post(&client, "/areas", json!({ "name": unique("Busy") }))
        .await
        .json()
        .await
        .unwrap();
    post(&client, "/bookshelves", json!({ "area_id": area["id"], "name": "B1" })).await;

    let response = client
        .delete(format!("{}/areas/{}", BASE_URL, area["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let tree = get_json(&client, "/locations/tree").await;
    assert!(tree.as_array().unwrap().iter().any(|node| {
        node["id"] == area["id"] && node["bookshelves"].as_array().unwrap().len() == 1
    }));
}

#[tokio::test]
#[ignore]
async fn test_partial_return_keeps_record_active() {
    let client = Client::new();
    let barcode = unique("TWO");
    let phone = unique_phone();
    create_book(&client, &barcode, 2).await;

    let response = post(
        &client,
        "/borrow",
        json!({ "borrower_name": "Lin", "borrower_phone": phone, "barcodes": [barcode, barcode] }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 0);

    let return_one = json!({ "borrower_phone": phone, "barcodes": [barcode] });
    let lines: Value = post(&client, "/borrow/return", return_one.clone())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(lines[0]["status"], "returned");
    assert_eq!(lines[0]["record_closed"], false);

    let records = get_json(&client, &format!("/borrow/records?borrower_phone={}", phone)).await;
    assert_eq!(records["total"], 1);
    assert_eq!(records["items"][0]["status"], "active");
    assert_eq!(records["items"][0]["books"].as_array().unwrap().len(), 1);

    // Second copy of the same barcode under the same phone
    let lines: Value = post(&client, "/borrow/return", return_one)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(lines[0]["status"], "returned");
    assert_eq!(lines[0]["record_closed"], true);

    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 2);
}

#[tokio::test]
#[ignore]
async fn test_borrow_without_stock_is_not_linked() {
    let client = Client::new();
    let barcode = unique("EMPTY");
    create_book(&client, &barcode, 1).await;

    for expect_link in [true, false] {
        let response = post(
            &client,
            "/borrow",
            json!({
                "borrower_name": "Sam",
                "borrower_phone": unique_phone(),
                "barcodes": [barcode]
            }),
        )
        .await;
        assert_eq!(response.status(), 201);
        let receipt: Value = response.json().await.unwrap();
        assert_eq!(receipt["books"][0]["book_id"].is_i64(), expect_link);
    }

    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 0);
}

#[tokio::test]
#[ignore]
async fn test_return_never_exceeds_quantity() {
    let client = Client::new();
    let barcode = unique("CAP");
    let phone = unique_phone();
    let book = create_book(&client, &barcode, 1).await;

    post(
        &client,
        "/borrow",
        json!({ "borrower_name": "Kim", "borrower_phone": phone, "barcodes": [barcode] }),
    )
    .await;

    // Restocked by hand while the copy is still out
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .json(&json!({ "in_stock": 1 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let lines: Value = post(
        &client,
        "/borrow/return",
        json!({ "borrower_phone": phone, "barcodes": [barcode] }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(lines[0]["status"], "returned");

    let book = get_json(&client, &format!("/books/barcode/{}", barcode)).await;
    assert_eq!(book["in_stock"], 1);
    assert_eq!(book["quantity"], 1);
}

#[tokio::test]
#[ignore]
async fn test_cart_rejects_negative_index() {
    let client = Client::new();

    for path in ["/borrow/books/-1", "/return/books/-3"] {
        let response = client
            .delete(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "OutOfRange");
    }
}

#[tokio::test]
#[ignore]
async fn test_over_long_barcode_rejected() {
    let client = Client::new();
    let barcode = "X".repeat(150);

    let response = post(&client, "/borrow/scan", json!({ "barcode": barcode })).await;
    assert_eq!(response.status(), 400);

    let response = post(
        &client,
        "/borrow",
        json!({ "borrower_name": "Ada", "borrower_phone": unique_phone(), "barcodes": [barcode] }),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ValidationError");
}
