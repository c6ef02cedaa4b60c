//! API integration tests
//!
//! These run against a live server with a reachable database.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

/// Unique username so the tests can be re-run against the same database
fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

/// Bootstrap the admin account (409 once it exists) and log in
async fn admin_token(client: &Client) -> String {
    let _ = client
        .post(format!("{}/create_admin", BASE_URL))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send create_admin request");

    login(client, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Register a fresh member and log in; returns (token, user_id)
async fn register_member(client: &Client, prefix: &str) -> (String, i64) {
    let username = unique(prefix);

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["id"].as_i64().expect("No user ID");

    (login(client, &username, "testpass").await, user_id)
}

/// Create a book as admin; returns its ID
async fn create_book(client: &Client, token: &str, title: &str, copies: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn get_book(client: &Client, token: &str, book_id: i64) -> Value {
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send list books request");

    let body: Value = response.json().await.expect("Failed to parse response");
    body.as_array()
        .expect("Book list is not an array")
        .iter()
        .find(|b| b["id"].as_i64() == Some(book_id))
        .expect("Book not in list")
        .clone()
}

async fn request_borrow(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrow_request", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "username": "nobody",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_and_get_current_user() {
    let client = Client::new();
    let username = unique("alice");

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let token = login(&client, &username, "testpass").await;

    let response = client
        .get(format!("{}/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["role"], "member");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_registration_conflict() {
    let client = Client::new();
    let username = unique("bob");

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    // Same username again, different case
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username.to_uppercase(),
            "password": "otherpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_user() {
    let client = Client::new();
    let (token, _) = register_member(&client, "member").await;

    let response = client
        .post(format!("{}/create_user", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": unique("victim"),
            "password": "testpass"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_admin_creates_user() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/create_user", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": unique("staff"),
            "password": "testpass",
            "role": "member"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "member");
    assert!(body.get("password").is_none(), "Hash must never be serialized");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_manage_books() {
    let client = Client::new();
    let (token, _) = register_member(&client, "reader").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden Book",
            "author": "Nobody"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_update_delete_book() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let book_id = create_book(&client, &token, "Ephemeral Book", 3).await;

    let book = get_book(&client, &token, book_id).await;
    assert_eq!(book["available_copies"], 3);
    assert_eq!(book["total_copies"], 3);

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "total_copies": 5 }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_copies"], 5);
    assert_eq!(body["available_copies"], 5);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_borrow_request_for_missing_book() {
    let client = Client::new();
    let (token, _) = register_member(&client, "searcher").await;

    let response = request_borrow(&client, &token, 999_999_999).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (member, member_id) = register_member(&client, "borrower").await;
    let (other, _) = register_member(&client, "latecomer").await;

    // Single-copy book: approving the first request exhausts the stock
    let book_id = create_book(&client, &admin, "The Last Copy", 1).await;

    let response = request_borrow(&client, &member, book_id).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["user_id"].as_i64(), Some(member_id));

    // Members cannot approve
    let response = client
        .post(format!("{}/approve_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/approve_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "approved");

    let book = get_book(&client, &admin, book_id).await;
    assert_eq!(book["available_copies"], 0);

    // Approving twice is a conflict
    let response = client
        .post(format!("{}/approve_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // No copies left for anyone else
    let response = request_borrow(&client, &other, book_id).await;
    assert_eq!(response.status(), 409);

    // While a copy is out, the book cannot be deleted
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Another member cannot return someone else's book
    let response = client
        .post(format!("{}/return_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", other))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/return_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");

    let book = get_book(&client, &admin, book_id).await;
    assert_eq!(book["available_copies"], 1);

    // The copy is back on the shelf, so the latecomer can request it
    let response = request_borrow(&client, &other, book_id).await;
    assert_eq!(response.status(), 201);

    // The member's history records the completed loan
    let response = client
        .get(format!("{}/borrow_history", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let history = body.as_array().expect("History is not an array");
    assert!(history
        .iter()
        .any(|r| r["id"].as_i64() == Some(request_id) && r["status"] == "returned"));
}

#[tokio::test]
#[ignore]
async fn test_reject_is_terminal() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (member, _) = register_member(&client, "hopeful").await;

    let book_id = create_book(&client, &admin, "Unwanted Book", 2).await;

    let response = request_borrow(&client, &member, book_id).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = client
        .post(format!("{}/reject_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "rejected");

    // Rejection leaves the stock untouched
    let book = get_book(&client, &admin, book_id).await;
    assert_eq!(book["available_copies"], 2);

    // A rejected request can never be approved
    let response = client
        .post(format!("{}/approve_request/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_admin_views_member_history() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (member, member_id) = register_member(&client, "watched").await;

    let book_id = create_book(&client, &admin, "Observed Book", 1).await;
    let response = request_borrow(&client, &member, book_id).await;
    assert_eq!(response.status(), 201);

    // Members cannot read other users' history
    let response = client
        .get(format!("{}/user/{}/borrow_history", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", member))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/user/{}/borrow_history", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let history = body.as_array().expect("History is not an array");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["book_id"].as_i64(), Some(book_id));

    // And the admin overview lists the request with its details
    let response = client
        .get(format!("{}/borrow_requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let requests = body.as_array().expect("Request list is not an array");
    assert!(requests
        .iter()
        .any(|r| r["book_id"].as_i64() == Some(book_id) && r["title"] == "Observed Book"));
}
