//! API integration tests against a running server
//!
//! Start the server with a migrated database, then run:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{multipart, Client};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3750/api/v1";

/// Unique email per run so tests can be repeated against the same database
fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}@example.org", prefix, nanos)
}

async fn register(client: &Client, email: &str, password: &str) -> Value {
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Integration Reader",
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse register response")
}

fn book_form(age_range: &str) -> multipart::Form {
    multipart::Form::new()
        .text("title", "O Livro")
        .text("author", "X")
        .text("quantity", "3")
        .text("publisher", "Y")
        .text("age_range", age_range.to_string())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_register_and_login() {
    let client = Client::new();
    let email = unique_email("login");

    let user = register(&client, &email, "secret").await;
    assert!(user.get("password_hash").is_none());

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], user["id"]);
    assert_eq!(body["email"], email.as_str());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let email = unique_email("invalid");
    register(&client, &email, "secret").await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_uses_unique_constraint() {
    let client = Client::new();
    let email = unique_email("dup");

    // Fire concurrent registrations; exactly one may win
    let attempts = (0..4).map(|_| {
        client
            .post(format!("{}/auth/register", BASE_URL))
            .json(&json!({ "name": "Racer", "email": email, "password": "secret" }))
            .send()
    });
    let responses = spawn_and_collect_statuses(attempts).await;

    let created = responses.iter().filter(|status| **status == 201).count();
    let conflicts = responses.iter().filter(|status| **status == 409).count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, responses.len() - 1);
}

async fn spawn_and_collect_statuses<F>(requests: impl Iterator<Item = F>) -> Vec<u16>
where
    F: std::future::Future<Output = reqwest::Result<reqwest::Response>> + Send + 'static,
{
    let handles: Vec<_> = requests.map(tokio::spawn).collect();
    let mut statuses = Vec::new();
    for handle in handles {
        let response = handle.await.expect("task").expect("Failed to send request");
        statuses.push(response.status().as_u16());
    }
    statuses
}

#[tokio::test]
#[ignore]
async fn test_create_book_and_loan() {
    let client = Client::new();
    let user = register(&client, &unique_email("loan"), "secret").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(book_form("Infantil"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["age_range"], "children");

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "user_id": user["id"],
            "book_id": book["id"],
            "due_date": "2030-01-15T12:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, loan["id"]))
        .json(&json!({ "due_date": "2030-02-01T12:00:00Z" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let renewed: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(renewed["renewal_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_create_book_unknown_age_range() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(book_form("Unknown"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_loan_for_unknown_user() {
    let client = Client::new();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "user_id": i32::MAX,
            "book_id": i32::MAX,
            "due_date": "2030-01-15T12:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
