//! End-to-end API test against a real PostgreSQL database.
//!
//! Requires `TEST_DATABASE_URL`; the test is a no-op when it is unset so the
//! suite stays green on machines without a database.

use institute_api::{build_router, ensure_tables, AppState, Registry, TokenSigner};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

const JWT_SECRET: &str = "black-box-test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(pool: sqlx::PgPool) -> Self {
        let registry = Arc::new(Registry::new());
        ensure_tables(&pool, &registry).await.expect("ddl");
        let state = AppState {
            pool,
            registry,
            signer: TokenSigner::new(JWT_SECRET, 3600),
        };
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TestServer { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Token minted the same way the server does, so protected routes accept it.
fn mint_token() -> String {
    TokenSigner::new(JWT_SECRET, 3600)
        .issue(1, "tester@example.com", "user")
        .expect("token")
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    Some(
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect test database"),
    )
}

#[tokio::test]
async fn course_crud_round_trip() {
    let Some(pool) = test_pool().await else { return };
    let server = TestServer::spawn(pool).await;
    let client = reqwest::Client::new();
    let token = mint_token();
    let courses = format!("{}/v1/courses", server.base_url);

    // Create, then read back: same fields plus id and default status.
    let created = client
        .post(&courses)
        .bearer_auth(&token)
        .json(&json!({
            "courseName": format!("Rust Systems {}", unique_suffix()),
            "duration": "3 months",
            "courseFee": "15000"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status"], json!(true));

    let fetched: Value = client
        .get(format!("{}/{}", courses, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["courseName"], created["data"]["courseName"]);
    assert_eq!(fetched["duration"], json!("3 months"));

    // List obeys the limit and reports consistent pagination metadata.
    let listed: Value = client
        .get(format!("{}?page=1&limit=10", courses))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed["data"].as_array().unwrap().len() <= 10);
    let total = listed["totalRecords"].as_i64().unwrap();
    assert_eq!(listed["totalPages"].as_i64().unwrap(), (total + 9) / 10);
    assert_eq!(listed["currentPage"], json!(1));

    // Toggle is its own inverse.
    let toggle_url = format!("{}/{}/status", courses, id);
    let once: Value = client
        .patch(&toggle_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(once["status"], json!(false));
    let twice: Value = client
        .patch(&toggle_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(twice["status"], json!(true));

    // Delete is permanent; a second delete is a clean 404.
    let deleted = client
        .delete(format!("{}/{}", courses, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let again = client
        .delete(format!("{}/{}", courses, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fee_amounts_drive_derived_status() {
    let Some(pool) = test_pool().await else { return };
    let server = TestServer::spawn(pool).await;
    let client = reqwest::Client::new();
    let token = mint_token();
    let fees = format!("{}/v1/feeUpdates", server.base_url);

    let created: Value = client
        .post(&fees)
        .bearer_auth(&token)
        .json(&json!({
            "centerName": "Pune Center",
            "course": "Rust",
            "batch": "B1",
            "studentName": format!("Student {}", unique_suffix()),
            "phone": "9876543210",
            "modeOfPayment": "UPI",
            "totalAmount": 500.0,
            "receivedAmount": 300.0,
            // Client-sent derived fields must be ignored.
            "pendingAmount": 0.0,
            "status": "Paid"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["data"]["pendingAmount"], json!(200.0));
    assert_eq!(created["data"]["status"], json!("Pending"));

    let id = created["data"]["id"].as_i64().unwrap();
    let updated: Value = client
        .put(format!("{}/{}", fees, id))
        .bearer_auth(&token)
        .json(&json!({
            "centerName": "Pune Center",
            "course": "Rust",
            "batch": "B1",
            "studentName": created["data"]["studentName"],
            "phone": "9876543210",
            "modeOfPayment": "UPI",
            "totalAmount": 500.0,
            "receivedAmount": 500.0
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["data"]["pendingAmount"], json!(0.0));
    assert_eq!(updated["data"]["status"], json!("Paid"));
}

#[tokio::test]
async fn login_flows_and_suspension() {
    let Some(pool) = test_pool().await else { return };
    let server = TestServer::spawn(pool).await;
    let client = reqwest::Client::new();
    let token = mint_token();
    let suffix = unique_suffix();

    // User login: wrong password is 401 and yields no token.
    let email = format!("asha{}@example.com", suffix);
    let created = client
        .post(format!("{}/v1/user", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Asha",
            "roleName": "admin",
            "email": email,
            "password": "hunter22",
            "phone": "9876543210"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    assert!(created["data"].get("password").is_none(), "hash leaked");

    let bad = client
        .post(format!("{}/v1/login", server.base_url))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
    let bad: Value = bad.json().await.unwrap();
    assert!(bad.get("token").is_none());

    let good: Value = client
        .post(format!("{}/v1/login", server.base_url))
        .json(&json!({"email": email, "password": "hunter22"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(good["token"].as_str().unwrap().len() > 20);
    assert_eq!(good["user"]["email"], json!(email));

    // Center login: suspension wins over correct credentials.
    let center_email = format!("center{}@example.com", suffix);
    let center: Value = client
        .post(format!("{}/v1/centers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "centerId": format!("C-{}", suffix),
            "centerName": "Pune Center",
            "ownerName": "R. Kulkarni",
            "mobileNo": "9876543210",
            "emailId": center_email,
            "password": "secret123",
            "address": "FC Road"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let center_id = center["data"]["id"].as_i64().unwrap();

    client
        .patch(format!("{}/v1/centers/{}/status", server.base_url, center_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let suspended = client
        .post(format!("{}/v1/centers/login", server.base_url))
        .json(&json!({"emailId": center_email, "password": "secret123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(suspended.status(), StatusCode::FORBIDDEN);
    let suspended: Value = suspended.json().await.unwrap();
    assert_eq!(suspended["message"], json!("This center has been suspended"));
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let Some(pool) = test_pool().await else { return };
    let server = TestServer::spawn(pool).await;
    let client = reqwest::Client::new();

    let missing = client
        .get(format!("{}/v1/courses", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let missing: Value = missing.json().await.unwrap();
    assert_eq!(missing["message"], json!("Access denied. No token provided."));

    let bad = client
        .get(format!("{}/v1/courses", server.base_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    // Health stays public.
    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_unique_field_is_a_conflict_not_a_server_error() {
    let Some(pool) = test_pool().await else { return };
    let server = TestServer::spawn(pool).await;
    let client = reqwest::Client::new();
    let token = mint_token();
    let suffix = unique_suffix();

    let body = json!({
        "batch": "B1",
        "course": "Rust",
        "centerName": "Pune Center",
        "studentName": format!("Dup Student {}", suffix),
        "phone": format!("9{}", suffix % 1_000_000_000),
        "resumeCreation": "A",
        "presentation": "B",
        "groupDiscussion": "A",
        "technical": "A",
        "mockInterview": "B"
    });
    let first = client
        .post(format!("{}/v1/skills", server.base_url))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{}/v1/skills", server.base_url))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}
