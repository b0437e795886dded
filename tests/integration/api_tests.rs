//! API integration tests against a running server
//!
//! Start the server with a bootstrap superadmin, then run:
//! `CAMTRACK_TEST_USER=admin CAMTRACK_TEST_PASSWORD=... cargo test -- --ignored`

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn credentials() -> (String, String) {
    (
        std::env::var("CAMTRACK_TEST_USER").unwrap_or_else(|_| "admin".to_string()),
        std::env::var("CAMTRACK_TEST_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
    )
}

/// Unique suffix so repeated runs do not collide on codes
fn suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{:08x}", nanos)
}

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let (username, password) = credentials();
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_camera(client: &Client, token: &str, code: &str) -> Value {
    let response = client
        .post(format!("{}/cameras", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "code": code,
            "name": format!("Camera {}", code),
            "camera_type": "dome",
            "status": "active"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
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
async fn test_login() {
    let client = Client::new();
    let (username, password) = credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().get("set-cookie").is_some());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["permissions"].is_object());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": credentials().0,
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["username"], credentials().0);
}

#[tokio::test]
#[ignore]
async fn test_logout_invalidates_token() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/cameras", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_create_update_and_delete_camera() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let code = format!("CAM-T{}", suffix());

    let camera = create_camera(&client, &token, &code).await;
    let camera_id = camera["id"].as_i64().expect("No id in response");
    assert_eq!(camera["code"], code.as_str());

    // Duplicate code is a conflict
    let response = client
        .post(format!("{}/cameras", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "code": code, "name": "Duplicate" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .put(format!("{}/cameras/{}", BASE_URL, camera_id))
        .bearer_auth(&token)
        .json(&json!({ "resolution": "4MP" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["resolution"], "4MP");
    assert_eq!(body["name"], format!("Camera {}", code));

    let response = client
        .delete(format!("{}/cameras/{}", BASE_URL, camera_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_status_change_is_recorded_in_history() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let camera = create_camera(&client, &token, &format!("CAM-H{}", suffix())).await;
    let camera_id = camera["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/cameras/{}/status", BASE_URL, camera_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "maintenance", "reason": "lens cleaning" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/equipment/camera/{}/history", BASE_URL, camera_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let history: Value = response.json().await.expect("Failed to parse response");
    let entries = history.as_array().expect("History is not an array");
    assert!(entries.iter().any(|e| e["new_status"] == "maintenance"));
}

#[tokio::test]
#[ignore]
async fn test_failure_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = suffix();

    let camera = create_camera(&client, &token, &format!("CAM-F{}", tag)).await;
    let camera_id = camera["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/technicians", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "employee_code": format!("T{}", tag),
            "first_name": "Test",
            "last_name": "Technician"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let technician: Value = response.json().await.expect("Failed to parse response");
    let technician_id = technician["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/failures", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "No video signal",
            "priority": "high",
            "equipment_kind": "camera",
            "equipment_id": camera_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let failure: Value = response.json().await.expect("Failed to parse response");
    let failure_id = failure["id"].as_i64().expect("No id in response");
    assert_eq!(failure["status"], "open");
    assert!(failure["code"].as_str().unwrap_or_default().starts_with("F-"));

    // Resolving an unassigned ticket is rejected
    let response = client
        .post(format!("{}/failures/{}/resolve", BASE_URL, failure_id))
        .bearer_auth(&token)
        .json(&json!({ "resolution": "too early" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_client_error());

    let steps = [
        ("assign", json!({ "technician_id": technician_id }), "assigned"),
        ("start", json!({}), "in_progress"),
        ("resolve", json!({ "resolution": "Replaced PoE injector" }), "resolved"),
    ];
    for (action, body, expected) in steps {
        let response = client
            .post(format!("{}/failures/{}/{}", BASE_URL, failure_id, action))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "{} failed", action);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], expected);
    }

    let response = client
        .post(format!("{}/failures/{}/close", BASE_URL, failure_id))
        .bearer_auth(&token)
        .json(&json!({ "record_maintenance": true, "downtime_minutes": 45 }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/cameras/{}", BASE_URL, camera_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let camera: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(camera["status"], "active");
}

#[tokio::test]
#[ignore]
async fn test_equipment_search_requires_term() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/equipment/search?q=", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_dashboard_and_map() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for path in ["dashboard/stats", "dashboard/alerts", "reports/summary", "map/cameras", "map/stats"] {
        let response = client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "{} failed", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_import_rejects_non_workbook() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let form = multipart::Form::new()
        .part(
            "file",
            multipart::Part::bytes(b"code;name\n".to_vec()).file_name("cameras.csv"),
        )
        .text("dry_run", "true");

    let response = client
        .post(format!("{}/imports/cameras", BASE_URL))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
