mod common;

use axum::http::StatusCode;
use clinic_service::domain::user::models::Role;
use clinic_service::domain::user::models::UserStatus;
use common::TestApp;
use serde_json::json;

fn error_code(body: &serde_json::Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

async fn seed_practice(app: &TestApp) -> (String, String, String) {
    app.seed_user("Root", "root@x.com", "secret1", Role::Master, UserStatus::Active)
        .await;
    app.seed_user(
        "Nadia",
        "nadia@x.com",
        "secret1",
        Role::Nutritionist,
        UserStatus::Active,
    )
    .await;
    app.seed_user("Paulo", "paulo@x.com", "secret1", Role::Patient, UserStatus::Active)
        .await;

    let master = app.access_token("root@x.com", "secret1").await;
    let nutri = app.access_token("nadia@x.com", "secret1").await;
    let patient = app.access_token("paulo@x.com", "secret1").await;
    (master, nutri, patient)
}

#[tokio::test]
async fn test_listing_is_role_scoped() {
    let app = TestApp::spawn();
    let (master, nutri, patient) = seed_practice(&app).await;

    let (status, body) = app.request("GET", "/users", Some(&master), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);

    // Nutritionists only ever see patients, even with a role filter.
    let (status, body) = app
        .request("GET", "/users?role=master", Some(&nutri), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["role"], "patient");

    let (status, body) = app.request("GET", "/users", Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "auth.forbidden");
}

#[tokio::test]
async fn test_listing_supports_search_and_pagination() {
    let app = TestApp::spawn();
    let (master, _, _) = seed_practice(&app).await;
    for i in 0..3 {
        app.seed_user(
            &format!("Extra {}", i),
            &format!("extra{}@x.com", i),
            "secret1",
            Role::Patient,
            UserStatus::Active,
        )
        .await;
    }

    let (status, body) = app
        .request("GET", "/users?q=extra&per_page=2", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["per_page"], 2);
}

#[tokio::test]
async fn test_create_role_rules() {
    let app = TestApp::spawn();
    let (master, nutri, patient) = seed_practice(&app).await;

    let (status, body) = app
        .request(
            "POST",
            "/users",
            Some(&master),
            Some(json!({
                "name": "New Nutri",
                "email": "n2@x.com",
                "role": "nutritionist",
                "password": "secret1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().unwrap() > 0);

    let (status, body) = app
        .request(
            "POST",
            "/users",
            Some(&nutri),
            Some(json!({
                "name": "Another Nutri",
                "email": "n3@x.com",
                "role": "nutritionist",
                "password": "secret1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "users.forbidden_role");

    let (status, _) = app
        .request(
            "POST",
            "/users",
            Some(&nutri),
            Some(json!({
                "name": "New Patient",
                "email": "p2@x.com",
                "role": "patient",
                "password": "secret1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            "POST",
            "/users",
            Some(&patient),
            Some(json!({
                "name": "Sneaky",
                "email": "s@x.com",
                "role": "patient",
                "password": "secret1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_duplicate_email() {
    let app = TestApp::spawn();
    let (master, _, _) = seed_practice(&app).await;

    let (status, body) = app
        .request(
            "POST",
            "/users",
            Some(&master),
            Some(json!({
                "name": "Duplicate",
                "email": "Paulo@X.com",
                "role": "patient",
                "password": "secret1"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "users.email_exists");
}

#[tokio::test]
async fn test_nutritionist_cannot_manage_non_patients() {
    let app = TestApp::spawn();
    let (_, nutri, _) = seed_practice(&app).await;

    // User 2 is the nutritionist herself; user 1 is the master.
    let (status, body) = app.request("GET", "/users/1", Some(&nutri), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "users.forbidden_role");

    let (status, _) = app
        .request(
            "PUT",
            "/users/1",
            Some(&nutri),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("DELETE", "/users/1", Some(&nutri), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_show_update_and_toggle() {
    let app = TestApp::spawn();
    let (master, _, _) = seed_practice(&app).await;

    let (status, body) = app.request("GET", "/users/3", Some(&master), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "paulo@x.com");
    assert!(body["created_at"].is_string());

    let (status, _) = app
        .request(
            "PUT",
            "/users/3",
            Some(&master),
            Some(json!({ "name": "Paulo Renamed", "photo_url": "https://cdn.x/p.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.request("GET", "/users/3", Some(&master), None).await;
    assert_eq!(body["name"], "Paulo Renamed");
    assert_eq!(body["photo_url"], "https://cdn.x/p.jpg");

    let (status, body) = app
        .request("PATCH", "/users/3/status", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");

    let (_, body) = app
        .request("PATCH", "/users/3/status", Some(&master), None)
        .await;
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::spawn();
    let (master, _, _) = seed_practice(&app).await;

    let (status, _) = app.request("DELETE", "/users/3", Some(&master), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request("GET", "/users/3", Some(&master), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "users.not_found");
}

#[tokio::test]
async fn test_self_profile_update() {
    let app = TestApp::spawn();
    let (_, _, patient) = seed_practice(&app).await;

    let (status, _) = app
        .request(
            "PUT",
            "/users/me",
            Some(&patient),
            Some(json!({ "name": "Paulo Himself", "password": "new-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // New password works; the role did not change.
    let token = app.access_token("paulo@x.com", "new-secret").await;
    let (_, body) = app.request("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(body["name"], "Paulo Himself");
    assert_eq!(body["role"], "patient");
}

#[tokio::test]
async fn test_self_profile_update_duplicate_email() {
    let app = TestApp::spawn();
    let (_, _, patient) = seed_practice(&app).await;

    let (status, body) = app
        .request(
            "PUT",
            "/users/me",
            Some(&patient),
            Some(json!({ "email": "nadia@x.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "users.email_exists");
}

#[tokio::test]
async fn test_users_routes_require_authentication() {
    let app = TestApp::spawn();

    let (status, body) = app.request("GET", "/users", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "auth.missing_token");
}
