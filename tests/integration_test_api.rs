mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;

const ORGANIZER: Option<&str> = Some("organizer-1");

fn event_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Join us for *talks*",
        "location": "Main Hall",
        "event_date": (Utc::now() + Duration::days(10)).to_rfc3339(),
        "max_capacity": 2,
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_graceful_shutdown_closes_pool() {
    let app = TestApp::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(registration_backend::serve(listener, app.state.clone(), async {
        let _ = stopped.await;
    }));

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(!app.state.gateway.is_closed());

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
    assert!(app.state.gateway.is_closed());
}

#[tokio::test]
async fn test_admin_routes_require_actor() {
    let app = TestApp::new().await;

    let (status, _) = app.request(Method::GET, "/api/v1/admin/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::POST, "/api/v1/admin/events", Some("  "), Some(event_payload("Nope")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_event_validation_names_field() {
    let app = TestApp::new().await;

    let mut payload = event_payload("Bad Date");
    payload["event_date"] = json!("tomorrow-ish");
    let (status, body) = app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "event_date");

    let mut payload = event_payload("Bad Capacity");
    payload["max_capacity"] = json!(0);
    let (status, body) = app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "max_capacity");

    let mut payload = event_payload("Far North");
    payload["latitude"] = json!(123.0);
    let (status, body) = app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "latitude");

    let (status, body) = app
        .request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(event_payload("   ")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "title");
}

#[tokio::test]
async fn test_public_registration_flow() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(event_payload("Rust Night")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "rust-night");
    assert_eq!(created["created_by"], "organizer-1");

    let (status, listed) = app.request(Method::GET, "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, reg) = app
        .request(
            Method::POST,
            "/api/v1/events/rust-night/register",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(reg.get("cancel_token").is_none());
    let cancel_url = reg["cancel_url"].as_str().unwrap().to_string();
    assert!(cancel_url.starts_with("http://localhost:8080/cancel/"));

    let (status, _) = app
        .request(Method::POST, "/api/v1/events/rust-night/register", None, Some(json!({ "name": "Bob" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(Method::POST, "/api/v1/events/rust-night/register", None, Some(json!({ "name": "Cy" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "registration_full");

    let (status, page) = app.request(Method::GET, "/api/v1/events/rust-night", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["registration_count"], 2);
    assert_eq!(page["remaining_capacity"], 0);
    assert_eq!(page["attendees"], json!(["Ada", "Bob"]));
    assert!(page["description_html"].as_str().unwrap().contains("<em>talks</em>"));

    let token = cancel_url.rsplit('/').next().unwrap();
    let (status, cancelled) = app
        .request(Method::POST, &format!("/api/v1/cancel/{}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["registration"]["name"], "Ada");
    assert_eq!(cancelled["event_slug"], "rust-night");

    let (status, _) = app
        .request(Method::POST, &format!("/api/v1/cancel/{}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = app.request(Method::GET, "/api/v1/events/rust-night", None, None).await;
    assert_eq!(page["registration_count"], 1);
}

#[tokio::test]
async fn test_private_attendee_list_is_hidden() {
    let app = TestApp::new().await;

    let mut payload = event_payload("Private Dinner");
    payload["attendee_list_public"] = json!(false);
    app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;
    app.request(Method::POST, "/api/v1/events/private-dinner/register", None, Some(json!({ "name": "Eve" })))
        .await;

    let (status, page) = app.request(Method::GET, "/api/v1/events/private-dinner", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.get("attendees").is_none());
}

#[tokio::test]
async fn test_register_unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(Method::POST, "/api/v1/events/ghost/register", None, Some(json!({ "name": "Nobody" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "event_not_found");
}

#[tokio::test]
async fn test_register_closed_event_conflicts() {
    let app = TestApp::new().await;

    let mut payload = event_payload("Closed Doors");
    payload["registration_open"] = json!(false);
    app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;

    let (status, body) = app
        .request(Method::POST, "/api/v1/events/closed-doors/register", None, Some(json!({ "name": "Tim" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "registration_not_open");
}

#[tokio::test]
async fn test_admin_event_management() {
    let app = TestApp::new().await;

    let (_, created) = app
        .request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(event_payload("Board Games")))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut update = event_payload("Board Games Deluxe");
    update["max_capacity"] = json!(12);
    let (status, updated) = app
        .request(Method::PUT, &format!("/api/v1/admin/events/{}", id), ORGANIZER, Some(update))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slug"], "board-games");
    assert_eq!(updated["max_capacity"], 12);

    let (status, clone) = app
        .request(Method::POST, &format!("/api/v1/admin/events/{}/clone", id), ORGANIZER, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(clone["title"], "Board Games Deluxe (copy)");
    assert_eq!(clone["registration_open"], false);

    let (status, all) = app.request(Method::GET, "/api/v1/admin/events", ORGANIZER, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, reg) = app
        .request(Method::POST, "/api/v1/events/board-games/register", None, Some(json!({ "name": "Kim" })))
        .await;
    let registration_id = reg["id"].as_str().unwrap().to_string();

    let (status, attendees) = app
        .request(Method::GET, &format!("/api/v1/admin/events/{}/attendees", id), ORGANIZER, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attendees["count"], 1);
    assert_eq!(attendees["registrations"][0]["name"], "Kim");

    let (status, dashboard) = app.request(Method::GET, "/api/v1/admin/dashboard", ORGANIZER, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["events"], 2);
    assert_eq!(dashboard["upcoming_events"], 2);
    assert_eq!(dashboard["registrations"], 1);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/events/{}/attendees/{}", id, registration_id),
            ORGANIZER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/events/{}/attendees/{}", id, registration_id),
            ORGANIZER,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, &format!("/api/v1/admin/events/{}", id), ORGANIZER, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, &format!("/api/v1/admin/events/{}", id), ORGANIZER, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slug_collision_on_update_conflicts() {
    let app = TestApp::new().await;

    app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(event_payload("Taken"))).await;
    let (_, other) = app
        .request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(event_payload("Other")))
        .await;

    let mut update = event_payload("Other");
    update["slug"] = json!("taken");
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/events/{}", other["id"].as_str().unwrap()),
            ORGANIZER,
            Some(update),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_releases_unshared_assets() {
    let app = TestApp::new().await;
    std::fs::write(app.upload_dir.join("shared.png"), b"img").unwrap();
    std::fs::write(app.upload_dir.join("banner.png"), b"img").unwrap();

    let mut payload = event_payload("With Media");
    payload["image_path"] = json!("shared.png");
    payload["banner_path"] = json!("banner.png");
    let (_, created) = app.request(Method::POST, "/api/v1/admin/events", ORGANIZER, Some(payload)).await;
    let id = created["id"].as_str().unwrap().to_string();

    // The clone keeps referring to both files.
    let (_, clone) = app
        .request(Method::POST, &format!("/api/v1/admin/events/{}/clone", id), ORGANIZER, None)
        .await;
    let clone_id = clone["id"].as_str().unwrap().to_string();

    app.request(Method::DELETE, &format!("/api/v1/admin/events/{}", id), ORGANIZER, None).await;
    assert!(app.upload_dir.join("shared.png").exists());
    assert!(app.upload_dir.join("banner.png").exists());

    app.request(Method::DELETE, &format!("/api/v1/admin/events/{}", clone_id), ORGANIZER, None).await;
    assert!(!app.upload_dir.join("shared.png").exists());
    assert!(!app.upload_dir.join("banner.png").exists());
}

#[tokio::test]
async fn test_site_settings_round_trip() {
    let app = TestApp::new().await;

    let (status, site) = app.request(Method::GET, "/api/v1/site", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(site["site_name"], "LibreRegistration");
    assert_eq!(site["accent_color"], "#6d28d9");

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/v1/admin/settings",
            ORGANIZER,
            Some(json!({ "site_name": "Community Hub", "accent_color": "#112233" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site"]["site_name"], "Community Hub");
    assert_eq!(body["settings"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .request(Method::PUT, "/api/v1/admin/settings", ORGANIZER, Some(json!({ "accent_color": "purple" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "accent_color");

    let (_, site) = app.request(Method::GET, "/api/v1/site", None, None).await;
    assert_eq!(site["site_name"], "Community Hub");
    assert_eq!(site["accent_color"], "#112233");
}
