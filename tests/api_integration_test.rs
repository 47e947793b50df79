use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use missing_pet_backend::config::AppConfig;
use missing_pet_backend::infrastructure::{database, seed};
use missing_pet_backend::services::storage::PhotoStorage;
use missing_pet_backend::{AppState, create_app};
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 2x2 RGB PNG, small enough to inline and valid enough to decode.
const TEST_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x08, 0x02, 0x00, 0x00, 0x00, 0xFD,
    0xD4, 0x9A, 0x73, 0x00, 0x00, 0x00, 0x11, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
    0xCF, 0xC0, 0xC0, 0xF0, 0x1F, 0x8C, 0x80, 0x18, 0x00, 0x1D, 0xF0, 0x03, 0xFD, 0xD3, 0xD0,
    0x7D, 0x26, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

struct MockPhotoStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockPhotoStorage {
    fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }
}

#[async_trait::async_trait]
impl PhotoStorage for MockPhotoStorage {
    async fn store(&self, key: &str, data: Vec<u8>) -> anyhow::Result<()> {
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Key not found"))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }
}

async fn setup_state() -> (AppState, Arc<MockPhotoStorage>) {
    unsafe {
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
    }
    // A single pooled connection keeps every query on the same in-memory db
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let config = AppConfig::development();
    seed::seed_app_settings(&db, &config).await.unwrap();

    let storage = Arc::new(MockPhotoStorage::new());
    let state = AppState {
        db,
        storage: storage.clone(),
        config,
    };
    (state, storage)
}

fn json_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn multipart_body(fields: &[(&str, &str)], photo: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(data) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"pet.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn create_request(token: &str, fields: &[(&str, &str)], photo: Option<&[u8]>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/announcements")
        .header("Authorization", format!("Bearer {token}"))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, photo)))
        .unwrap()
}

fn announcement_fields<'a>(description: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("description", description),
        ("announcement_type", "lost"),
        ("animal_type", "dog"),
        ("address", "Elm Street 13"),
        ("latitude", "55.75"),
        ("longitude", "37.61"),
        ("contact_phone_number", "+7912345678"),
    ]
}

async fn register_and_login(app: &axum::Router, email: &str, nickname: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/register",
            format!(r#"{{"email": "{email}", "nickname": "{nickname}", "password": "password123"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/login",
            format!(r#"{{"email": "{email}", "password": "password123"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

async fn get_json(app: &axum::Router, uri: &str) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    body_json(response).await
}

#[tokio::test]
async fn test_full_api_flow() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("missing_pet_backend=debug,tower_http=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();

    let (state, storage) = setup_state().await;
    let app = create_app(state.clone());

    // Registration validation
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/register",
            r#"{"email": "not-an-email", "nickname": "x", "password": "password123"}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let token_a = register_and_login(&app, "alice@example.com", "alice").await;

    // Second registration with the same email fails
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/register",
            r#"{"email": "alice@example.com", "nickname": "alice2", "password": "password123"}"#
                .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Wrong password
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/login",
            r#"{"email": "alice@example.com", "password": "wrong-password"}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Creating without a token is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/announcements")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    &announcement_fields("stray dog"),
                    Some(TEST_PNG),
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Owner is taken from the token even when the payload smuggles one in
    let mut fields = announcement_fields("lost dog near the park");
    fields.push(("user_id", "some-other-user"));
    fields.push(("user", "some-other-user"));
    let response = app
        .clone()
        .oneshot(create_request(&token_a, &fields, Some(TEST_PNG)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let alice_id = created["user_id"].as_str().unwrap().to_string();
    assert_ne!(alice_id, "some-other-user");
    let first_id = created["id"].as_str().unwrap().to_string();

    // Photo is served back under /media/
    let photo_url = created["photo"].as_str().unwrap().to_string();
    assert!(photo_url.starts_with("/media/announcements/"));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(photo_url.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], TEST_PNG);

    // Profile lookup requires auth and reflects registration data
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/users/{alice_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/users/{alice_id}"))
                .header("Authorization", format!("Bearer {token_a}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["nickname"], "alice");

    // Alice posts two more, Bob posts two
    for description in ["second report", "third report"] {
        let response = app
            .clone()
            .oneshot(create_request(
                &token_a,
                &announcement_fields(description),
                Some(TEST_PNG),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let token_b = register_and_login(&app, "bob@example.com", "bob").await;
    let mut bob_ids = Vec::new();
    for description in ["found cat", "found parrot"] {
        let mut fields = announcement_fields(description);
        fields[1] = ("announcement_type", "found");
        fields[2] = ("animal_type", "other");
        let response = app
            .clone()
            .oneshot(create_request(&token_b, &fields, Some(TEST_PNG)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        bob_ids.push(json["id"].as_str().unwrap().to_string());
    }
    let bob_id = {
        let json = get_json(&app, &format!("/api/announcements/{}", bob_ids[0])).await;
        json["user_id"].as_str().unwrap().to_string()
    };

    // Full listing covers both authors
    let json = get_json(&app, "/api/announcements").await;
    assert_eq!(json["total"], 5);
    assert_eq!(json["page"], 1);
    assert_eq!(json["items"].as_array().unwrap().len(), 5);

    // "Mine" and "feed" partition the listing by ownership
    let json = get_json(&app, &format!("/api/announcements/user/{alice_id}")).await;
    assert_eq!(json["total"], 3);
    assert!(
        json["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["user_id"] == alice_id.as_str())
    );

    let json = get_json(&app, &format!("/api/feed/{alice_id}")).await;
    assert_eq!(json["total"], 2);
    assert!(
        json["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["user_id"] == bob_id.as_str())
    );

    // Unknown user id gives an empty listing, not an error
    let json = get_json(&app, "/api/announcements/user/no-such-user").await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["items"].as_array().unwrap().len(), 0);

    // Map projections carry only point fields
    let json = get_json(&app, "/api/map").await;
    let points = json.as_array().unwrap();
    assert_eq!(points.len(), 5);
    for point in points {
        let keys: Vec<&String> = point.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert!(point.get("description").is_none());
        assert!(point.get("contact_phone_number").is_none());
    }

    let json = get_json(&app, &format!("/api/map/{alice_id}")).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // Page 0 is rejected; a page past the end is empty but well-formed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/announcements?page=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_json(&app, "/api/announcements?page=99").await;
    assert_eq!(json["items"].as_array().unwrap().len(), 0);
    assert_eq!(json["has_next"], false);
    assert_eq!(json["total"], 5);

    // Photo validation rejects non-images
    let response = app
        .clone()
        .oneshot(create_request(
            &token_a,
            &announcement_fields("bad photo"),
            Some(b"this is not an image at all"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing fields are rejected
    let response = app
        .clone()
        .oneshot(create_request(
            &token_a,
            &[("description", "only a description")],
            Some(TEST_PNG),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Only the owner may update
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/announcements/{}", bob_ids[1]))
                .header("Authorization", format!("Bearer {token_a}"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"description": "hijacked"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/announcements/{}", bob_ids[1]))
                .header("Authorization", format!("Bearer {token_b}"))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"description": "found a parrot, cage provided", "animal_type": "other"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["description"], "found a parrot, cage provided");
    assert_eq!(json["user_id"], bob_id.as_str());

    // Only the owner may delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/announcements/{}", bob_ids[0]))
                .header("Authorization", format!("Bearer {token_a}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let photo_key = get_json(&app, &format!("/api/announcements/{}", bob_ids[0]))
        .await["photo"]
        .as_str()
        .unwrap()
        .trim_start_matches("/media/")
        .to_string();
    assert!(storage.contains(&photo_key));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/announcements/{}", bob_ids[0]))
                .header("Authorization", format!("Bearer {token_b}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Record and stored photo are both gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/announcements/{}", bob_ids[0]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!storage.contains(&photo_key));

    // Unknown announcement id is a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/announcements/{first_id}-missing"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Seeded settings row is served
    let json = get_json(&app, "/api/settings").await;
    assert_eq!(json["settings_name"], "actual");

    // Health endpoint sees the database
    let json = get_json(&app, "/health").await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}
