use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marquee::config::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
const BOUNDARY: &str = "marquee-test-boundary";

struct TestApp {
    router: Router,
    upload_dir: PathBuf,
}

async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let upload_dir =
        std::env::temp_dir().join(format!("marquee-api-tests-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.uploads.directory = upload_dir.to_string_lossy().into_owned();
    // Keep Argon2 cheap in tests
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    configure(&mut config);

    let state = marquee::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    TestApp {
        router: marquee::api::router(state),
        upload_dir,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn upload(
    app: &TestApp,
    uri: &str,
    token: &str,
    field: &str,
    filename: &str,
) -> (StatusCode, Value) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Registers a user and logs them in, returning `(user_id, token)`.
async fn register_and_login(app: &TestApp, name: &str, email: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(
        app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let id = body["data"]["id"].as_i64().unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (id, token)
}

fn movie_payload(title: &str) -> Value {
    json!({
        "title": title,
        "description": "A thief who steals corporate secrets through dream-sharing.",
        "genre": "Scifi",
        "year": 2010,
        "preview": "https://example.com/preview.mp4",
        "video": "https://example.com/video.mp4",
        "actors": ["Leonardo DiCaprio", "Elliot Page"],
        "director": "Christopher Nolan",
        "duration": 148,
        "poster": "poster.jpg",
        "backgroundImage": "background.jpg",
        "backgroundColor": "#1A2B3C"
    })
}

async fn create_movie(app: &TestApp, token: &str, title: &str) -> i64 {
    let (status, body) = send(app, "POST", "/api/movies", Some(token), Some(movie_payload(title))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn comment(app: &TestApp, token: &str, movie_id: i64, rating: i32) -> StatusCode {
    let (status, _) = send(
        app,
        "POST",
        "/api/comments",
        Some(token),
        Some(json!({ "movieId": movie_id, "rating": rating, "text": "Worth watching twice." })),
    )
    .await;
    status
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;
    let (id, token) = register_and_login(&app, "Keks", "keks@example.com").await;
    assert!(id > 0);

    let (status, body) = send(&app, "GET", "/api/users/login", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "keks@example.com");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("salt").is_none());

    let (status, _) = send(&app, "GET", "/api/users/login", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    register_and_login(&app, "Keks", "keks@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "name": "Other", "email": "keks@example.com", "password": "another" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let app = spawn_app().await;
    register_and_login(&app, "Keks", "keks@example.com").await;

    for (email, password) in [
        ("keks@example.com", "wrong12"),
        ("nobody@example.com", "secret1"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/movies", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_is_not_implemented() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "DELETE", "/api/users/logout", None, None).await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_movie_requires_authentication_and_valid_input() {
    let app = spawn_app().await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;

    let (status, _) = send(&app, "POST", "/api/movies", None, Some(movie_payload("Inception"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut payload = movie_payload("Inception");
    payload["genre"] = json!("Western");
    let (status, _) = send(&app, "POST", "/api/movies", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/movies/0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/movies/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inception_rating_scenario() {
    let app = spawn_app().await;
    let (_, owner) = register_and_login(&app, "Owner", "owner@example.com").await;
    let (_, viewer) = register_and_login(&app, "Viewer", "viewer@example.com").await;

    let movie_id = create_movie(&app, &owner, "Inception").await;

    let (status, body) = send(&app, "GET", &format!("/api/movies/{movie_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["rating"].is_null());
    assert_eq!(body["data"]["commentCount"], 0);

    assert_eq!(comment(&app, &owner, movie_id, 8).await, StatusCode::CREATED);
    assert_eq!(comment(&app, &viewer, movie_id, 10).await, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/api/movies/{movie_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Inception");
    assert_eq!(body["data"]["rating"].as_f64(), Some(9.0));
    assert_eq!(body["data"]["commentCount"], 2);
    assert_eq!(body["data"]["user"]["email"], "owner@example.com");

    let (status, body) = send(&app, "GET", "/api/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["commentCount"], 2);
    assert!(body["data"][0].get("rating").is_none());

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/movies/{movie_id}/comments"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["rating"], 10);
    assert_eq!(comments[0]["user"]["email"], "viewer@example.com");
}

#[tokio::test]
async fn test_comment_on_missing_movie() {
    let app = spawn_app().await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;

    assert_eq!(comment(&app, &token, 42, 5).await, StatusCode::NOT_FOUND);
    assert_eq!(comment(&app, &token, 42, 11).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_movies_filters_and_limits() {
    let app = spawn_app().await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;

    create_movie(&app, &token, "First").await;
    let mut drama = movie_payload("Second");
    drama["genre"] = json!("Drama");
    let (status, _) = send(&app, "POST", "/api/movies", Some(&token), Some(drama)).await;
    assert_eq!(status, StatusCode::CREATED);
    create_movie(&app, &token, "Third").await;

    let (_, body) = send(&app, "GET", "/api/movies?limit=2", None, None).await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Third", "Second"]);

    let (_, body) = send(&app, "GET", "/api/movies?genre=Drama", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Second");

    let (status, _) = send(&app, "GET", "/api/movies?limit=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_movies_default_limit() {
    let app = spawn_app_with(|config| config.catalog.default_movie_limit = 2).await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;

    for title in ["First", "Second", "Third"] {
        create_movie(&app, &token, title).await;
    }

    let (status, body) = send(&app, "GET", "/api/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let movies = body["data"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["title"], "Third");

    let (_, body) = send(&app, "GET", "/api/movies?limit=3", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_comment_page_limits() {
    let app = spawn_app_with(|config| config.catalog.comment_page_size = 2).await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;
    let movie_id = create_movie(&app, &token, "Inception").await;

    for rating in [4, 6, 9] {
        assert_eq!(comment(&app, &token, movie_id, rating).await, StatusCode::CREATED);
    }

    let uri = format!("/api/movies/{movie_id}/comments");

    let (status, body) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ratings: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["rating"].as_i64().unwrap())
        .collect();
    assert_eq!(ratings, [9, 6]);

    let (status, body) = send(&app, "GET", &format!("{uri}?limit=1"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    for limit in [0, 3] {
        let (status, _) = send(&app, "GET", &format!("{uri}?limit={limit}"), None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "limit={limit}");
    }
}

#[tokio::test]
async fn test_promo_movie() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/movies/promo", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;
    let movie_id = create_movie(&app, &token, "Inception").await;

    let (status, body) = send(&app, "GET", "/api/movies/promo", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(movie_id));
}

#[tokio::test]
async fn test_edit_and_delete_require_owner() {
    let app = spawn_app().await;
    let (_, owner) = register_and_login(&app, "Owner", "owner@example.com").await;
    let (_, stranger) = register_and_login(&app, "Stranger", "stranger@example.com").await;
    let movie_id = create_movie(&app, &owner, "Inception").await;
    let uri = format!("/api/movies/{movie_id}");

    let (status, _) = send(&app, "PATCH", &uri, Some(&stranger), Some(json!({ "title": "Mine" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "PATCH", "/api/movies/999", Some(&stranger), Some(json!({ "title": "Mine" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PATCH", &uri, Some(&owner), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PATCH", &uri, Some(&owner), Some(json!({ "title": "Inception (2010)" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Inception (2010)");
    assert_eq!(body["data"]["director"], "Christopher Nolan");

    let (status, _) = send(&app, "DELETE", &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_movie_cascades() {
    let app = spawn_app().await;
    let (_, owner) = register_and_login(&app, "Owner", "owner@example.com").await;
    let movie_id = create_movie(&app, &owner, "Inception").await;

    assert_eq!(comment(&app, &owner, movie_id, 7).await, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/users/favorites/{movie_id}/1"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/api/movies/{movie_id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/movies/{movie_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/movies/{movie_id}/comments"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/users/favorites", Some(&owner), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorites_scenario() {
    let app = spawn_app().await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;
    let movie_id = create_movie(&app, &token, "Inception").await;
    let favor_uri = format!("/api/users/favorites/{movie_id}/1");

    let (status, body) = send(&app, "GET", "/api/users/favorites", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &favor_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isFavorite"], true);
    }

    let (_, body) = send(&app, "GET", "/api/users/favorites", Some(&token), None).await;
    let favorites = body["data"].as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["id"].as_i64(), Some(movie_id));

    let (_, body) = send(&app, "GET", &format!("/api/movies/{movie_id}"), Some(&token), None).await;
    assert_eq!(body["data"]["isFavorite"], true);
    let (_, body) = send(&app, "GET", &format!("/api/movies/{movie_id}"), None, None).await;
    assert_eq!(body["data"]["isFavorite"], false);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/users/favorites/{movie_id}/0"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isFavorite"], false);

    let (_, body) = send(&app, "GET", "/api/users/favorites", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_status_validation() {
    let app = spawn_app().await;
    let (_, token) = register_and_login(&app, "Keks", "keks@example.com").await;

    let (status, _) = send(&app, "POST", "/api/users/favorites/1/2", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/users/favorites/999/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/users/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_avatar_upload() {
    let app = spawn_app().await;
    let (user_id, token) = register_and_login(&app, "Keks", "keks@example.com").await;
    let (other_id, _) = register_and_login(&app, "Other", "other@example.com").await;

    let (status, body) = upload(
        &app,
        &format!("/api/users/{user_id}/avatar"),
        &token,
        "avatar",
        "me.png",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let avatar = body["data"]["avatar"].as_str().unwrap();
    assert!(avatar.ends_with(".png"));
    assert!(app.upload_dir.join(avatar).exists());

    let (status, _) = upload(
        &app,
        &format!("/api/users/{other_id}/avatar"),
        &token,
        "avatar",
        "me.png",
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = upload(
        &app,
        &format!("/api/users/{user_id}/avatar"),
        &token,
        "avatar",
        "me.gif",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_poster_upload_by_owner_only() {
    let app = spawn_app().await;
    let (_, owner) = register_and_login(&app, "Owner", "owner@example.com").await;
    let (_, stranger) = register_and_login(&app, "Stranger", "stranger@example.com").await;
    let movie_id = create_movie(&app, &owner, "Inception").await;
    let uri = format!("/api/movies/{movie_id}/poster");

    let (status, _) = upload(&app, &uri, &stranger, "poster", "poster.png").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    // The rejected upload must not be left behind
    let leftover = std::fs::read_dir(&app.upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);

    let (status, body) = upload(&app, &uri, &owner, "poster", "poster.png").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let poster = body["data"]["poster"].as_str().unwrap().to_string();

    let (_, body) = send(&app, "GET", &format!("/api/movies/{movie_id}"), None, None).await;
    assert_eq!(body["data"]["poster"], poster.as_str());

    let (status, body) = upload(
        &app,
        &format!("/api/movies/{movie_id}/background"),
        &owner,
        "backgroundImage",
        "bg.png",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["backgroundImage"].is_string());
}
