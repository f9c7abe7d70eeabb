//! End-to-end tests through the axum router

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use bookshelf::config::{Config, DEFAULT_LOGIN_PASSWORD};
use bookshelf::db::Database;
use bookshelf::{AppState, app};

async fn test_app() -> Router {
    let config = Config {
        host: None,
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "http-test-secret".to_string(),
        login_password: DEFAULT_LOGIN_PASSWORD.to_string(),
        token_lifetime_secs: 3600,
    };
    let db = Database::in_memory().await.unwrap();
    app(AppState::new(Arc::new(config), db))
}

async fn post_graphql(app: &Router, query: &str, authorization: Option<&str>) -> Value {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = builder
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_bearer_token_resolves_current_user() {
    let app = test_app().await;

    post_graphql(
        &app,
        r#"mutation { createUser(username: "mluukkai", favoriteGenre: "crime") { id } }"#,
        None,
    )
    .await;
    let login = post_graphql(
        &app,
        r#"mutation { login(username: "mluukkai", password: "secret") { value } }"#,
        None,
    )
    .await;
    let token = login["data"]["login"]["value"].as_str().unwrap().to_string();

    let me = post_graphql(&app, "{ me { username } }", Some(&format!("Bearer {token}"))).await;
    assert_eq!(me["data"], json!({ "me": { "username": "mluukkai" } }));

    let lowercase = post_graphql(&app, "{ me { username } }", Some(&format!("bearer {token}"))).await;
    assert_eq!(lowercase["data"], json!({ "me": { "username": "mluukkai" } }));
}

#[tokio::test]
async fn test_missing_or_invalid_token_means_anonymous() {
    let app = test_app().await;

    for authorization in [None, Some("Bearer not-a-token"), Some("Basic dXNlcjpwYXNz")] {
        let me = post_graphql(&app, "{ me { username } }", authorization).await;
        assert_eq!(me, json!({ "data": { "me": null } }));
    }
}

#[tokio::test]
async fn test_add_book_over_http_requires_token() {
    let app = test_app().await;

    let response = post_graphql(
        &app,
        r#"mutation { addBook(title: "Clean Code", author: "Robert Martin", published: 2008) { title } }"#,
        Some("Bearer forged"),
    )
    .await;

    assert_eq!(response["data"], json!({ "addBook": null }));
    assert_eq!(response["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_graphiql_only_for_browsers() {
    let app = test_app().await;

    let browser = Request::builder()
        .uri("/graphql")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(browser).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let script = Request::builder().uri("/graphql").body(Body::empty()).unwrap();
    let response = app.oneshot(script).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = test_app().await;

    let (status, body) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "bookshelf");

    let (status, body) = get_json(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": true, "store": "up" }));
}

#[tokio::test]
async fn test_readyz_reports_unreachable_store() {
    let config = Config {
        host: None,
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "http-test-secret".to_string(),
        login_password: DEFAULT_LOGIN_PASSWORD.to_string(),
        token_lifetime_secs: 3600,
    };
    let db = Database::in_memory().await.unwrap();
    let app = app(AppState::new(Arc::new(config), db.clone()));
    db.pool().close().await;

    let (status, body) = get_json(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "ready": false, "store": "down" }));

    let (status, _) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}
