use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};
use service::auth::{repository::mock::MockAuthRepository, AuthConfig, AuthService};
use service::category::{repository::mock::InMemoryCategoryRepository, CategoryService};
use service::product::{repository::mock::InMemoryProductStore, ProductService};
use service::storage::InMemoryBlobUploader;

const BOUNDARY: &str = "automart-test-boundary";

struct TestApp {
    app: Router,
    store: Arc<InMemoryProductStore>,
    blobs: Arc<InMemoryBlobUploader>,
}

fn test_app() -> TestApp {
    let categories = Arc::new(InMemoryCategoryRepository::with_categories([("ENG", "Engine")]));
    let store = Arc::new(InMemoryProductStore::default());
    let blobs = Arc::new(InMemoryBlobUploader::default());
    let state = ServerState {
        auth: Arc::new(AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("test-secret", 1))),
        categories: Arc::new(CategoryService::new(categories.clone())),
        products: Arc::new(ProductService::new(categories, store.clone(), blobs.clone())),
    };
    let app = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive());
    TestApp { app, store, blobs }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()
}

fn bare_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(method: &str, uri: &str, token: &str, fields: &[(&str, &str)], img: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
    }
    if let Some(bytes) = img {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"img\"; filename=\"bolt.png\"\r\nContent-Type: image/png\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn product_fields<'a>(price: &'a str, date: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Bolt"),
        ("price", price),
        ("cost", "60"),
        ("stock", "10"),
        ("min_stock", "2"),
        ("receiving_date", date),
        ("code", "B-001"),
        ("location", "A1"),
    ]
}

async fn signed_in(app: &Router) -> String {
    let email = format!("user_{}@example.com", uuid::Uuid::new_v4());
    let (status, _) = send(app, json_request("POST", "/auth/signup", None, json!({"email": email, "name": "Tester", "password": "S3curePass!"}))).await;
    assert_eq!(status, StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/auth/signin", None, json!({"email": email, "password": "S3curePass!"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let t = test_app();
    let resp = t.app.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, doc) = send(&t.app, Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/products"].is_object());
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_token() {
    let t = test_app();
    let (status, _) = send(&t.app, Request::get("/products").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&t.app, bare_request("GET", "/categories", "not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let basic = Request::get("/categories").header(header::AUTHORIZATION, "Basic abc").body(Body::empty()).unwrap();
    let (status, _) = send(&t.app, basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_token_is_accepted() {
    let t = test_app();
    let token = signed_in(&t.app).await;
    let req = Request::get("/categories").header(header::COOKIE, format!("auth_token={token}")).body(Body::empty()).unwrap();
    let (status, body) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["code"], "ENG");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let t = test_app();
    let body = json!({"email": "dup@example.com", "name": "Dup", "password": "S3curePass!"});
    let (status, _) = send(&t.app, json_request("POST", "/auth/signup", None, body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = send(&t.app, json_request("POST", "/auth/signup", None, body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "Conflict");

    let (status, _) = send(&t.app, json_request("POST", "/auth/signin", None, json!({"email": "dup@example.com", "password": "wrong-pass"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn category_endpoints() {
    let t = test_app();
    let token = signed_in(&t.app).await;

    let (status, created) = send(&t.app, json_request("POST", "/categories", Some(&token), json!({"code": "BRK", "name": "Brake"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["code"], "BRK");

    let (status, _) = send(&t.app, json_request("POST", "/categories", Some(&token), json!({"code": "BRK", "name": "Again"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, found) = send(&t.app, bare_request("GET", "/categories/BRK", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["name"], "Brake");

    let (status, _) = send(&t.app, bare_request("GET", "/categories/NOPE", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_create_update_delete() {
    let t = test_app();
    let token = signed_in(&t.app).await;

    let mut fields = product_fields("100", "2024-03-01");
    fields.push(("category_code", "ENG"));
    let (status, created) = send(&t.app, multipart_request("POST", "/products", &token, &fields, Some(b"png-bytes"))).await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let number = created["number"].as_i64().unwrap();
    assert_eq!(created["img_url"], format!("products/ENG/{number}"));
    assert_eq!(created["receiving_date"], "2024-03-01");
    assert_eq!(created["category_code"], "ENG");
    assert_eq!(t.blobs.len(), 1);

    let uri = format!("/products/{number}");
    let (status, updated) = send(&t.app, multipart_request("PUT", &uri, &token, &product_fields("150", "2024-03-01"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 150);
    assert_eq!(updated["img_url"], created["img_url"]);
    assert_eq!(t.blobs.upload_count(), 1);

    let (status, listed) = send(&t.app, bare_request("GET", "/products?page=1&per_page=10", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let resp = t.app.clone().oneshot(bare_request("DELETE", &uri, &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(t.store.is_empty());
    assert!(t.blobs.is_empty());

    let (status, err) = send(&t.app, bare_request("DELETE", &uri, &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"], "Forbidden");

    let (status, _) = send(&t.app, bare_request("GET", &uri, &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_errors_map_to_statuses() {
    let t = test_app();
    let token = signed_in(&t.app).await;

    let mut unknown = product_fields("100", "2024-03-01");
    unknown.push(("category_code", "NOPE"));
    let (status, _) = send(&t.app, multipart_request("POST", "/products", &token, &unknown, Some(b"x"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut bad_date = product_fields("100", "03/01/2024");
    bad_date.push(("category_code", "ENG"));
    let (status, err) = send(&t.app, multipart_request("POST", "/products", &token, &bad_date, Some(b"x"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Invalid Date Format");

    let mut bad_price = product_fields("lots", "2024-03-01");
    bad_price.push(("category_code", "ENG"));
    let (status, _) = send(&t.app, multipart_request("POST", "/products", &token, &bad_price, Some(b"x"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut no_image = product_fields("100", "2024-03-01");
    no_image.push(("category_code", "ENG"));
    let (status, _) = send(&t.app, multipart_request("POST", "/products", &token, &no_image, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    t.blobs.set_fail_uploads(true);
    let mut ok = product_fields("100", "2024-03-01");
    ok.push(("category_code", "ENG"));
    let (status, err) = send(&t.app, multipart_request("POST", "/products", &token, &ok, Some(b"x"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(err["error"], "Image Upload Failed");
    assert!(t.store.is_empty());

    let (status, _) = send(&t.app, multipart_request("PUT", "/products/999", &token, &product_fields("1", "2024-03-01"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_product_number_is_json_bad_request() {
    let t = test_app();
    let token = signed_in(&t.app).await;

    for (method, uri) in [("GET", "/products/abc"), ("DELETE", "/products/1.5")] {
        let (status, err) = send(&t.app, bare_request(method, uri, &token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(err["error"], "Bad Request");
        assert!(err["detail"].is_string());
    }

    let (status, err) = send(&t.app, multipart_request("PUT", "/products/abc", &token, &product_fields("1", "2024-03-01"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Bad Request");
}
