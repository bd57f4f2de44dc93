//! Router-level tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use catalog_server::router::build_router;
use common::TestHarness;

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn request_id_is_generated() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(Request::get("/api/category").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn create_without_multipart_is_400() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(
            Request::post("/api/category")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"Shoes"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["request_id"].is_string());
    assert_eq!(body["fields"]["name"][0], "Enter the category name");
    assert_eq!(body["fields"]["image"][0], "Provide the category image");
    assert_eq!(
        body["fields"]["description"][0],
        "Enter the category description"
    );
}

#[tokio::test]
async fn create_without_body_lists_every_field() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(Request::post("/api/category").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    let mut fields: Vec<&String> = body["fields"].as_object().unwrap().keys().collect();
    fields.sort();
    assert_eq!(fields, ["description", "image", "name"]);
}

#[tokio::test]
async fn update_without_multipart_reports_name() {
    let h = TestHarness::new();
    let cat = h.insert_category("Shoes", "0123abcd.png");
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(
            Request::post(format!("/api/category/edit/{}", cat.id))
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("name=Boots"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["fields"]["name"][0], "Enter the category name");
}

#[tokio::test]
async fn multipart_without_boundary_is_400_without_fields() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(
            Request::post("/api/category")
                .header("content-type", "multipart/form-data")
                .body(Body::from("name=Shoes"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body.get("fields").is_none());
}

#[tokio::test]
async fn missing_upload_returns_404() {
    let h = TestHarness::new();
    let app = build_router(h.ctx.clone(), None);

    let response = app
        .oneshot(
            Request::get("/uploads/150_missing.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn spa_fallback_serves_index() {
    let h = TestHarness::new();
    let ui = tempfile::tempdir().unwrap();
    std::fs::write(ui.path().join("index.html"), "<html>admin</html>").unwrap();
    let app = build_router(h.ctx.clone(), Some(ui.path().to_path_buf()));

    let response = app
        .oneshot(
            Request::get("/categories/12/edit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<html>admin</html>");
}
