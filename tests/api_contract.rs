mod common;

use axum::http::{Request, StatusCode};
use axum::body::Body;
use tower::ServiceExt;

use common::{API_PREFIX, MultipartBody, get, json_body, test_app, test_app_with};

#[tokio::test]
async fn health_reports_dependencies() {
    let t = test_app().await;
    let resp = t.app.clone().oneshot(get("/health")).await.expect("health");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["service"], "inventory-backend");
    assert_eq!(v["database"], true);
    assert_eq!(v["image_store"], true);
}

#[tokio::test]
async fn health_is_degraded_when_image_root_is_missing() {
    let t = test_app_with(|cfg| {
        cfg.images.public_root = "/definitely/not/an/image/root".to_string();
    })
    .await;
    let resp = t.app.clone().oneshot(get("/health")).await.expect("health");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["status"], "degraded");
}

#[tokio::test]
async fn empty_dashboard_has_zero_totals() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(get(&format!("{API_PREFIX}/dashboard")))
        .await
        .expect("dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["totalProducts"], 0);
    assert_eq!(v["totalSuppliers"], 0);
    assert!(v["lowStockProducts"].as_array().expect("low").is_empty());
    assert!(v["recentProducts"].as_array().expect("recent").is_empty());
}

#[tokio::test]
async fn dashboard_lists_low_stock_and_recent_products() {
    let t = test_app().await;
    let supplier = json_body(
        t.app
            .clone()
            .oneshot(
                MultipartBody::new()
                    .text("name", "Acme")
                    .into_request("POST", &format!("{API_PREFIX}/suppliers")),
            )
            .await
            .expect("supplier"),
    )
    .await;
    let supplier_id = supplier["id"].as_str().expect("id");

    for i in 0..7 {
        let resp = t
            .app
            .clone()
            .oneshot(
                MultipartBody::new()
                    .text("supplier_id", supplier_id)
                    .text("name", &format!("Item {i}"))
                    .text("sku", &format!("IT-{i}"))
                    .text("price", "1")
                    .text("stock", &(10 - i).to_string())
                    .into_request("POST", &format!("{API_PREFIX}/products")),
            )
            .await
            .expect("product");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let v = json_body(
        t.app
            .clone()
            .oneshot(get(&format!("{API_PREFIX}/dashboard")))
            .await
            .expect("dashboard"),
    )
    .await;
    assert_eq!(v["totalProducts"], 7);
    assert_eq!(v["totalSuppliers"], 1);
    let low = v["lowStockProducts"].as_array().expect("low");
    assert_eq!(low.len(), 5);
    assert_eq!(low[0]["name"], "Item 6");
    assert_eq!(low[0]["supplier"]["name"], "Acme");
    let recent = v["recentProducts"].as_array().expect("recent");
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["name"], "Item 6");
}

#[tokio::test]
async fn not_found_is_problem_json_with_request_id() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("{API_PREFIX}/suppliers/nope"))
                .header("x-request-id", "client.req-404")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("get");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("client.req-404")
    );
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    let v = json_body(resp).await;
    assert_eq!(v["status"], 404);
    assert_eq!(v["code"], "NOT_FOUND");
    assert_eq!(v["requestId"], "client.req-404");
}

#[tokio::test]
async fn request_id_is_generated_when_missing_or_invalid() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "bad id with spaces")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("health");
    let id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(id.starts_with("req_"), "unexpected request id {id}");
}

#[tokio::test]
async fn malformed_multipart_is_bad_request() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{API_PREFIX}/suppliers"))
                .header("content-type", "multipart/form-data; boundary=xyz")
                .body(Body::from("--xyz\r\nnot a valid part"))
                .expect("request"),
        )
        .await
        .expect("post");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn oversized_image_is_rejected_on_image_field() {
    let t = test_app_with(|cfg| cfg.images.max_upload_kib = 1).await;
    let mut big = vec![0u8; 4096];
    big[..8].copy_from_slice(b"\x89PNG\r\n\x1a\n");
    let resp = t
        .app
        .clone()
        .oneshot(
            MultipartBody::new()
                .text("name", "Big Logo Inc")
                .file("image", "big.png", "image/png", &big)
                .into_request("POST", &format!("{API_PREFIX}/suppliers")),
        )
        .await
        .expect("post");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = json_body(resp).await;
    assert_eq!(v["errors"][0]["field"], "image");
}

#[tokio::test]
async fn image_beyond_request_body_limit_is_rejected_on_image_field() {
    // 请求体上限 = 图片上限 + 1 MiB，这里的图片超出整个请求体上限
    let t = test_app_with(|cfg| cfg.images.max_upload_kib = 1).await;
    let mut huge = vec![0u8; 2 * 1024 * 1024 + 4096];
    huge[..8].copy_from_slice(b"\x89PNG\r\n\x1a\n");
    let resp = t
        .app
        .clone()
        .oneshot(
            MultipartBody::new()
                .text("name", "Huge Logo Inc")
                .file("image", "huge.png", "image/png", &huge)
                .into_request("POST", &format!("{API_PREFIX}/suppliers")),
        )
        .await
        .expect("post");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = json_body(resp).await;
    assert_eq!(v["code"], "VALIDATION_FAILED");
    assert_eq!(v["errors"][0]["field"], "image");
    assert!(v["errors"][0]["message"].as_str().unwrap_or_default().contains("1 KB"));
    assert!(common::stored_files(&t.root, "suppliers").is_empty());

    let list = json_body(
        t.app
            .clone()
            .oneshot(get(&format!("{API_PREFIX}/suppliers")))
            .await
            .expect("list"),
    )
    .await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .expect("openapi");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert!(v["paths"]["/suppliers"].is_object());
    assert!(v["paths"]["/products/{id}"].is_object());
}
