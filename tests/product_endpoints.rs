#![cfg(feature = "webp")]

mod common;

use axum::http::StatusCode;
use tower::ServiceExt;

use common::{API_PREFIX, MultipartBody, TestApp, delete, get, jpeg_bytes, json_body, stored_files, test_app};

async fn create_supplier(t: &TestApp, name: &str) -> String {
    let v = json_body(
        t.app
            .clone()
            .oneshot(
                MultipartBody::new()
                    .text("name", name)
                    .into_request("POST", &format!("{API_PREFIX}/suppliers")),
            )
            .await
            .expect("create supplier"),
    )
    .await;
    v["id"].as_str().expect("supplier id").to_string()
}

fn product_form(supplier_id: &str, name: &str, sku: &str, stock: &str) -> MultipartBody {
    MultipartBody::new()
        .text("supplier_id", supplier_id)
        .text("name", name)
        .text("sku", sku)
        .text("price", "19.999")
        .text("stock", stock)
}

#[tokio::test]
async fn create_product_with_image_and_categories() {
    let t = test_app().await;
    let supplier_id = create_supplier(&t, "Acme").await;

    let resp = t
        .app
        .clone()
        .oneshot(
            product_form(&supplier_id, "Claw Hammer", "HM-001", "12")
                .text("description", "16oz")
                .text("categories[]", "hand tools")
                .text("categories[]", "Hand-Tools")
                .text("categories[]", "garden")
                .file("image", "hammer.jpg", "image/jpeg", &jpeg_bytes(200, 200))
                .into_request("POST", &format!("{API_PREFIX}/products")),
        )
        .await
        .expect("create");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let v = json_body(resp).await;

    assert_eq!(v["sku"], "HM-001");
    assert_eq!(v["price"], 20.0);
    assert_eq!(v["stock"], 12);
    assert_eq!(v["supplier"]["name"], "Acme");
    let cats: Vec<&str> = v["categories"]
        .as_array()
        .expect("categories")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(cats, vec!["Garden", "Hand Tools"]);

    let path = v["imagePath"].as_str().expect("image path");
    assert!(path.starts_with("products/") && path.ends_with(".webp"));
    assert!(t.root.join(path).is_file());

    let v = json_body(
        t.app
            .clone()
            .oneshot(get(&format!("{API_PREFIX}/categories")))
            .await
            .expect("categories"),
    )
    .await;
    assert_eq!(v.as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn unknown_supplier_and_bad_numbers_are_field_errors() {
    let t = test_app().await;
    let resp = t
        .app
        .clone()
        .oneshot(
            MultipartBody::new()
                .text("supplier_id", "missing-supplier")
                .text("name", "Thing")
                .text("sku", "T-1")
                .text("price", "abc")
                .text("stock", "-3")
                .into_request("POST", &format!("{API_PREFIX}/products")),
        )
        .await
        .expect("create");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = json_body(resp).await;
    let mut fields: Vec<&str> = v["errors"]
        .as_array()
        .expect("errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["price", "stock", "supplier_id"]);
}

#[tokio::test]
async fn duplicate_sku_leaves_no_orphan_image() {
    let t = test_app().await;
    let supplier_id = create_supplier(&t, "Acme").await;

    let first = t
        .app
        .clone()
        .oneshot(
            product_form(&supplier_id, "One", "DUP-1", "1")
                .into_request("POST", &format!("{API_PREFIX}/products")),
        )
        .await
        .expect("first");
    assert_eq!(first.status(), StatusCode::CREATED);

    let resp = t
        .app
        .clone()
        .oneshot(
            product_form(&supplier_id, "Two", "DUP-1", "1")
                .file("image", "two.jpg", "image/jpeg", &jpeg_bytes(40, 40))
                .into_request("POST", &format!("{API_PREFIX}/products")),
        )
        .await
        .expect("second");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let v = json_body(resp).await;
    assert_eq!(v["errors"][0]["field"], "sku");
    assert!(stored_files(&t.root, "products").is_empty());
}

#[tokio::test]
async fn update_replaces_image_and_categories() {
    let t = test_app().await;
    let supplier_id = create_supplier(&t, "Acme").await;
    let created = json_body(
        t.app
            .clone()
            .oneshot(
                product_form(&supplier_id, "Saw", "SW-1", "5")
                    .text("categories", "garden")
                    .file("image", "a.jpg", "image/jpeg", &jpeg_bytes(200, 200))
                    .into_request("POST", &format!("{API_PREFIX}/products")),
            )
            .await
            .expect("create"),
    )
    .await;
    let id = created["id"].as_str().expect("id").to_string();
    let old_path = created["imagePath"].as_str().expect("path").to_string();

    let resp = t
        .app
        .clone()
        .oneshot(
            product_form(&supplier_id, "Saw", "SW-1", "0")
                .file("image", "b.jpg", "image/jpeg", &jpeg_bytes(200, 200))
                .into_request("PUT", &format!("{API_PREFIX}/products/{id}")),
        )
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["stock"], 0);
    assert!(v["categories"].as_array().expect("categories").is_empty());
    let new_path = v["imagePath"].as_str().expect("new path");
    assert_ne!(new_path, old_path);
    assert!(!t.root.join(&old_path).exists());
    assert_eq!(stored_files(&t.root, "products").len(), 1);
}

#[tokio::test]
async fn list_search_and_delete() {
    let t = test_app().await;
    let supplier_id = create_supplier(&t, "Acme").await;
    for (name, sku) in [("Wrench", "WR-1"), ("Drill", "DR-9"), ("Drill Bit", "BIT-1")] {
        let resp = t
            .app
            .clone()
            .oneshot(
                product_form(&supplier_id, name, sku, "3")
                    .into_request("POST", &format!("{API_PREFIX}/products")),
            )
            .await
            .expect("create");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let v = json_body(
        t.app
            .clone()
            .oneshot(get(&format!("{API_PREFIX}/products?search=drill")))
            .await
            .expect("search"),
    )
    .await;
    assert_eq!(v["total"], 2);
    assert_eq!(v["items"][0]["name"], "Drill");
    assert_eq!(v["items"][1]["name"], "Drill Bit");

    let v = json_body(
        t.app
            .clone()
            .oneshot(get(&format!("{API_PREFIX}/products?search=wr-")))
            .await
            .expect("search sku"),
    )
    .await;
    assert_eq!(v["total"], 1);
    let id = v["items"][0]["id"].as_str().expect("id").to_string();

    let resp = t
        .app
        .clone()
        .oneshot(delete(&format!("{API_PREFIX}/products/{id}")))
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = t
        .app
        .clone()
        .oneshot(get(&format!("{API_PREFIX}/products/{id}")))
        .await
        .expect("get deleted");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
