#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use uuid::Uuid;

use inventory_backend::{app::build_app, config::AppConfig, state::AppState, storage::InventoryStorage};

pub const API_PREFIX: &str = "/api/v1";

/// 独立的临时图片根目录 + 内存数据库
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

pub async fn test_app_with(tweak: impl FnOnce(&mut AppConfig)) -> TestApp {
    let root = std::env::temp_dir().join(format!("inventory_it_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("create temp root");

    let mut config = AppConfig::default();
    config.images.public_root = root.to_string_lossy().into_owned();
    tweak(&mut config);

    let storage = InventoryStorage::connect_in_memory().await.expect("connect");
    storage.init_schema().await.expect("init schema");
    let state = AppState::new(storage, &config);
    let app = build_app(state.clone(), &config.api.prefix);
    TestApp { app, state, root }
}

pub fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).expect("encode jpeg");
    out.into_inner()
}

pub fn png_rgba_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, _| Rgba([10, 200, 30, if x % 2 == 0 { 255 } else { 64 }]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// multipart/form-data 请求体构造
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----inventory{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: &str, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .expect("build multipart request")
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("build request")
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// collection 目录下的文件名（不含隐藏临时文件）
pub fn stored_files(root: &std::path::Path, collection: &str) -> Vec<String> {
    let Ok(dir) = std::fs::read_dir(root.join(collection)) else {
        return Vec::new();
    };
    let mut names: Vec<String> = dir
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
