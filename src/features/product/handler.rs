use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};

use super::models::Product;
use super::service;
use crate::error::{AppError, ProblemDetails};
use crate::form::MultipartForm;
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/products",
    summary = "商品列表",
    description = "按名称排序分页返回商品（含供应商摘要与分类）；search 对名称或 SKU 做子串匹配。",
    params(ListQuery),
    responses(
        (status = 200, description = "商品分页", body = Page<Product>),
        (status = 500, description = "查询失败", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<Product>>, AppError> {
    let req = PageRequest::from_query(q, &state.pagination);
    Ok(Json(service::list(&state, req).await?))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    summary = "商品详情",
    params(("id" = String, Path, description = "商品 ID")),
    responses(
        (status = 200, description = "商品", body = Product),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(service::get(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/products",
    summary = "新建商品",
    description = "multipart 表单：supplier_id、name、sku、price、stock 必填；description 可选；categories / categories[] 可重复；image 为可选图片。",
    request_body(content_type = "multipart/form-data", description = "商品表单"),
    responses(
        (status = 201, description = "已创建", body = Product),
        (status = 422, description = "字段校验失败（图片处理失败落在 image 字段）", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let mut form = MultipartForm::read(multipart, state.images_cfg.max_upload_bytes()).await?;
    let (input, image) = service::validate(&state, &mut form).await?;
    let product = service::create(&state, input, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    summary = "更新商品",
    description = "字段同新建；未上传 image 时保留原图，上传新图成功后删除旧图；分类整体替换。也接受 POST。",
    params(("id" = String, Path, description = "商品 ID")),
    request_body(content_type = "multipart/form-data", description = "商品表单"),
    responses(
        (status = 200, description = "已更新", body = Product),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 422, description = "字段校验失败", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, AppError> {
    let mut form = MultipartForm::read(multipart, state.images_cfg.max_upload_bytes()).await?;
    let (input, image) = service::validate(&state, &mut form).await?;
    Ok(Json(service::update(&state, &id, input, image).await?))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    summary = "删除商品",
    description = "删除商品记录，并尽力清理其图片文件。",
    params(("id" = String, Path, description = "商品 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service::delete(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_product_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .post(update_product)
                .put(update_product)
                .delete(delete_product),
        )
}
