use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};

use super::models::{Supplier, SupplierOption};
use super::service;
use crate::error::{AppError, ProblemDetails};
use crate::form::MultipartForm;
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/suppliers",
    summary = "供应商列表",
    description = "按名称排序分页返回供应商；search 对名称、联系人、邮箱、电话、地址做子串匹配。",
    params(ListQuery),
    responses(
        (status = 200, description = "供应商分页", body = Page<Supplier>),
        (status = 500, description = "查询失败", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<Supplier>>, AppError> {
    let req = PageRequest::from_query(q, &state.pagination);
    Ok(Json(service::list(&state, req).await?))
}

#[utoipa::path(
    get,
    path = "/suppliers/options",
    summary = "供应商下拉项",
    description = "返回全部供应商的精简信息（按名称排序），用于商品表单。",
    responses((status = 200, description = "供应商下拉项", body = [SupplierOption])),
    tag = "Suppliers"
)]
pub async fn list_supplier_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupplierOption>>, AppError> {
    Ok(Json(service::options(&state).await?))
}

#[utoipa::path(
    get,
    path = "/suppliers/{id}",
    summary = "供应商详情",
    params(("id" = String, Path, description = "供应商 ID")),
    responses(
        (status = 200, description = "供应商", body = Supplier),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(service::get(&state, &id).await?))
}

#[utoipa::path(
    post,
    path = "/suppliers",
    summary = "新建供应商",
    description = "multipart 表单：name 必填；contact_name、email、phone、address 可选；image 为可选图片，入库时统一转为 WebP。",
    request_body(content_type = "multipart/form-data", description = "供应商表单"),
    responses(
        (status = 201, description = "已创建", body = Supplier),
        (status = 422, description = "字段校验失败（图片处理失败落在 image 字段）", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let mut form = MultipartForm::read(multipart, state.images_cfg.max_upload_bytes()).await?;
    let (input, image) = service::validate_form(&mut form)?;
    let supplier = service::create(&state, input, image).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    put,
    path = "/suppliers/{id}",
    summary = "更新供应商",
    description = "字段同新建；未上传 image 时保留原图，上传新图成功后删除旧图。也接受 POST。",
    params(("id" = String, Path, description = "供应商 ID")),
    request_body(content_type = "multipart/form-data", description = "供应商表单"),
    responses(
        (status = 200, description = "已更新", body = Supplier),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 422, description = "字段校验失败", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Supplier>, AppError> {
    let mut form = MultipartForm::read(multipart, state.images_cfg.max_upload_bytes()).await?;
    let (input, image) = service::validate_form(&mut form)?;
    Ok(Json(service::update(&state, &id, input, image).await?))
}

#[utoipa::path(
    delete,
    path = "/suppliers/{id}",
    summary = "删除供应商",
    description = "同时删除其名下商品，并尽力清理供应商与商品的图片文件。",
    params(("id" = String, Path, description = "供应商 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 404, description = "不存在", body = ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service::delete(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_supplier_router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/suppliers/options", get(list_supplier_options))
        .route(
            "/suppliers/:id",
            get(get_supplier)
                .post(update_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
}
