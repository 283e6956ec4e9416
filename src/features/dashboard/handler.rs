use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::features::product::Product;
use crate::state::AppState;

/// 仪表盘列表的条数
const DASHBOARD_LIST_SIZE: i64 = 5;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_products: i64,
    pub total_suppliers: i64,
    /// 库存最低的商品（库存相同按名称）
    pub low_stock_products: Vec<Product>,
    /// 最近创建的商品
    pub recent_products: Vec<Product>,
}

#[utoipa::path(
    get,
    path = "/dashboard",
    summary = "库存概览",
    description = "返回商品/供应商总数、库存最低的 5 个商品与最近创建的 5 个商品（均附带供应商摘要）。",
    responses(
        (status = 200, description = "库存概览", body = DashboardResponse),
        (status = 500, description = "查询失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let (total_products, total_suppliers) = state.storage.inventory_totals().await?;
    let cfg = &state.images_cfg;
    let low_stock_products = state
        .storage
        .low_stock_products(DASHBOARD_LIST_SIZE)
        .await?
        .into_iter()
        .map(|p| p.with_image_urls(cfg))
        .collect();
    let recent_products = state
        .storage
        .recent_products(DASHBOARD_LIST_SIZE)
        .await?
        .into_iter()
        .map(|p| p.with_image_urls(cfg))
        .collect();

    Ok(Json(DashboardResponse {
        total_products,
        total_suppliers,
        low_stock_products,
        recent_products,
    }))
}

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
