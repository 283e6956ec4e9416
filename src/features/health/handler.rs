use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::state::AppState;

/// 健康检查响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// 服务状态：healthy | degraded
    #[schema(example = "healthy")]
    pub status: String,
    /// 服务名称
    #[schema(example = "inventory-backend")]
    pub service: String,
    /// 当前版本（Cargo package version）
    #[schema(example = "0.1.0")]
    pub version: String,
    /// 数据库是否可用
    pub database: bool,
    /// 图片存储根目录是否存在
    pub image_store: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "探活端点：检查数据库连接与图片存储目录，任一不可用时返回 503。",
    responses(
        (status = 200, description = "服务健康", body = HealthResponse),
        (status = 503, description = "依赖不可用", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = sqlx::query("SELECT 1")
        .execute(&state.storage.pool)
        .await
        .map_err(|e| tracing::warn!("健康检查：数据库不可用: {}", e))
        .is_ok();
    let image_store = state.images.store().is_available();

    let healthy = database && image_store;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            image_store,
        }),
    )
}
