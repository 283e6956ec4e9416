use axum::{Router, extract::State, response::Json, routing::get};

use super::models::Category;
use crate::{error::AppError, state::AppState};

#[utoipa::path(
    get,
    path = "/categories",
    summary = "分类列表",
    description = "返回全部分类（按名称排序），用于商品表单的分类选择。",
    responses(
        (status = 200, description = "分类列表", body = [Category]),
        (status = 500, description = "查询失败", body = crate::error::ProblemDetails, content_type = "application/problem+json")
    ),
    tag = "Categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.storage.list_category_options().await?))
}

pub fn create_category_router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}
