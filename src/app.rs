use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{
    category::create_category_router, dashboard::create_dashboard_router, health::health_check,
    product::create_product_router, supplier::create_supplier_router,
};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// multipart 请求体在图片上限之外为文本字段预留的空间
const FORM_FIELDS_ALLOWANCE: usize = 1024 * 1024;

/// 业务路由（不含前缀）
pub fn api_router() -> Router<AppState> {
    Router::<AppState>::new()
        .merge(create_dashboard_router())
        .merge(create_supplier_router())
        .merge(create_product_router())
        .merge(create_category_router())
}

/// 组装完整应用：业务接口挂在 `api_prefix` 下，图片目录以静态文件形式挂在
/// `public_url_prefix` 下，外加 `/health` 与 Swagger UI。
///
/// `public_url_prefix` 为完整 URL（如 CDN）时不在本服务挂载静态目录。
pub fn build_app(state: AppState, api_prefix: &str) -> Router {
    let body_limit = state
        .images_cfg
        .max_upload_bytes()
        .saturating_add(FORM_FIELDS_ALLOWANCE);

    let mut app = Router::<AppState>::new().route("/health", get(health_check));

    app = match normalize_mount(api_prefix) {
        Some(mount) => app.nest(&mount, api_router()),
        None => app.merge(api_router()),
    };

    let public_prefix = &state.images_cfg.public_url_prefix;
    if public_prefix.trim().starts_with('/')
        && let Some(mount) = normalize_mount(public_prefix)
    {
        app = app.nest_service(&mount, ServeDir::new(&state.images_cfg.public_root));
    }

    app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// 挂载点统一为 `/xxx` 形式（无尾部 `/`）；根路径返回 None
fn normalize_mount(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}
