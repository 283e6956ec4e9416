use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};

/// 为 Swagger UI 提供正确的“业务接口前缀”Servers 配置。
///
/// - 业务接口默认前缀为 `/api/v1`（对应 `config.api.prefix` / `APP_API__PREFIX`）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl utoipa::Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api/v1）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api/v1")
                    .description(Some("业务接口前缀：对应 config.api.prefix")),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（/health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::dashboard::handler::get_dashboard,
        crate::features::supplier::handler::list_suppliers,
        crate::features::supplier::handler::list_supplier_options,
        crate::features::supplier::handler::get_supplier,
        crate::features::supplier::handler::create_supplier,
        crate::features::supplier::handler::update_supplier,
        crate::features::supplier::handler::delete_supplier,
        crate::features::product::handler::list_products,
        crate::features::product::handler::get_product,
        crate::features::product::handler::create_product,
        crate::features::product::handler::update_product,
        crate::features::product::handler::delete_product,
        crate::features::category::handler::list_categories,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::error::ProblemFieldError,
        crate::features::image::Collection,
    )),
    modifiers(&ApiServers),
    tags(
        (name = "Dashboard", description = "库存概览：总数、低库存与最新商品。"),
        (name = "Suppliers", description = "供应商：分页查询、增删改（含图片上传）。"),
        (name = "Products", description = "商品：分页查询、增删改（含图片上传与分类同步）。"),
        (name = "Categories", description = "分类：下拉选项。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Inventory Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "库存后台 API（Axum + utoipa）。除 /health 外，业务接口挂载在 `config.api.prefix`（默认 /api/v1）下；上传图片统一转存为 WebP，经 `images.public_url_prefix`（默认 /storage）访问。"
    )
)]
pub struct ApiDoc;
