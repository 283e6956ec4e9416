/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 启动检查模块
pub mod startup;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 路由组装
pub mod app;

/// SQLite 存储
pub mod storage;

/// 列表分页
pub mod pagination;

/// multipart 表单解析与字段校验
pub mod form;

/// request_id 中间件
pub mod request_id;

/// OpenAPI 文档
pub mod openapi;

/// 优雅退出管理模块
pub mod shutdown;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::AppError;
pub use features::image::{Collection, ImageError, ImageService};
pub use shutdown::{ShutdownManager, ShutdownReason};
