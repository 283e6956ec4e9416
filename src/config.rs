use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// 收到退出信号后等待在途请求完成的最长时间（秒）
    #[serde(default = "ServerConfig::default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        8080
    }
    fn default_shutdown_timeout_secs() -> u64 {
        10
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.shutdown_timeout_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_timeout_secs: Self::default_shutdown_timeout_secs(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 默认日志级别（RUST_LOG 存在时以 RUST_LOG 为准）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | json
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }

    /// 构造 EnvFilter 的默认指令
    pub fn default_directive(&self) -> String {
        format!("inventory_backend={},tower_http={}", self.level, self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api/v1".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

/// 数据库配置（SQLite）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 文件路径
    #[serde(default = "DatabaseConfig::default_sqlite_path")]
    pub sqlite_path: String,
    /// 是否启用 WAL
    #[serde(default = "DatabaseConfig::default_sqlite_wal")]
    pub sqlite_wal: bool,
}

impl DatabaseConfig {
    fn default_sqlite_path() -> String {
        "./resources/inventory.db".to_string()
    }
    fn default_sqlite_wal() -> bool {
        true
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Self::default_sqlite_path(),
            sqlite_wal: Self::default_sqlite_wal(),
        }
    }
}

/// 图片存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStorageConfig {
    /// 公开存储根目录（所有 collection 目录都位于其下）
    #[serde(default = "ImageStorageConfig::default_public_root")]
    pub public_root: String,
    /// 对外访问 URL 前缀，最终 URL 为 `{public_url_prefix}/{stored_path}`
    #[serde(default = "ImageStorageConfig::default_public_url_prefix")]
    pub public_url_prefix: String,
    /// 单张上传图片的大小上限（KiB）
    #[serde(default = "ImageStorageConfig::default_max_upload_kib")]
    pub max_upload_kib: u64,
    /// WebP 有损编码质量（1-100）
    #[serde(default = "ImageStorageConfig::default_webp_quality")]
    pub webp_quality: u8,
}

impl ImageStorageConfig {
    fn default_public_root() -> String {
        "./resources/public".to_string()
    }
    fn default_public_url_prefix() -> String {
        "/storage".to_string()
    }
    fn default_max_upload_kib() -> u64 {
        4096
    }
    fn default_webp_quality() -> u8 {
        80
    }

    /// 上传大小上限（字节）
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_kib.saturating_mul(1024)).unwrap_or(usize::MAX)
    }

    /// 由存储路径推导公开 URL
    pub fn public_url(&self, stored_path: &str) -> String {
        format!(
            "{}/{}",
            self.public_url_prefix.trim_end_matches('/'),
            stored_path.trim_start_matches('/')
        )
    }
}

impl Default for ImageStorageConfig {
    fn default() -> Self {
        Self {
            public_root: Self::default_public_root(),
            public_url_prefix: Self::default_public_url_prefix(),
            max_upload_kib: Self::default_max_upload_kib(),
            webp_quality: Self::default_webp_quality(),
        }
    }
}

/// 列表分页配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// 允许的每页条数
    #[serde(default = "PaginationConfig::default_per_page_options")]
    pub per_page_options: Vec<u32>,
    /// 未指定或不在允许列表内时使用的每页条数
    #[serde(default = "PaginationConfig::default_per_page")]
    pub default_per_page: u32,
}

impl PaginationConfig {
    fn default_per_page_options() -> Vec<u32> {
        vec![5, 10, 20, 50]
    }
    fn default_per_page() -> u32 {
        10
    }

    /// 将请求的 perPage 归一化到允许列表
    pub fn resolve_per_page(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(v) if self.per_page_options.contains(&v) => v,
            _ => self.default_per_page.max(1),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page_options: Self::default_per_page_options(),
            default_per_page: Self::default_per_page(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 图片存储配置
    #[serde(default)]
    pub images: ImageStorageConfig,
    /// 分页配置
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            // 配置文件可缺省，所有字段都有默认值
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP_IMAGES__MAX_UPLOAD_KIB
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.webp_quality) {
            return Err(ConfigError::Message(
                "images.webp_quality 必须在 1-100 范围内".to_string(),
            ));
        }
        if self.images.max_upload_kib == 0 {
            return Err(ConfigError::Message(
                "images.max_upload_kib 必须大于 0".to_string(),
            ));
        }
        if self.pagination.per_page_options.is_empty() {
            return Err(ConfigError::Message(
                "pagination.per_page_options 不能为空".to_string(),
            ));
        }
        Ok(())
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径（APP_CONFIG 可覆盖）
    fn get_config_path() -> PathBuf {
        std::env::var_os("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取公开存储根目录
    pub fn public_root(&self) -> PathBuf {
        PathBuf::from(&self.images.public_root)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ImageStorageConfig, PaginationConfig};

    #[test]
    fn empty_config_deserializes_with_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").expect("deserialize empty config");
        assert_eq!(cfg.api.prefix, "/api/v1");
        assert_eq!(cfg.images.max_upload_kib, 4096);
        assert_eq!(cfg.images.webp_quality, 80);
        assert_eq!(cfg.pagination.per_page_options, vec![5, 10, 20, 50]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn resolve_per_page_falls_back_to_default() {
        let p = PaginationConfig::default();
        assert_eq!(p.resolve_per_page(Some(20)), 20);
        assert_eq!(p.resolve_per_page(Some(7)), 10);
        assert_eq!(p.resolve_per_page(None), 10);
    }

    #[test]
    fn public_url_joins_prefix_and_path() {
        let img = ImageStorageConfig {
            public_url_prefix: "https://cdn.example.com/storage/".to_string(),
            ..ImageStorageConfig::default()
        };
        assert_eq!(
            img.public_url("products/a.webp"),
            "https://cdn.example.com/storage/products/a.webp"
        );
        assert_eq!(
            ImageStorageConfig::default().public_url("suppliers/b.webp"),
            "/storage/suppliers/b.webp"
        );
    }

    #[test]
    fn invalid_webp_quality_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.images.webp_quality = 0;
        assert!(cfg.validate().is_err());
    }
}
