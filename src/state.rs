use std::sync::Arc;

use crate::config::{AppConfig, ImageStorageConfig, PaginationConfig};
use crate::features::image::ImageService;
use crate::storage::InventoryStorage;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// SQLite 存储（供应商 / 商品 / 分类）
    pub storage: Arc<InventoryStorage>,
    /// 图片入库服务
    pub images: ImageService,
    /// 图片存储配置（URL 前缀、上传上限）
    pub images_cfg: Arc<ImageStorageConfig>,
    /// 列表分页配置
    pub pagination: Arc<PaginationConfig>,
}

impl AppState {
    pub fn new(storage: InventoryStorage, config: &AppConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            images: ImageService::from_config(&config.images),
            images_cfg: Arc::new(config.images.clone()),
            pagination: Arc::new(config.pagination.clone()),
        }
    }
}
