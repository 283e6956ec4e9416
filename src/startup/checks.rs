use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::image::Collection;
use crate::storage::InventoryStorage;

/// 执行启动检查，返回已就绪的存储
///
/// 1. 检查并创建图片公开目录（含各 collection 子目录）
/// 2. 连接 SQLite 并初始化表结构
pub async fn run_startup_checks(config: &AppConfig) -> Result<InventoryStorage, AppError> {
    tracing::info!("开始执行启动检查...");

    ensure_public_root(&config.public_root())?;

    let storage =
        InventoryStorage::connect_sqlite(&config.database.sqlite_path, config.database.sqlite_wal)
            .await?;
    storage.init_schema().await?;
    tracing::info!("数据库已就绪: {}", config.database.sqlite_path);

    tracing::info!("启动检查完成");
    Ok(storage)
}

/// 确保图片公开目录与各 collection 子目录存在
fn ensure_public_root(root: &Path) -> Result<(), AppError> {
    if !root.exists() {
        tracing::warn!("未找到图片目录，正在创建: {:?}", root);
    }
    for collection in [Collection::Products, Collection::Suppliers] {
        let dir = root.join(collection.as_str());
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Internal(format!("创建图片目录 {dir:?} 失败: {e}")))?;
    }
    Ok(())
}
