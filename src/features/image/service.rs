use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use super::encoder;
use super::error::ImageError;
use super::store::{ImageStore, LocalDiskStore};
use super::types::{Collection, TARGET_EXTENSION, is_already_target_format};
use crate::config::ImageStorageConfig;
use crate::error::AppError;

/// 图片入库服务：把上传字节归一化为 WebP、以唯一文件名写入对应 collection，
/// 并在新文件确认落盘后清理旧文件。
///
/// 服务本身无状态（只持有存储后端与编码参数），可在请求间自由 clone 共享。
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ImageStore>,
    quality: u8,
}

impl ImageService {
    pub fn new(store: Arc<dyn ImageStore>, quality: u8) -> Self {
        Self {
            store,
            quality: quality.clamp(1, 100),
        }
    }

    /// 按配置构造本地磁盘存储的服务
    pub fn from_config(cfg: &ImageStorageConfig) -> Self {
        Self::new(
            Arc::new(LocalDiskStore::new(&cfg.public_root)),
            cfg.webp_quality,
        )
    }

    pub fn store(&self) -> &Arc<dyn ImageStore> {
        &self.store
    }

    /// 入库一张图片，返回新的存储路径。
    ///
    /// - `hint` 扩展名为 webp 时直接原样写入（`img_` 前缀），否则解码后重新编码
    /// - 任意失败都不会写入文件，也不会触碰 `previous`
    /// - 新文件写入成功后才删除 `previous`，删除失败只记日志
    pub fn ingest(
        &self,
        bytes: &[u8],
        collection: Collection,
        previous: Option<&str>,
        hint: Option<&str>,
    ) -> Result<String, ImageError> {
        let (payload, prefix) = if is_already_target_format(hint) {
            (bytes.to_vec(), "img_")
        } else {
            (encoder::encode_to_webp(bytes, self.quality)?, "")
        };

        self.store
            .ensure_collection(collection.as_str())
            .map_err(|e| ImageError::StorageWriteFailed(format!("创建目录失败: {e}")))?;

        let path = format!(
            "{}/{}{}.{}",
            collection.as_str(),
            prefix,
            Uuid::now_v7(),
            TARGET_EXTENSION
        );
        self.store
            .put(&path, &payload)
            .map_err(|e| ImageError::StorageWriteFailed(e.to_string()))?;

        tracing::info!(
            collection = collection.as_str(),
            path = %path,
            bytes = payload.len(),
            raw = !prefix.is_empty(),
            "图片已入库"
        );

        if let Some(old) = previous.filter(|p| !p.trim().is_empty() && *p != path) {
            self.discard(old);
        }

        Ok(path)
    }

    /// 从磁盘文件入库（用于种子数据），读取失败时在解码前返回 `SourceReadFailed`
    pub fn ingest_path(
        &self,
        source: &Path,
        collection: Collection,
        previous: Option<&str>,
    ) -> Result<String, ImageError> {
        let bytes = std::fs::read(source)
            .map_err(|e| ImageError::SourceReadFailed(format!("{}: {e}", source.display())))?;
        let hint = source.to_str();
        self.ingest(&bytes, collection, previous, hint)
    }

    /// 异步版本：解码/编码属于 CPU 密集任务，放入 Tokio 阻塞线程池执行
    pub async fn ingest_async(
        &self,
        bytes: Vec<u8>,
        collection: Collection,
        previous: Option<String>,
        hint: Option<String>,
    ) -> Result<String, AppError> {
        let svc = self.clone();
        let handle = tokio::task::spawn_blocking(move || {
            svc.ingest(&bytes, collection, previous.as_deref(), hint.as_deref())
        });

        let path = handle
            .await
            .map_err(|e| AppError::Internal(format!("图片处理任务执行失败: {e}")))?
            .map_err(|e| {
                tracing::warn!(kind = e.kind(), "图片入库失败: {}", e);
                e
            })?;
        Ok(path)
    }

    /// 尽力删除一个已存储文件；文件不存在或删除失败都只记录日志
    pub fn discard(&self, path: &str) {
        match self.store.delete(path) {
            Ok(()) => tracing::debug!(path, "旧图片已删除"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path, "旧图片不存在，跳过删除")
            }
            Err(e) => tracing::warn!(path, "删除旧图片失败（已忽略）: {}", e),
        }
    }

    /// 批量尽力删除（记录删除后的级联清理）
    pub async fn discard_all(&self, paths: Vec<String>) {
        if paths.is_empty() {
            return;
        }
        let svc = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || {
            for p in &paths {
                svc.discard(p);
            }
        })
        .await
        {
            tracing::warn!("图片清理任务执行失败: {}", e);
        }
    }
}
