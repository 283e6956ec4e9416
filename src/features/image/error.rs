use thiserror::Error;

/// 图片入库失败的原因。
///
/// 所有变体都是终止性的：入库流程在任何写入发生前中止（旧文件清理失败除外，它不会被上抛）。
/// Display 文案直接面向最终用户，会被挂到表单的 `image` 字段上。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// 字节无法被识别为任何已知图片格式
    #[error("图片处理失败：文件不是有效的图片（{0}）")]
    InvalidImageData(String),

    /// 运行环境不具备 WebP 编码能力，或图片超出编码器支持范围
    #[error("图片处理失败：服务器不支持将该图片编码为 WebP（{0}）")]
    EncodingUnsupported(String),

    /// 解码成功但编码没有产出可用数据
    #[error("图片处理失败：WebP 编码失败（{0}）")]
    EncodingFailed(String),

    /// 存储后端拒绝或未能完成写入
    #[error("图片处理失败：保存图片失败（{0}）")]
    StorageWriteFailed(String),

    /// 按路径入库时源文件不可读
    #[error("图片处理失败：无法读取源图片（{0}）")]
    SourceReadFailed(String),
}

impl ImageError {
    /// 稳定的错误码，用于日志与程序化区分
    pub fn kind(&self) -> &'static str {
        match self {
            ImageError::InvalidImageData(_) => "INVALID_IMAGE_DATA",
            ImageError::EncodingUnsupported(_) => "ENCODING_UNSUPPORTED",
            ImageError::EncodingFailed(_) => "ENCODING_FAILED",
            ImageError::StorageWriteFailed(_) => "STORAGE_WRITE_FAILED",
            ImageError::SourceReadFailed(_) => "SOURCE_READ_FAILED",
        }
    }
}
