//! 图片入库：上传字节 → WebP → 公开存储，并负责旧文件的退役。

mod encoder;
mod error;
mod service;
mod store;
mod types;

pub use encoder::{WEBP_MAX_DIMENSION, encode_to_webp};
pub use error::ImageError;
pub use service::ImageService;
pub use store::{ImageStore, LocalDiskStore};
pub use types::{Collection, ImageUpload, TARGET_EXTENSION, detect_extension, is_already_target_format};
