use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 目标存储格式的扩展名
pub const TARGET_EXTENSION: &str = "webp";

/// 图片所属的逻辑分组，同时作为存储路径的第一级目录
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Suppliers,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Suppliers => "suppliers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('/').to_ascii_lowercase().as_str() {
            "products" => Ok(Collection::Products),
            "suppliers" => Ok(Collection::Suppliers),
            other => Err(format!("未知的图片分组: {other}")),
        }
    }
}

/// 一次上传携带的图片：原始字节 + 客户端文件名（仅用于判断扩展名）
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

/// 从文件名或路径中提取小写扩展名
pub fn detect_extension(hint: Option<&str>) -> Option<String> {
    let hint = hint?.trim();
    if hint.is_empty() {
        return None;
    }
    Path::new(hint)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// 名称提示是否表明源数据已经是 WebP（直存快路径）
pub fn is_already_target_format(hint: Option<&str>) -> bool {
    detect_extension(hint).as_deref() == Some(TARGET_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_extension_is_case_insensitive() {
        assert_eq!(detect_extension(Some("Photo.JPG")).as_deref(), Some("jpg"));
        assert_eq!(
            detect_extension(Some("/seed/images/dummy.WebP")).as_deref(),
            Some("webp")
        );
        assert_eq!(detect_extension(Some("README")), None);
        assert_eq!(detect_extension(Some("")), None);
        assert_eq!(detect_extension(None), None);
    }

    #[test]
    fn webp_hint_selects_fast_path() {
        assert!(is_already_target_format(Some("cover.webp")));
        assert!(is_already_target_format(Some("COVER.WEBP")));
        assert!(!is_already_target_format(Some("cover.webp.png")));
        assert!(!is_already_target_format(None));
    }

    #[test]
    fn collection_parses_and_displays() {
        assert_eq!("products".parse::<Collection>(), Ok(Collection::Products));
        assert_eq!("/Suppliers/".parse::<Collection>(), Ok(Collection::Suppliers));
        assert!("../etc".parse::<Collection>().is_err());
        assert_eq!(Collection::Suppliers.to_string(), "suppliers");
    }
}
