use serde::Serialize;

use crate::config::ImageStorageConfig;

/// 供应商
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
  "id": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e5f",
  "name": "Acme Hardware",
  "contactName": "Jane Doe",
  "email": "sales@acme.test",
  "phone": "+1 555 0100",
  "address": "1 Main St",
  "imagePath": "suppliers/0192f0c4-8000-7000-8000-000000000001.webp",
  "imageUrl": "/storage/suppliers/0192f0c4-8000-7000-8000-000000000001.webp",
  "productsCount": 3,
  "createdAt": "2026-01-01T00:00:00.000000Z",
  "updatedAt": "2026-01-01T00:00:00.000000Z"
}))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// 存储路径（`suppliers/<uuid>.webp`），未上传图片时为 null
    pub image_path: Option<String>,
    /// 公开访问 URL
    pub image_url: Option<String>,
    /// 名下商品数量
    pub products_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Supplier {
    pub fn with_image_url(mut self, cfg: &ImageStorageConfig) -> Self {
        self.image_url = self.image_path.as_deref().map(|p| cfg.public_url(p));
        self
    }
}

/// 商品表单中的供应商下拉项
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOption {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

/// 嵌入商品中的供应商摘要
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip)]
    pub image_path: Option<String>,
    pub image_url: Option<String>,
}

/// 校验后的供应商写入数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierInput {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
