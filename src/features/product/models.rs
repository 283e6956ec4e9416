use serde::Serialize;

use crate::config::ImageStorageConfig;
use crate::features::category::Category;
use crate::features::supplier::SupplierSummary;

/// 商品
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
  "id": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e60",
  "supplierId": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e5f",
  "name": "Claw Hammer",
  "sku": "HM-001",
  "description": "16oz steel hammer",
  "price": 12.5,
  "stock": 40,
  "imagePath": "products/0192f0c4-8000-7000-8000-000000000002.webp",
  "imageUrl": "/storage/products/0192f0c4-8000-7000-8000-000000000002.webp",
  "supplier": {"id": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e5f", "name": "Acme Hardware", "email": "sales@acme.test", "imageUrl": null},
  "categories": [{"id": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e61", "name": "Hand Tools", "slug": "hand-tools"}],
  "createdAt": "2026-01-01T00:00:00.000000Z",
  "updatedAt": "2026-01-01T00:00:00.000000Z"
}))]
pub struct Product {
    pub id: String,
    pub supplier_id: String,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    /// 单价（保留两位小数）
    pub price: f64,
    pub stock: i64,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub supplier: Option<SupplierSummary>,
    /// 分类（按名称排序）
    pub categories: Vec<Category>,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    pub fn with_image_urls(mut self, cfg: &ImageStorageConfig) -> Self {
        self.image_url = self.image_path.as_deref().map(|p| cfg.public_url(p));
        if let Some(s) = self.supplier.as_mut() {
            s.image_url = s.image_path.as_deref().map(|p| cfg.public_url(p));
        }
        self
    }
}

/// 校验后的商品写入数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
    pub supplier_id: String,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub categories: Vec<String>,
}
