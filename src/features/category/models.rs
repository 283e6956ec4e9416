use serde::Serialize;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema, PartialEq, Eq)]
#[schema(example = json!({"id": "0192f0c4-7d7e-7c3a-9a4e-5a1b2c3d4e5f", "name": "Power Tools", "slug": "power-tools"}))]
pub struct Category {
    pub id: String,
    /// 显示名称（标题格式）
    pub name: String,
    pub slug: String,
}
