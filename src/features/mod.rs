/// 分类（名称 → slug，商品分类同步）
pub mod category;
/// 仪表盘概览
pub mod dashboard;
/// 健康检查
pub mod health;
/// 图片入库核心
pub mod image;
/// 商品
pub mod product;
/// 供应商
pub mod supplier;
