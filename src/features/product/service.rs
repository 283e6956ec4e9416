use super::models::{Product, ProductInput};
use crate::error::AppError;
use crate::features::image::{Collection, ImageUpload};
use crate::features::supplier::service::discard_unreferenced;
use crate::form::{FieldErrors, MultipartForm};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;
use crate::storage::new_id;

/// 价格保留两位小数
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// 校验商品表单（不含数据库相关检查），同时取出可选的图片上传
pub fn validate_form(
    form: &mut MultipartForm,
    errors: &mut FieldErrors,
) -> (ProductInput, Option<ImageUpload>) {
    let supplier_id = errors.required(form, "supplier_id", 64);
    let name = errors.required(form, "name", 255);
    let sku = errors.required(form, "sku", 100);
    let description = form.text("description");

    let price = match form.text("price") {
        None => {
            errors.push("price", "price 为必填项");
            0.0
        }
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => round_price(v),
            _ => {
                errors.push("price", "price 必须是不小于 0 的数字");
                0.0
            }
        },
    };

    let stock = match form.text("stock") {
        None => {
            errors.push("stock", "stock 为必填项");
            0
        }
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v >= 0 => v,
            _ => {
                errors.push("stock", "stock 必须是不小于 0 的整数");
                0
            }
        },
    };

    let categories: Vec<String> = form
        .list("categories")
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if categories.iter().any(|c| c.chars().count() > 100) {
        errors.push("categories", "每个分类名称不能超过 100 个字符");
    }

    let image = form.take_image(errors);
    (
        ProductInput {
            supplier_id,
            name,
            sku,
            description,
            price,
            stock,
            categories,
        },
        image,
    )
}

/// 完整校验：表单字段 + 供应商存在性
pub async fn validate(
    state: &AppState,
    form: &mut MultipartForm,
) -> Result<(ProductInput, Option<ImageUpload>), AppError> {
    let mut errors = FieldErrors::default();
    let (input, image) = validate_form(form, &mut errors);
    if !input.supplier_id.is_empty() && !state.storage.supplier_exists(&input.supplier_id).await? {
        errors.push("supplier_id", "所选供应商不存在");
    }
    errors.finish()?;
    Ok((input, image))
}

pub async fn list(state: &AppState, req: PageRequest) -> Result<Page<Product>, AppError> {
    let (items, total) = state.storage.list_products(&req).await?;
    let items = items
        .into_iter()
        .map(|p| p.with_image_urls(&state.images_cfg))
        .collect();
    Ok(Page::new(items, total, &req))
}

pub async fn get(state: &AppState, id: &str) -> Result<Product, AppError> {
    state
        .storage
        .get_product(id)
        .await?
        .map(|p| p.with_image_urls(&state.images_cfg))
        .ok_or_else(|| AppError::NotFound(format!("商品 {id} 不存在")))
}

pub async fn create(
    state: &AppState,
    input: ProductInput,
    image: Option<ImageUpload>,
) -> Result<Product, AppError> {
    let image_path = match image {
        Some(upload) => Some(store_image(state, upload).await?),
        None => None,
    };

    let id = new_id();
    if let Err(e) = state
        .storage
        .insert_product(&id, &input, image_path.as_deref())
        .await
    {
        discard_unreferenced(state, image_path).await;
        return Err(e);
    }

    tracing::info!(product_id = %id, sku = %input.sku, "商品已创建");
    get(state, &id).await
}

/// 更新商品；图片策略与供应商一致
pub async fn update(
    state: &AppState,
    id: &str,
    input: ProductInput,
    image: Option<ImageUpload>,
) -> Result<Product, AppError> {
    let existing = get(state, id).await?;

    let new_path = match image {
        Some(upload) => Some(store_image(state, upload).await?),
        None => None,
    };
    let image_path = new_path.clone().or_else(|| existing.image_path.clone());

    match state
        .storage
        .update_product(id, &input, image_path.as_deref())
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            discard_unreferenced(state, new_path).await;
            return Err(AppError::NotFound(format!("商品 {id} 不存在")));
        }
        Err(e) => {
            discard_unreferenced(state, new_path).await;
            return Err(e);
        }
    }

    if new_path.is_some()
        && let Some(old) = existing.image_path
        && Some(&old) != new_path.as_ref()
    {
        state.images.discard_all(vec![old]).await;
    }

    tracing::info!(product_id = %id, "商品已更新");
    get(state, id).await
}

pub async fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
    let image_path = state
        .storage
        .delete_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("商品 {id} 不存在")))?;
    tracing::info!(product_id = %id, "商品已删除");
    state.images.discard_all(image_path.into_iter().collect()).await;
    Ok(())
}

async fn store_image(state: &AppState, upload: ImageUpload) -> Result<String, AppError> {
    state
        .images
        .ingest_async(upload.bytes, Collection::Products, None, upload.file_name)
        .await
}
