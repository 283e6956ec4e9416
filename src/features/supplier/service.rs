use super::models::{Supplier, SupplierInput, SupplierOption};
use crate::error::AppError;
use crate::features::image::{Collection, ImageUpload};
use crate::form::{FieldErrors, MultipartForm};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;
use crate::storage::new_id;

/// 宽松的邮箱格式检查：单个 `@`，两侧非空，域名含 `.` 且不以 `.` 开头或结尾，无空白
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// 校验供应商表单，同时取出可选的图片上传
pub fn validate_form(
    form: &mut MultipartForm,
) -> Result<(SupplierInput, Option<ImageUpload>), AppError> {
    let mut errors = FieldErrors::default();
    let name = errors.required(form, "name", 255);
    let contact_name = errors.optional(form, "contact_name", 255);
    let email = errors.optional(form, "email", 255);
    if let Some(e) = &email
        && !is_valid_email(e)
    {
        errors.push("email", "email 格式不正确");
    }
    let phone = errors.optional(form, "phone", 50);
    let address = form.text("address");
    let image = form.take_image(&mut errors);
    errors.finish()?;

    Ok((
        SupplierInput {
            name,
            contact_name,
            email,
            phone,
            address,
        },
        image,
    ))
}

pub async fn list(state: &AppState, req: PageRequest) -> Result<Page<Supplier>, AppError> {
    let (items, total) = state.storage.list_suppliers(&req).await?;
    let items = items
        .into_iter()
        .map(|s| s.with_image_url(&state.images_cfg))
        .collect();
    Ok(Page::new(items, total, &req))
}

pub async fn options(state: &AppState) -> Result<Vec<SupplierOption>, AppError> {
    let rows = state.storage.list_supplier_options().await?;
    Ok(rows
        .into_iter()
        .map(|(mut option, path)| {
            option.image_url = path.as_deref().map(|p| state.images_cfg.public_url(p));
            option
        })
        .collect())
}

pub async fn get(state: &AppState, id: &str) -> Result<Supplier, AppError> {
    state
        .storage
        .get_supplier(id)
        .await?
        .map(|s| s.with_image_url(&state.images_cfg))
        .ok_or_else(|| AppError::NotFound(format!("供应商 {id} 不存在")))
}

pub async fn create(
    state: &AppState,
    input: SupplierInput,
    image: Option<ImageUpload>,
) -> Result<Supplier, AppError> {
    let image_path = match image {
        Some(upload) => Some(store_image(state, upload).await?),
        None => None,
    };

    let id = new_id();
    if let Err(e) = state
        .storage
        .insert_supplier(&id, &input, image_path.as_deref())
        .await
    {
        discard_unreferenced(state, image_path).await;
        return Err(e);
    }

    tracing::info!(supplier_id = %id, "供应商已创建");
    get(state, &id).await
}

/// 更新供应商；未上传新图片时保留原图，上传成功且记录写入后才删除旧图
pub async fn update(
    state: &AppState,
    id: &str,
    input: SupplierInput,
    image: Option<ImageUpload>,
) -> Result<Supplier, AppError> {
    let existing = get(state, id).await?;

    let new_path = match image {
        Some(upload) => Some(store_image(state, upload).await?),
        None => None,
    };
    let image_path = new_path.clone().or_else(|| existing.image_path.clone());

    match state
        .storage
        .update_supplier(id, &input, image_path.as_deref())
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            discard_unreferenced(state, new_path).await;
            return Err(AppError::NotFound(format!("供应商 {id} 不存在")));
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

    tracing::info!(supplier_id = %id, "供应商已更新");
    get(state, id).await
}

/// 删除供应商及其商品，并清理相关图片
pub async fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
    let paths = state
        .storage
        .delete_supplier(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("供应商 {id} 不存在")))?;
    tracing::info!(supplier_id = %id, images = paths.len(), "供应商已删除");
    state.images.discard_all(paths).await;
    Ok(())
}

async fn store_image(state: &AppState, upload: ImageUpload) -> Result<String, AppError> {
    state
        .images
        .ingest_async(upload.bytes, Collection::Suppliers, None, upload.file_name)
        .await
}

/// 记录写入失败时删除刚入库、尚未被引用的新图片
pub(crate) async fn discard_unreferenced(state: &AppState, path: Option<String>) {
    if let Some(p) = path {
        tracing::warn!(path = %p, "记录写入失败，删除未被引用的新图片");
        state.images.discard_all(vec![p]).await;
    }
}
