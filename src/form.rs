use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;

use crate::error::{AppError, ProblemFieldError};
use crate::features::image::ImageUpload;

/// 承载图片上传的字段名
pub const IMAGE_FIELD: &str = "image";

/// 解析后的 multipart 表单。
///
/// - 文本字段按名字保存最后一次出现的值
/// - `name[]` 形式或重复出现的字段同时记录为列表
/// - `image` 字段为空时视为未上传
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    image: Option<ImageUpload>,
    image_error: Option<String>,
}

impl MultipartForm {
    /// 读取整个 multipart 请求体；`image_limit` 为图片字节上限
    pub async fn read(mut multipart: Multipart, image_limit: usize) -> Result<Self, AppError> {
        let mut form = Self::default();
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return Err(read_error(e, "无法解析表单", image_limit)),
            };
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == IMAGE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                match read_limited(field, image_limit).await {
                    Ok(Some(bytes)) => form.accept_image(bytes, file_name, image_limit),
                    Ok(None) => form.image_error = Some(too_large_message(image_limit)),
                    Err(e) => return Err(read_error(e, "读取上传文件失败", image_limit)),
                }
                continue;
            }
            let value = match field.text().await {
                Ok(v) => v,
                Err(e) => return Err(read_error(e, &format!("读取字段 {name} 失败"), image_limit)),
            };
            form.push_text(&name, value);
        }
        Ok(form)
    }

    fn push_text(&mut self, name: &str, value: String) {
        let key = name.strip_suffix("[]").unwrap_or(name);
        self.lists
            .entry(key.to_string())
            .or_default()
            .push(value.clone());
        self.fields.insert(key.to_string(), value);
    }

    fn accept_image(&mut self, bytes: Vec<u8>, file_name: Option<String>, limit: usize) {
        if bytes.is_empty() {
            return;
        }
        if bytes.len() > limit {
            self.image_error = Some(too_large_message(limit));
            return;
        }
        if image::guess_format(&bytes).is_err() {
            self.image_error = Some("上传的文件必须是图片".to_string());
            return;
        }
        self.image = Some(ImageUpload { bytes, file_name });
    }

    /// 去掉首尾空白后的文本值；缺失或为空返回 None
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 重复字段的全部取值（按出现顺序）
    pub fn list(&self, name: &str) -> Vec<String> {
        self.lists.get(name).cloned().unwrap_or_default()
    }

    /// 取出上传的图片；上传本身不合法时返回 `image` 字段错误
    pub fn take_image(&mut self, errors: &mut FieldErrors) -> Option<ImageUpload> {
        if let Some(msg) = self.image_error.take() {
            errors.push(IMAGE_FIELD, msg);
            return None;
        }
        self.image.take()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        parts: &[(&str, &str)],
        image: Option<(Vec<u8>, Option<&str>)>,
        image_limit: usize,
    ) -> Self {
        let mut form = Self::default();
        for (k, v) in parts {
            form.push_text(k, (*v).to_string());
        }
        if let Some((bytes, name)) = image {
            form.accept_image(bytes, name.map(str::to_string), image_limit);
        }
        form
    }
}

/// 分块读取图片字段，超过上限立即停止并返回 None（剩余部分由下一次 `next_field` 跳过）
async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<Option<Vec<u8>>, MultipartError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

/// 请求体超出总上限时只可能是图片过大，落到 `image` 字段；其余为格式错误
fn read_error(err: MultipartError, context: &str, image_limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::field(IMAGE_FIELD, too_large_message(image_limit));
    }
    AppError::BadRequest(format!("{context}: {err}"))
}

fn too_large_message(limit: usize) -> String {
    format!("图片大小不能超过 {} KB", limit / 1024)
}

/// 字段级错误收集器，最终转为 `AppError::FieldValidation`
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<ProblemFieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        // 每个字段只保留第一条错误
        if self.0.iter().any(|e| e.field == field) {
            return;
        }
        self.0.push(ProblemFieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 必填文本，超长时记错
    pub fn required(&mut self, form: &MultipartForm, field: &str, max: usize) -> String {
        match form.text(field) {
            Some(v) => {
                self.check_len(field, &v, max);
                v
            }
            None => {
                self.push(field, format!("{field} 为必填项"));
                String::new()
            }
        }
    }

    /// 可选文本，超长时记错
    pub fn optional(&mut self, form: &MultipartForm, field: &str, max: usize) -> Option<String> {
        let v = form.text(field)?;
        self.check_len(field, &v, max);
        Some(v)
    }

    pub fn check_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("{field} 不能超过 {max} 个字符"));
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldValidation(self.0))
        }
    }
}
