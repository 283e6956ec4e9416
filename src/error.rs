use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::image::ImageError;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 请求格式错误（无法解析的表单/查询参数）
    #[error("请求格式错误: {0}")]
    BadRequest(String),

    /// 字段级校验错误（表单提交）
    #[error("字段校验失败: {}", summarize_fields(.0))]
    FieldValidation(Vec<ProblemFieldError>),

    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

fn summarize_fields(errors: &[ProblemFieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 所有 API 错误统一返回 `application/problem+json`，表单类错误额外携带字段级 `errors`，
/// 便于前端把消息挂到对应输入框上（图片处理失败固定落在 `image` 字段）。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Validation Failed")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// 请求追踪 ID（由 request-id 中间件注入）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// 字段级校验错误。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProblemFieldError>>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFieldError {
    /// 字段名（与表单字段一致，如 `image`、`sku`）。
    pub field: String,
    /// 字段错误信息。
    pub message: String,
}

impl ProblemFieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    /// 单字段校验错误的快捷构造
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::FieldValidation(vec![ProblemFieldError::new(field, message)])
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::FieldValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::FieldValidation(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let title = self.title().to_string();
        let code = self.stable_code().to_string();

        // 内部错误不向调用方暴露细节，只记录日志
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("请求处理失败: {}", self);
            Some("服务器内部错误".to_string())
        } else {
            Some(self.to_string())
        };

        let errors = match self {
            AppError::FieldValidation(errors) => Some(errors),
            _ => None,
        };

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title,
            status: status.as_u16(),
            detail,
            code,
            request_id: crate::request_id::current_request_id(),
            errors,
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("记录不存在".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

/// 图片处理失败统一映射为 `image` 字段上的校验错误，调用方据此中止整条记录的写入。
impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        AppError::field("image", err.to_string())
    }
}
