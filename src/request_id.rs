use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// 请求/响应中携带 request_id 的头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 客户端传入 request_id 的最大长度
const MAX_CLIENT_ID_LEN: usize = 128;

/// 单个请求的追踪标识，注入到请求 extensions 与任务上下文中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// 服务端生成：`req_<uuid>`
    pub fn generate() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }

    /// 解析客户端提供的值；只接受日志与响应头中都安全的 token
    /// （ASCII 字母数字与 `-` `_` `.`，去掉首尾空白后非空且不超长）
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
        (!raw.is_empty() && raw.len() <= MAX_CLIENT_ID_LEN && raw.chars().all(safe))
            .then(|| Self(raw.to_string()))
    }

    /// 优先沿用请求头中的合法值，否则生成新的
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

tokio::task_local! {
    /// 当前请求任务的 request_id，ProblemDetails 从这里取值
    static CURRENT: RequestId;
}

/// 当前请求上下文中的 request_id（不在请求任务内时为 None）
pub fn current_request_id() -> Option<String> {
    CURRENT.try_with(|id| id.0.clone()).ok()
}

/// 全局 request_id 中间件：
/// - 透传合法的 `X-Request-Id`，否则生成 `req_<uuid>`
/// - 为整个请求开启 `request` span，日志自动带上 request_id / method / path
/// - 完成后记录状态码与耗时，并回写响应头
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    req.extensions_mut().insert(id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %id.as_str(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    let started = std::time::Instant::now();

    let mut res = CURRENT
        .scope(id.clone(), next.run(req))
        .instrument(span.clone())
        .await;

    span.in_scope(|| {
        tracing::info!(
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "请求完成"
        );
    });

    // parse/generate 只产出可见 ASCII，这里不会失败
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ids_are_trimmed_and_kept() {
        assert_eq!(
            RequestId::parse("  order-42_retry.1 ").map(|id| id.0),
            Some("order-42_retry.1".to_string())
        );
        assert!(RequestId::parse(&"x".repeat(MAX_CLIENT_ID_LEN)).is_some());
    }

    #[test]
    fn unsafe_client_ids_are_replaced() {
        for raw in ["", "   ", "has space", "a/b", "中文", "x\u{7f}"] {
            assert!(RequestId::parse(raw).is_none(), "accepted {raw:?}");
        }
        assert!(RequestId::parse(&"x".repeat(MAX_CLIENT_ID_LEN + 1)).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("bad id"));
        let id = RequestId::from_headers(&headers);
        assert!(id.as_str().starts_with("req_"));
        assert_eq!(id.as_str().len(), "req_".len() + 32);
    }

    #[tokio::test]
    async fn current_id_is_scoped_to_the_request_task() {
        assert_eq!(current_request_id(), None);
        let seen = CURRENT
            .scope(RequestId("client.req-7".into()), async { current_request_id() })
            .await;
        assert_eq!(seen.as_deref(), Some("client.req-7"));
    }
}
