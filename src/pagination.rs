use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// 列表查询参数（`?search=&page=&perPage=`）
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 搜索关键词（子串匹配，首尾空白会被去掉）
    pub search: Option<String>,
    /// 页码（从 1 开始，默认 1）
    pub page: Option<u32>,
    /// 每页条数（必须在配置的可选值内，否则使用默认值）
    pub per_page: Option<u32>,
}

/// 归一化后的分页请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn from_query(q: ListQuery, cfg: &PaginationConfig) -> Self {
        let search = q
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            search,
            page: q.page.unwrap_or(1).max(1),
            per_page: cfg.resolve_per_page(q.per_page),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// 分页响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
    /// 回显生效的搜索词（空搜索为 null）
    pub search: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, req: &PageRequest) -> Self {
        let per_page = i64::from(req.per_page.max(1));
        let last_page = ((total.max(0) + per_page - 1) / per_page).max(1);
        Self {
            items,
            total,
            page: req.page,
            per_page: req.per_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            search: req.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_normalizes_inputs() {
        let cfg = PaginationConfig::default();
        let req = PageRequest::from_query(
            ListQuery {
                search: Some("   ".into()),
                page: Some(0),
                per_page: Some(13),
            },
            &cfg,
        );
        assert_eq!(
            req,
            PageRequest {
                search: None,
                page: 1,
                per_page: 10
            }
        );
        assert_eq!(req.offset(), 0);

        let req = PageRequest::from_query(
            ListQuery {
                search: Some("  bolt ".into()),
                page: Some(3),
                per_page: Some(20),
            },
            &cfg,
        );
        assert_eq!(req.search.as_deref(), Some("bolt"));
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn last_page_rounds_up_and_never_zero() {
        let req = PageRequest {
            search: None,
            page: 1,
            per_page: 10,
        };
        assert_eq!(Page::<u8>::new(vec![], 0, &req).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], 10, &req).last_page, 1);
        assert_eq!(Page::<u8>::new(vec![], 11, &req).last_page, 2);
    }
}
