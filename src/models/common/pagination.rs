use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::de::string_or_i64;

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 100;

// 分页查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "pagination.ts")]
pub struct PaginationQuery {
    #[serde(default = "default_page", deserialize_with = "string_or_i64")]
    pub page: i64,
    #[serde(default = "default_size", deserialize_with = "string_or_i64")]
    pub size: i64,
}

impl PaginationQuery {
    /// 规范化为 (页码, 每页条数)，页码从 1 开始
    pub fn normalized(&self) -> (u64, u64) {
        (
            self.page.max(1) as u64,
            self.size.clamp(1, MAX_PAGE_SIZE) as u64,
        )
    }
}

// 分页响应信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    pub fn new(page: u64, page_size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: page_size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "pagination.ts")]
pub struct PaginatedResponse<T: TS> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps() {
        let q = PaginationQuery { page: 0, size: 1000 };
        assert_eq!(q.normalized(), (1, MAX_PAGE_SIZE as u64));

        let q = PaginationQuery { page: 3, size: -5 };
        assert_eq!(q.normalized(), (3, 1));
    }

    #[test]
    fn test_query_string_values() {
        let q: PaginationQuery = serde_json::from_str(r#"{"page":"2","size":"15"}"#).unwrap();
        assert_eq!((q.page, q.size), (2, 15));

        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((q.page, q.size), (1, 20));
    }
}
