use sea_orm::sea_query::LikeExpr;

/// 转义 LIKE 通配符，配合 `ESCAPE '\'` 使用
pub fn escape_like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 子串匹配：`%raw%`，raw 中的通配符按字面匹配
pub fn contains_pattern(raw: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_pattern(raw))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("plain"), "plain");
        assert_eq!(escape_like_pattern("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
    }
}
