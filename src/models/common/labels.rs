//! 文件/文件夹标签
//!
//! 标签以 JSON 数组文本存储在数据库中。

pub const MAX_LABELS: usize = 20;
pub const MAX_LABEL_LEN: usize = 32;

/// 清洗标签：去除首尾空白、丢弃空串、按大小写不敏感去重（保留首次出现的写法）
pub fn normalize_labels<I, S>(labels: I) -> Result<Vec<String>, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref().trim();
        if label.is_empty() {
            continue;
        }
        if label.chars().count() > MAX_LABEL_LEN {
            return Err(format!("Label '{label}' exceeds {MAX_LABEL_LEN} characters"));
        }
        if label.contains('"') || label.contains('\\') {
            return Err(format!("Label '{label}' contains invalid characters"));
        }
        if !result.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            result.push(label.to_string());
        }
    }
    if result.len() > MAX_LABELS {
        return Err(format!("At most {MAX_LABELS} labels are allowed"));
    }
    Ok(result)
}

/// 解析表单中的标签字段，支持 JSON 数组或逗号分隔
pub fn parse_labels_field(raw: &str) -> Result<Vec<String>, String> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        let parsed: Vec<String> =
            serde_json::from_str(raw).map_err(|e| format!("Invalid labels JSON: {e}"))?;
        normalize_labels(parsed)
    } else {
        normalize_labels(raw.split(','))
    }
}

/// 数据库文本 -> 标签列表；损坏的数据按空列表处理
pub fn labels_from_db(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn labels_to_db(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dedupes_case_insensitively() {
        let labels = normalize_labels([" Finance ", "finance", "", "Q3"]).unwrap();
        assert_eq!(labels, vec!["Finance".to_string(), "Q3".to_string()]);
    }

    #[test]
    fn test_parse_comma_and_json() {
        assert_eq!(
            parse_labels_field("draft, legal").unwrap(),
            vec!["draft".to_string(), "legal".to_string()]
        );
        assert_eq!(
            parse_labels_field(r#"["draft","legal"]"#).unwrap(),
            vec!["draft".to_string(), "legal".to_string()]
        );
        assert!(parse_labels_field("[not json").is_err());
    }

    #[test]
    fn test_rejects_quotes_and_long_labels() {
        assert!(normalize_labels(["a\"b"]).is_err());
        assert!(normalize_labels(["x".repeat(MAX_LABEL_LEN + 1)]).is_err());
    }

    #[test]
    fn test_db_roundtrip_tolerates_garbage() {
        assert!(labels_from_db("oops").is_empty());
        let stored = labels_to_db(&["a".to_string()]);
        assert_eq!(labels_from_db(&stored), vec!["a".to_string()]);
    }
}
