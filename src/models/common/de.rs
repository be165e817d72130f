//! 宽松的反序列化辅助函数
//!
//! 查询参数经 `#[serde(flatten)]` 缓冲后全部是字符串，这里同时接受数字和字符串。

use serde::Deserializer;
use serde::de::{Error, Unexpected, Visitor};
use std::fmt;

struct I64Visitor;

impl<'de> Visitor<'de> for I64Visitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a string containing an integer")
    }

    fn visit_i64<E: Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value).map_err(|_| Error::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
        value
            .trim()
            .parse()
            .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
    }
}

struct BoolVisitor;

impl<'de> Visitor<'de> for BoolVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean or one of \"true\", \"false\", \"1\", \"0\"")
    }

    fn visit_bool<E: Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
        match value.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(Error::invalid_value(Unexpected::Str(value), &self)),
        }
    }
}

pub fn string_or_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(I64Visitor)
}

pub fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(I64Visitor).map(Some)
}

pub fn optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(BoolVisitor).map(Some)
}

/// 区分“字段缺失”和“显式 null”：缺失为 `None`，null 为 `Some(None)`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Inner {
        #[serde(default, deserialize_with = "super::optional_i64")]
        folder_id: Option<i64>,
        #[serde(default, deserialize_with = "super::optional_bool")]
        unread_only: Option<bool>,
    }

    #[derive(Deserialize)]
    struct Outer {
        #[serde(flatten)]
        inner: Inner,
        search: Option<String>,
    }

    #[test]
    fn test_flattened_strings_are_parsed() {
        let parsed: Outer = serde_json::from_value(serde_json::json!({
            "folder_id": "12",
            "unread_only": "true",
            "search": "report"
        }))
        .unwrap();
        assert_eq!(parsed.inner.folder_id, Some(12));
        assert_eq!(parsed.inner.unread_only, Some(true));
        assert_eq!(parsed.search.as_deref(), Some("report"));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let parsed: Outer = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(parsed.inner.folder_id, None);
        assert_eq!(parsed.inner.unread_only, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let parsed = serde_json::from_value::<Outer>(serde_json::json!({ "folder_id": "abc" }));
        assert!(parsed.is_err());
    }

    #[derive(Deserialize)]
    struct Move {
        #[serde(default, deserialize_with = "super::double_option")]
        parent_id: Option<Option<i64>>,
    }

    #[test]
    fn test_double_option_distinguishes_null() {
        let missing: Move = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.parent_id, None);
        let null: Move = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));
        let set: Move = serde_json::from_str(r#"{"parent_id":7}"#).unwrap();
        assert_eq!(set.parent_id, Some(Some(7)));
    }
}
