//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

use sea_orm::{DbErr, SqlErr};

/// 定义错误类型的宏
///
/// 自动生成 enum 定义、`code()`、`error_type()`、`message()` 以及
/// snake_case 形式的便捷构造函数。
macro_rules! define_filedesk_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum FileDeskError {
            $($variant(String),)*
        }

        impl FileDeskError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(FileDeskError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(FileDeskError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(FileDeskError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl FileDeskError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        FileDeskError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_filedesk_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    Conflict("E013", "Conflict"),
    InvalidTransition("E014", "Invalid State Transition"),
}

impl FileDeskError {
    /// 将数据库错误转换为业务错误，唯一约束冲突映射为 `Conflict`
    pub fn from_db(context: &str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                FileDeskError::Conflict(format!("{context}: {detail}"))
            }
            _ => FileDeskError::DatabaseOperation(format!("{context}: {err}")),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, FileDeskError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FileDeskError::NotFound(_))
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for FileDeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FileDeskError {}

impl From<DbErr> for FileDeskError {
    fn from(err: DbErr) -> Self {
        FileDeskError::from_db("数据库操作失败", err)
    }
}

impl From<std::io::Error> for FileDeskError {
    fn from(err: std::io::Error) -> Self {
        FileDeskError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for FileDeskError {
    fn from(err: serde_json::Error) -> Self {
        FileDeskError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for FileDeskError {
    fn from(err: chrono::ParseError) -> Self {
        FileDeskError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FileDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FileDeskError::cache_connection("test").code(), "E001");
        assert_eq!(FileDeskError::validation("test").code(), "E007");
        assert_eq!(FileDeskError::conflict("test").code(), "E013");
        assert_eq!(FileDeskError::invalid_transition("test").code(), "E014");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            FileDeskError::invalid_transition("x").error_type(),
            "Invalid State Transition"
        );
        assert_eq!(FileDeskError::not_found("x").error_type(), "Resource Not Found");
    }

    #[test]
    fn test_format_simple() {
        let err = FileDeskError::conflict("approval already pending");
        let formatted = err.format_simple();
        assert!(formatted.starts_with("Conflict: "));
        assert!(formatted.contains("approval already pending"));
    }

    #[test]
    fn test_generic_db_error_is_operation_error() {
        let err = FileDeskError::from_db("查询失败", DbErr::Custom("boom".into()));
        assert_eq!(err.code(), "E005");
        assert!(!err.is_conflict());
        assert!(err.message().contains("boom"));
    }
}
