//! 配置管理
//!
//! 加载顺序：`config.toml` -> `config.{APP_ENV}.toml` -> `FILEDESK_*` 环境变量 -> 显式覆盖。
//! 所有字段都带默认值，缺少配置文件时也能启动。

mod r#impl;
mod structs;

pub use structs::*;
