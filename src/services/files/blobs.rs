//! 上传目录中的文件内容

use std::path::PathBuf;
use tracing::warn;

use crate::config::AppConfig;

pub fn blob_path(stored_name: &str) -> PathBuf {
    PathBuf::from(&AppConfig::get().upload.dir).join(stored_name)
}

/// 删除磁盘文件，失败只记录日志
///
/// 调用方已经提交了数据库删除，残留文件不影响一致性。
pub async fn remove_blobs(stored_names: &[String]) {
    for name in stored_names {
        if let Err(e) = tokio::fs::remove_file(blob_path(name)).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove blob {name}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_missing_blob_is_silent() {
        remove_blobs(&["does-not-exist.bin".to_string()]).await;
        assert!(blob_path("a.bin").ends_with("a.bin"));
    }
}
