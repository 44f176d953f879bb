use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// 为对象存储生成限时的预签名 URL
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PresignedUrlGenerator: Send + Sync {
    /// 允许客户端以 PUT 上传指定内容类型的对象
    fn upload_url(&self, key: &str, content_type: &str) -> Result<String, StorageError>;
    /// 允许客户端以 GET 下载对象
    fn download_url(&self, key: &str) -> Result<String, StorageError>;
}
