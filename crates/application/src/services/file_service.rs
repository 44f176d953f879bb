use std::sync::Arc;

use domain::DomainError;
use uuid::Uuid;

use crate::{dto::PresignedUrlDto, error::ApplicationError, storage::PresignedUrlGenerator};

/// 上传/下载的预签名 URL 发放
pub struct FileService {
    url_generator: Arc<dyn PresignedUrlGenerator>,
}

impl FileService {
    pub fn new(url_generator: Arc<dyn PresignedUrlGenerator>) -> Self {
        Self { url_generator }
    }

    /// 对象键为 `{uuid}-{file_name}`，避免同名文件互相覆盖
    pub fn generate_upload_url(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<PresignedUrlDto, ApplicationError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(DomainError::invalid_argument("fileName", "File name is required").into());
        }
        if content_type.trim().is_empty() {
            return Err(
                DomainError::invalid_argument("contentType", "Content type is required").into(),
            );
        }

        let key = format!("{}-{}", Uuid::new_v4(), file_name);
        let presigned_url = self.url_generator.upload_url(&key, content_type.trim())?;
        tracing::debug!(%key, "upload url issued");
        Ok(PresignedUrlDto { presigned_url })
    }

    pub fn generate_download_url(&self, file_path: &str) -> Result<PresignedUrlDto, ApplicationError> {
        let file_path = file_path.trim().trim_start_matches('/');
        if file_path.is_empty() {
            return Err(DomainError::invalid_argument("filePath", "File path is required").into());
        }

        let presigned_url = self.url_generator.download_url(file_path)?;
        Ok(PresignedUrlDto { presigned_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockPresignedUrlGenerator;

    #[test]
    fn upload_key_is_prefixed_with_uuid() {
        let mut generator = MockPresignedUrlGenerator::new();
        generator
            .expect_upload_url()
            .withf(|key, content_type| {
                key.len() == 36 + "-logo.png".len()
                    && key.ends_with("-logo.png")
                    && content_type == "image/png"
            })
            .times(1)
            .returning(|key, _| Ok(format!("https://storage.test/bucket/{key}?sig")));

        let service = FileService::new(Arc::new(generator));
        let dto = service.generate_upload_url("logo.png", "image/png").unwrap();

        assert!(dto.presigned_url.contains("-logo.png?sig"));
    }

    #[test]
    fn blank_file_name_never_reaches_storage() {
        let mut generator = MockPresignedUrlGenerator::new();
        generator.expect_upload_url().times(0);

        let service = FileService::new(Arc::new(generator));
        let err = service.generate_upload_url("  ", "image/png").unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidArgument { ref reason, .. })
                if reason == "File name is required"
        ));
    }

    #[test]
    fn download_url_strips_leading_slash() {
        let mut generator = MockPresignedUrlGenerator::new();
        generator
            .expect_download_url()
            .withf(|key| key == "uploads/a.png")
            .returning(|key| Ok(format!("https://storage.test/bucket/{key}")));

        let service = FileService::new(Arc::new(generator));
        let dto = service.generate_download_url("/uploads/a.png").unwrap();

        assert_eq!(dto.presigned_url, "https://storage.test/bucket/uploads/a.png");
    }
}
