use std::sync::Arc;

use domain::{DomainError, Email};

use crate::{error::ApplicationError, verification::SchoolDomainVerifier};

/// 学校邮箱判断：先查本地配置的域名列表，再查询外部学校域名库
pub struct EmailVerificationService {
    verifier: Arc<dyn SchoolDomainVerifier>,
    school_domains: Vec<String>,
}

impl EmailVerificationService {
    pub fn new(verifier: Arc<dyn SchoolDomainVerifier>, school_domains: Vec<String>) -> Self {
        let school_domains = school_domains
            .into_iter()
            .map(|domain| domain.trim().trim_start_matches('@').to_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self {
            verifier,
            school_domains,
        }
    }

    pub async fn is_school_email(&self, email: &str) -> Result<bool, ApplicationError> {
        let email = Email::parse(email).map_err(|_| DomainError::invalid_email_domain(email))?;
        let domain = email.domain();

        if self.is_configured(domain) {
            return Ok(true);
        }
        Ok(self.verifier.is_school_domain(domain).await)
    }

    /// 完全匹配或子域名匹配（`cse.knu.ac.kr` 属于 `knu.ac.kr`）
    fn is_configured(&self, domain: &str) -> bool {
        self.school_domains.iter().any(|school| {
            domain == school
                || domain
                    .strip_suffix(school.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::MockSchoolDomainVerifier;

    fn service(verifier: MockSchoolDomainVerifier) -> EmailVerificationService {
        EmailVerificationService::new(Arc::new(verifier), vec!["knu.ac.kr".into()])
    }

    #[tokio::test]
    async fn configured_domain_skips_remote_lookup() {
        let mut verifier = MockSchoolDomainVerifier::new();
        verifier.expect_is_school_domain().times(0);

        let service = service(verifier);
        assert!(service.is_school_email("test@knu.ac.kr").await.unwrap());
        assert!(service.is_school_email("test@cse.knu.ac.kr").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_domain_defers_to_verifier() {
        let mut verifier = MockSchoolDomainVerifier::new();
        verifier
            .expect_is_school_domain()
            .withf(|domain| domain == "gmail.com")
            .times(1)
            .returning(|_| false);

        let service = service(verifier);
        assert!(!service.is_school_email("test@gmail.com").await.unwrap());
    }

    #[tokio::test]
    async fn suffix_without_label_boundary_is_not_configured() {
        let mut verifier = MockSchoolDomainVerifier::new();
        verifier.expect_is_school_domain().returning(|_| false);

        let service = service(verifier);
        assert!(!service.is_school_email("test@fakeknu.ac.kr").await.unwrap());
    }

    #[tokio::test]
    async fn address_without_domain_is_rejected() {
        let service = service(MockSchoolDomainVerifier::new());
        let err = service.is_school_email("no-at-sign").await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidEmailDomain { .. })
        ));
    }
}
