use async_trait::async_trait;

/// 判断域名是否属于已知的学校域名
///
/// 实现方不得返回错误：网络故障一律视为 `false`。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SchoolDomainVerifier: Send + Sync {
    async fn is_school_domain(&self, domain: &str) -> bool;
}
