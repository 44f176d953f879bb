//! 通过 GitHub 上的 JetBrains/swot 数据判断学校域名

use std::time::Duration;

use application::SchoolDomainVerifier;
use async_trait::async_trait;
use reqwest::{header, Client};

const GITHUB_API_VERSION: &str = "2022-11-28";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const DOMAINS_PATH: &str = "repos/JetBrains/swot/contents/lib/domains";

#[derive(Debug, thiserror::Error)]
#[error("failed to build swot client: {0}")]
pub struct SwotClientError(#[from] reqwest::Error);

/// `knu.ac.kr` 对应 `lib/domains/kr/ac/knu.txt`，文件存在即为学校域名
#[derive(Clone)]
pub struct SwotDomainVerifier {
    client: Client,
    base_url: String,
    github_token: Option<String>,
}

impl SwotDomainVerifier {
    pub fn new(
        base_url: impl Into<String>,
        github_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SwotClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("everyclub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            github_token: github_token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn from_config(config: &config::VerificationConfig) -> Result<Self, SwotClientError> {
        Self::new(
            config.swot_base_url.clone(),
            config.github_token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn lookup_url(&self, domain: &str) -> Option<String> {
        let domain = domain.trim().to_ascii_lowercase();
        let labels: Vec<&str> = domain.split('.').collect();
        let valid_label = |label: &&str| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        };
        if !labels.iter().all(valid_label) {
            return None;
        }
        let path = labels.into_iter().rev().collect::<Vec<_>>().join("/");
        Some(format!("{}/{DOMAINS_PATH}/{path}.txt", self.base_url))
    }
}

#[async_trait]
impl SchoolDomainVerifier for SwotDomainVerifier {
    async fn is_school_domain(&self, domain: &str) -> bool {
        let Some(url) = self.lookup_url(domain) else {
            return false;
        };

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, RAW_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.github_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let found = response.status().is_success();
                tracing::debug!(domain, status = %response.status(), found, "swot lookup");
                found
            }
            Err(err) => {
                tracing::warn!(domain, error = %err, "swot lookup failed");
                false
            }
        }
    }
}
