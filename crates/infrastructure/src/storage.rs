//! S3 兼容对象存储的预签名 URL（AWS Signature Version 4，查询参数方式）

use std::sync::Arc;

use application::{clock::Clock, PresignedUrlGenerator, StorageError};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

#[derive(Clone)]
pub struct S3PresignerSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub expiration: Duration,
    pub path_style: bool,
}

impl From<&config::StorageConfig> for S3PresignerSettings {
    fn from(value: &config::StorageConfig) -> Self {
        Self {
            endpoint: value.endpoint.clone(),
            region: value.region.clone(),
            access_key: value.access_key.clone(),
            secret_key: value.secret_key.clone(),
            bucket: value.bucket.clone(),
            expiration: Duration::minutes(value.expiration_minutes),
            path_style: value.path_style,
        }
    }
}

pub struct S3Presigner {
    settings: S3PresignerSettings,
    scheme: String,
    /// 签名用的 host 头（含非默认端口）
    host: String,
    clock: Arc<dyn Clock>,
}

impl S3Presigner {
    pub fn new(settings: S3PresignerSettings, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|err| StorageError::Signing(format!("invalid endpoint: {err}")))?;
        let endpoint_host = endpoint
            .host_str()
            .ok_or_else(|| StorageError::Signing("endpoint has no host".into()))?;
        let authority = match endpoint.port() {
            Some(port) => format!("{endpoint_host}:{port}"),
            None => endpoint_host.to_owned(),
        };
        let host = if settings.path_style {
            authority
        } else {
            format!("{}.{authority}", settings.bucket)
        };

        Ok(Self {
            scheme: endpoint.scheme().to_owned(),
            host,
            settings,
            clock,
        })
    }

    fn canonical_uri(&self, key: &str) -> String {
        let encoded_key = uri_encode(key, false);
        if self.settings.path_style {
            format!("/{}/{encoded_key}", uri_encode(&self.settings.bucket, true))
        } else {
            format!("/{encoded_key}")
        }
    }

    fn presign(
        &self,
        method: &str,
        key: &str,
        content_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::InvalidKey("object key must not be empty".into()));
        }

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.settings.region);
        let credential = format!("{}/{scope}", self.settings.access_key);

        let mut headers = vec![("host", self.host.clone())];
        if let Some(content_type) = content_type {
            headers.insert(0, ("content-type", content_type.trim().to_owned()));
        }
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();

        let query = [
            ("X-Amz-Algorithm", ALGORITHM.to_owned()),
            ("X-Amz-Credential", credential),
            ("X-Amz-Date", amz_date.clone()),
            (
                "X-Amz-Expires",
                self.settings.expiration.num_seconds().to_string(),
            ),
            ("X-Amz-SignedHeaders", signed_headers.clone()),
        ]
        .iter()
        .map(|(name, value)| format!("{name}={}", uri_encode(value, true)))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_uri = self.canonical_uri(key);
        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{query}\n{canonical_headers}\n{signed_headers}\n{UNSIGNED_PAYLOAD}"
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = hex::encode(self.sign(&date, string_to_sign.as_bytes())?);
        Ok(format!(
            "{}://{}{canonical_uri}?{query}&X-Amz-Signature={signature}",
            self.scheme, self.host
        ))
    }

    fn sign(&self, date: &str, string_to_sign: &[u8]) -> Result<Vec<u8>, StorageError> {
        let secret = format!("AWS4{}", self.settings.secret_key);
        let date_key = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        let region_key = hmac_sha256(&date_key, self.settings.region.as_bytes())?;
        let service_key = hmac_sha256(&region_key, SERVICE.as_bytes())?;
        let signing_key = hmac_sha256(&service_key, b"aws4_request")?;
        hmac_sha256(&signing_key, string_to_sign)
    }
}

impl PresignedUrlGenerator for S3Presigner {
    fn upload_url(&self, key: &str, content_type: &str) -> Result<String, StorageError> {
        self.presign("PUT", key, Some(content_type), self.clock.now())
    }

    fn download_url(&self, key: &str) -> Result<String, StorageError> {
        self.presign("GET", key, None, self.clock.now())
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| StorageError::Signing(format!("invalid HMAC key: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// SigV4 的 URI 编码：仅保留非保留字符，`encode_slash` 为 false 时保留路径分隔符
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b'/' if !encode_slash => encoded.push('/'),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
