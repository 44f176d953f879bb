//! JWT 令牌的签发与验证（HS512）
//!
//! `validate` 严格检查签名与过期时间，只返回布尔值；`claims_lenient` 只校验签名、
//! 不检查过期，用于从过期令牌中取出用户标识写日志。两条路径刻意分开。

use application::Actor;
use chrono::{Duration, Utc};
use domain::{ErrorCode, UserId, UserRole};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

const ALGORITHM: Algorithm = Algorithm::HS512;
const TOKEN_TYPE: &str = "Bearer";

/// 令牌载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_type: String,
    pub access_token: String,
    pub expires_in_seconds: i64,
}

#[derive(Clone)]
pub struct JwtProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl JwtProvider {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn from_config(config: &config::AppConfig) -> Result<Self, config::ConfigError> {
        Ok(Self::new(
            &config.jwt_secret_bytes()?,
            Duration::minutes(config.jwt.access_token_minutes),
        ))
    }

    pub fn issue(&self, user_id: UserId, role: UserRole) -> Result<TokenInfo, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: Some(role.authority()),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        let access_token = self.encode_claims(&claims)?;

        Ok(TokenInfo {
            token_type: TOKEN_TYPE.to_owned(),
            access_token,
            expires_in_seconds: self.lifetime.num_seconds(),
        })
    }

    /// 签名正确且当前时间早于过期时间才返回 true，失败原因只写日志
    pub fn validate(&self, token: &str) -> bool {
        match decode::<Claims>(token, &self.decoding_key, &strict_validation()) {
            Ok(data) if data.claims.exp > Utc::now().timestamp() => true,
            Ok(data) => {
                tracing::debug!(subject = %data.claims.sub, "token expired");
                false
            }
            Err(err) => {
                match err.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("token expired"),
                    ErrorKind::InvalidSignature => tracing::warn!("token signature mismatch"),
                    ErrorKind::InvalidAlgorithm => tracing::warn!("token uses unsupported algorithm"),
                    ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                        tracing::warn!(error = %err, "token claims could not be parsed")
                    }
                    _ => tracing::warn!(error = %err, "malformed token"),
                }
                false
            }
        }
    }

    /// 校验签名但忽略过期时间
    pub fn claims_lenient(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = strict_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| ApiError::new(ErrorCode::InvalidToken).with_detail(err.to_string()))
    }

    /// 过期令牌同样可以取出用户标识
    pub fn subject(&self, token: &str) -> Option<String> {
        self.claims_lenient(token).ok().map(|claims| claims.sub)
    }

    /// 从有效令牌还原调用者；缺少角色声明视为无效令牌
    pub fn principal(&self, token: &str) -> Result<Actor, ApiError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &strict_validation())
            .map(|data| data.claims)
            .map_err(|err| ApiError::new(ErrorCode::InvalidToken).with_detail(err.to_string()))?;

        let role = claims
            .role
            .as_deref()
            .ok_or_else(|| {
                ApiError::new(ErrorCode::InvalidToken).with_detail("token has no role claim")
            })?
            .parse::<UserRole>()
            .map_err(|err| ApiError::new(ErrorCode::InvalidToken).with_detail(err.to_string()))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|err| ApiError::new(ErrorCode::InvalidToken).with_detail(err.to_string()))?;

        Ok(Actor::new(UserId::from(user_id), role))
    }

    /// 请求认证入口：区分过期与其他无效情况
    pub fn authenticate(&self, token: &str) -> Result<Actor, ApiError> {
        if !self.validate(token) {
            let now = Utc::now().timestamp();
            return Err(match self.claims_lenient(token) {
                Ok(claims) if claims.exp <= now => {
                    tracing::warn!(subject = %claims.sub, "expired token presented");
                    ApiError::new(ErrorCode::ExpiredToken)
                }
                _ => ApiError::new(ErrorCode::InvalidToken),
            });
        }
        self.principal(token)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|err| ApiError::internal(format!("token signing failed: {err}")))
    }
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation
}
