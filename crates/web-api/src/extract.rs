//! 请求提取器：框架层面的拒绝统一转成 `INVALID_INPUT`，认证失败转成 AUTH 错误码

use application::Actor;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use domain::{ErrorCode, PageRequest};
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::{
    error::{camel_case, ApiError},
    state::AppState,
};

/// 请求体字段的声明顺序，校验错误按此顺序输出
pub trait FieldOrder {
    const FIELDS: &'static [&'static str];
}

/// 反序列化后再执行 `validator` 校验
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + FieldOrder,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|errors| ApiError::validation(&ordered_field_errors(&errors, T::FIELDS)))?;
        Ok(Self(value))
    }
}

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// 必须携带有效的 Bearer 令牌
pub struct AuthUser(pub Actor);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::new(ErrorCode::AuthenticationRequired))?;
        state.jwt.authenticate(token).map(AuthUser)
    }
}

/// 公开接口上的可选认证，令牌无效时按匿名访问处理
pub struct OptionalAuthUser(pub Option<Actor>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Self(None));
        };
        match state.jwt.authenticate(token) {
            Ok(actor) => Ok(Self(Some(actor))),
            Err(err) => {
                tracing::debug!(code = %err.code(), "ignoring invalid token on public route");
                Ok(Self(None))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `?page=&size=`，页码从 0 开始
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.size.unwrap_or(defaults.size),
        )
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// 按声明顺序展开字段错误，每个字段只取第一条
fn ordered_field_errors(errors: &ValidationErrors, order: &[&str]) -> Vec<(String, String)> {
    let mut collected = Vec::new();
    collect_field_errors(errors, &mut collected);
    collected.sort_by_key(|(field, _)| {
        (
            order
                .iter()
                .position(|name| name == field)
                .unwrap_or(usize::MAX),
            field.clone(),
        )
    });
    collected
        .into_iter()
        .map(|(field, message)| (camel_case(&field), message))
        .collect()
}

fn collect_field_errors(errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| first.code.to_string());
                    out.push((field.to_string(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_field_errors(inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank", message = "Name must not be empty"))]
        name: String,
        #[validate(required(message = "Category ID must not be null"))]
        category_id: Option<u32>,
        #[validate(custom(function = "not_blank", message = "Slug must not be empty"))]
        slug: String,
    }

    impl FieldOrder for Sample {
        const FIELDS: &'static [&'static str] = &["name", "category_id", "slug"];
    }

    #[test]
    fn errors_follow_declaration_order() {
        let sample = Sample {
            name: " ".into(),
            category_id: None,
            slug: String::new(),
        };
        let errors = sample.validate().unwrap_err();

        let ordered = ordered_field_errors(&errors, Sample::FIELDS);
        assert_eq!(
            ordered,
            vec![
                ("name".to_owned(), "Name must not be empty".to_owned()),
                ("categoryId".to_owned(), "Category ID must not be null".to_owned()),
                ("slug".to_owned(), "Slug must not be empty".to_owned()),
            ]
        );
    }

    #[test]
    fn page_query_defaults_and_clamps() {
        assert_eq!(PageQuery::default().to_request(), PageRequest::new(0, 20));
        let query = PageQuery {
            page: Some(2),
            size: Some(1000),
        };
        assert_eq!(query.to_request().size, 100);
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }
}
