//! 集成测试公共设施：内存仓储 + 完整路由
#![allow(dead_code)]

use std::sync::Arc;

use application::{
    storage::MockPresignedUrlGenerator,
    testing::{
        InMemoryCategoryRepository, InMemoryClubLikeRepository, InMemoryClubRepository,
        InMemoryPostRepository, InMemoryUserRepository, PlainPasswordHasher,
    },
    verification::MockSchoolDomainVerifier,
    ClubService, ClubServiceDependencies, EmailVerificationService, FileService, PostService,
    PostServiceDependencies, SystemClock, UserService, UserServiceDependencies,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use domain::{Category, CategoryId};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use web_api::{router, AppState, JwtProvider};

pub const JWT_SECRET: [u8; 64] = [42; 64];
pub const ACADEMIC: Uuid = Uuid::from_u128(1);

pub struct TestApp {
    router: Router,
    pub jwt: Arc<JwtProvider>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ports(MockPresignedUrlGenerator::new(), MockSchoolDomainVerifier::new())
    }

    pub fn with_ports(
        url_generator: MockPresignedUrlGenerator,
        verifier: MockSchoolDomainVerifier,
    ) -> Self {
        let clock = Arc::new(SystemClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let categories = InMemoryCategoryRepository::with_categories(vec![Category {
            id: CategoryId::new(ACADEMIC),
            name: "Academic".into(),
            created_at: Utc::now(),
        }]);
        let jwt = Arc::new(JwtProvider::new(&JWT_SECRET, Duration::minutes(60)));

        let state = AppState {
            user_service: Arc::new(UserService::new(UserServiceDependencies {
                user_repository: users.clone(),
                password_hasher: Arc::new(PlainPasswordHasher),
                clock: clock.clone(),
            })),
            club_service: Arc::new(ClubService::new(ClubServiceDependencies {
                club_repository: Arc::new(InMemoryClubRepository::new()),
                category_repository: Arc::new(categories),
                user_repository: users.clone(),
                like_repository: Arc::new(InMemoryClubLikeRepository::new()),
                clock: clock.clone(),
            })),
            post_service: Arc::new(PostService::new(PostServiceDependencies {
                post_repository: Arc::new(InMemoryPostRepository::new()),
                user_repository: users,
                clock,
            })),
            file_service: Arc::new(FileService::new(Arc::new(url_generator))),
            email_service: Arc::new(EmailVerificationService::new(
                Arc::new(verifier),
                vec!["knu.ac.kr".into()],
            )),
            jwt: jwt.clone(),
        };

        Self {
            router: router(state),
            jwt,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    /// 注册并返回访问令牌
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(serde_json::json!({"name": name, "email": email, "password": "password123"})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["accessToken"].as_str().unwrap().to_owned()
    }

    pub async fn user_id(&self, token: &str) -> Uuid {
        let me = self.get("/api/users/me", Some(token)).await;
        me.data()["id"].as_str().unwrap().parse().unwrap()
    }
}
