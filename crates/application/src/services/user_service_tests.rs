//! 用户服务单元测试

use std::sync::Arc;

use domain::{DomainError, ErrorCode, PageRequest, UserId, UserRole};

use crate::{
    actor::Actor,
    clock::SystemClock,
    error::ApplicationError,
    services::{
        AuthenticateUserRequest, RegisterUserRequest, UpdateProfileRequest, UserService,
        UserServiceDependencies,
    },
    testing::{InMemoryUserRepository, PlainPasswordHasher},
};

/// 创建测试用的用户服务
fn create_test_service() -> UserService {
    UserService::new(UserServiceDependencies {
        user_repository: Arc::new(InMemoryUserRepository::new()),
        password_hasher: Arc::new(PlainPasswordHasher),
        clock: Arc::new(SystemClock),
    })
}

fn signup(name: &str, email: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        name: name.into(),
        email: email.into(),
        password: "password123".into(),
    }
}

fn code_of(err: ApplicationError) -> ErrorCode {
    match err {
        ApplicationError::Domain(err) => err.code(),
        other => panic!("expected domain error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_normalizes_email_and_defaults_to_guest() {
    let service = create_test_service();

    let user = service
        .register(signup("Alice", "  Alice@KNU.ac.kr "))
        .await
        .unwrap();

    assert_eq!(user.email.as_str(), "alice@knu.ac.kr");
    assert_eq!(user.role, UserRole::Guest);
    assert_eq!(user.password.as_str(), "plain:password123");
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let service = create_test_service();
    service
        .register(signup("Alice", "alice@knu.ac.kr"))
        .await
        .unwrap();

    let err = service
        .register(signup("Other", "ALICE@knu.ac.kr"))
        .await
        .unwrap_err();

    assert_eq!(code_of(err), ErrorCode::DuplicateResource);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let service = create_test_service();
    let mut request = signup("Bob", "bob@knu.ac.kr");
    request.password = "short".into();

    let err = service.register(request).await.unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { ref field, .. }) if field == "password"
    ));
}

#[tokio::test]
async fn test_authenticate_failures_share_one_error() {
    let service = create_test_service();
    service
        .register(signup("Carol", "carol@knu.ac.kr"))
        .await
        .unwrap();

    let wrong_password = service
        .authenticate(AuthenticateUserRequest {
            email: "carol@knu.ac.kr".into(),
            password: "not-the-password".into(),
        })
        .await
        .unwrap_err();
    let unknown_email = service
        .authenticate(AuthenticateUserRequest {
            email: "nobody@knu.ac.kr".into(),
            password: "password123".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(code_of(wrong_password), ErrorCode::AuthenticationRequired);
    assert_eq!(code_of(unknown_email), ErrorCode::AuthenticationRequired);

    let user = service
        .authenticate(AuthenticateUserRequest {
            email: "carol@knu.ac.kr".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.name, "Carol");
}

#[tokio::test]
async fn test_partial_update_keeps_absent_fields() {
    let service = create_test_service();
    let user = service
        .register(signup("Dave", "dave@knu.ac.kr"))
        .await
        .unwrap();

    let unchanged = service
        .update_profile(user.id, UpdateProfileRequest::default())
        .await
        .unwrap();
    assert_eq!(unchanged.name, "Dave");

    let renamed = service
        .update_profile(
            user.id,
            UpdateProfileRequest {
                name: Some("David".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "David");
    assert_eq!(renamed.email, "dave@knu.ac.kr");
}

#[tokio::test]
async fn test_deleted_account_is_invisible() {
    let service = create_test_service();
    let user = service
        .register(signup("Erin", "erin@knu.ac.kr"))
        .await
        .unwrap();

    service.delete_account(user.id).await.unwrap();

    assert_eq!(
        code_of(service.get_user(user.id).await.unwrap_err()),
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        code_of(
            service
                .authenticate(AuthenticateUserRequest {
                    email: "erin@knu.ac.kr".into(),
                    password: "password123".into(),
                })
                .await
                .unwrap_err()
        ),
        ErrorCode::AuthenticationRequired
    );
    // 邮箱释放后可以重新注册
    service
        .register(signup("Erin", "erin@knu.ac.kr"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let service = create_test_service();
    let user = service
        .register(signup("Frank", "frank@knu.ac.kr"))
        .await
        .unwrap();

    let err = service
        .list_users(Actor::new(user.id, UserRole::Member), PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::InsufficientRole);

    let page = service
        .list_users(
            Actor::new(UserId::generate(), UserRole::Admin),
            PageRequest::new(0, 10),
        )
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].email, "frank@knu.ac.kr");
}
