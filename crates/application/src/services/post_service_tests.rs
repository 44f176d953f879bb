//! 帖子服务单元测试

use std::sync::Arc;

use domain::{ErrorCode, PageRequest, PostId, UserId, UserRole};

use crate::{
    actor::Actor,
    clock::SystemClock,
    dto::UNKNOWN_AUTHOR,
    error::ApplicationError,
    services::{
        CreatePostRequest, PostService, PostServiceDependencies, RegisterUserRequest,
        UpdatePostRequest, UserService, UserServiceDependencies,
    },
    testing::{InMemoryPostRepository, InMemoryUserRepository, PlainPasswordHasher},
};

struct Fixture {
    posts: PostService,
    users: UserService,
}

/// 帖子服务与用户服务共享同一个用户仓储
fn fixture() -> Fixture {
    let user_repository = Arc::new(InMemoryUserRepository::new());
    Fixture {
        posts: PostService::new(PostServiceDependencies {
            post_repository: Arc::new(InMemoryPostRepository::new()),
            user_repository: user_repository.clone(),
            clock: Arc::new(SystemClock),
        }),
        users: UserService::new(UserServiceDependencies {
            user_repository,
            password_hasher: Arc::new(PlainPasswordHasher),
            clock: Arc::new(SystemClock),
        }),
    }
}

impl Fixture {
    async fn member(&self, name: &str) -> UserId {
        self.users
            .register(RegisterUserRequest {
                name: name.into(),
                email: format!("{}@knu.ac.kr", name.to_lowercase()),
                password: "password123".into(),
            })
            .await
            .unwrap()
            .id
    }
}

fn draft(title: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: title.into(),
        content: "body".into(),
    }
}

fn code_of(err: ApplicationError) -> ErrorCode {
    match err {
        ApplicationError::Domain(err) => err.code(),
        other => panic!("expected domain error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_and_read_post() {
    let f = fixture();
    let author = f.member("Mina").await;

    let id = f.posts.create_post(author, draft("Hello")).await.unwrap();
    let post = f.posts.get_post(id).await.unwrap();

    assert_eq!(post.title, "Hello");
    assert_eq!(post.author_name, "Mina");
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let f = fixture();
    let author = f.member("Nari").await;

    let err = f.posts.create_post(author, draft("   ")).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::InvalidInput);

    let err = f
        .posts
        .create_post(UserId::generate(), draft("orphan"))
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_update_is_partial_and_guarded() {
    let f = fixture();
    let author = f.member("Ora").await;
    let other = f.member("Pia").await;
    let id = f.posts.create_post(author, draft("Original")).await.unwrap();

    let err = f
        .posts
        .update_post(
            Actor::new(other, UserRole::Member),
            id,
            UpdatePostRequest {
                title: Some("Hijacked".into()),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::AccessDenied);

    f.posts
        .update_post(
            Actor::new(author, UserRole::Guest),
            id,
            UpdatePostRequest {
                title: None,
                content: Some("edited".into()),
            },
        )
        .await
        .unwrap();
    let post = f.posts.get_post(id).await.unwrap();
    assert_eq!(post.title, "Original");
    assert_eq!(post.content, "edited");
}

#[tokio::test]
async fn test_deleted_post_is_not_found() {
    let f = fixture();
    let author = f.member("Quinn").await;
    let id = f.posts.create_post(author, draft("Temp")).await.unwrap();

    f.posts
        .delete_post(Actor::new(UserId::generate(), UserRole::Admin), id)
        .await
        .unwrap();

    assert_eq!(
        code_of(f.posts.get_post(id).await.unwrap_err()),
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        code_of(f.posts.get_post(PostId::generate()).await.unwrap_err()),
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        f.posts
            .list_posts(PageRequest::default())
            .await
            .unwrap()
            .total_elements,
        0
    );
}

#[tokio::test]
async fn test_author_name_falls_back_when_author_is_gone() {
    let f = fixture();
    let author = f.member("Rae").await;
    f.posts.create_post(author, draft("Left behind")).await.unwrap();

    f.users.delete_account(author).await.unwrap();

    let page = f.posts.list_posts(PageRequest::default()).await.unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].author_name, UNKNOWN_AUTHOR);
}
