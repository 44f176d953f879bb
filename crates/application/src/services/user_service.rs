use std::sync::Arc;

use domain::{DomainError, Email, Page, PageRequest, User, UserId, UserRole};

use crate::{
    actor::Actor, clock::Clock, dto::UserDto, error::ApplicationError, password::PasswordHasher,
    repository::UserRepository,
};

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub email: String,
    pub password: String,
}

/// 部分更新：`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, ApplicationError> {
        let email = Email::parse(request.email)?;
        if request.password.chars().count() < 8 {
            return Err(DomainError::invalid_argument(
                "password",
                "Password must be at least 8 characters",
            )
            .into());
        }

        if self
            .deps
            .user_repository
            .find_by_email(&email)
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate("user", email.as_str()).into());
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;
        let user = User::register(
            UserId::generate(),
            request.name,
            email,
            password_hash,
            self.deps.clock.now(),
        )?;

        let stored = self.deps.user_repository.create(user).await?;
        tracing::info!(user_id = %stored.id, "user registered");
        Ok(stored)
    }

    /// 邮箱不存在、账号已删除或密码错误都返回同一个认证错误
    pub async fn authenticate(
        &self,
        request: AuthenticateUserRequest,
    ) -> Result<User, ApplicationError> {
        let email =
            Email::parse(request.email).map_err(|_| DomainError::AuthenticationRequired)?;
        let user = self
            .deps
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::AuthenticationRequired)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !password_ok {
            return Err(DomainError::AuthenticationRequired.into());
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserDto, ApplicationError> {
        let user = self.load(id).await?;
        Ok(UserDto::from(&user))
    }

    pub async fn list_users(
        &self,
        actor: Actor,
        page: PageRequest,
    ) -> Result<Page<UserDto>, ApplicationError> {
        actor.require_role(UserRole::Admin)?;
        let users = self.deps.user_repository.list(page).await?;
        Ok(users.map(|user| UserDto::from(&user)))
    }

    pub async fn update_profile(
        &self,
        id: UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserDto, ApplicationError> {
        let mut user = self.load(id).await?;
        let now = self.deps.clock.now();
        if let Some(name) = request.name {
            user.rename(name, now)?;
        }
        let stored = self.deps.user_repository.update(user).await?;
        Ok(UserDto::from(&stored))
    }

    pub async fn delete_account(&self, id: UserId) -> Result<(), ApplicationError> {
        self.load(id).await?;
        self.deps
            .user_repository
            .soft_delete(id, self.deps.clock.now())
            .await?;
        tracing::info!(user_id = %id, "user soft deleted");
        Ok(())
    }

    async fn load(&self, id: UserId) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id).into())
    }
}
