use domain::{DomainError, UserId, UserRole};

/// 已通过令牌认证的调用者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_role(&self, role: UserRole) -> Result<(), DomainError> {
        if self.role == role || self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::insufficient_role(role.as_str()))
        }
    }

    /// 资源作者或管理员才能修改
    pub fn ensure_can_manage(&self, owner: UserId, action: &str) -> Result<(), DomainError> {
        if self.user_id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::access_denied(action))
        }
    }
}
