use std::sync::Arc;

use application::{ClubService, EmailVerificationService, FileService, PostService, UserService};

use crate::auth::JwtProvider;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub club_service: Arc<ClubService>,
    pub post_service: Arc<PostService>,
    pub file_service: Arc<FileService>,
    pub email_service: Arc<EmailVerificationService>,
    pub jwt: Arc<JwtProvider>,
}
