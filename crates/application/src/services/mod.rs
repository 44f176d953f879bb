mod club_service;
mod email_service;
mod file_service;
mod post_service;
mod user_service;

#[cfg(test)]
mod post_service_tests;
#[cfg(test)]
mod user_service_tests;

pub use club_service::{ClubService, ClubServiceDependencies, CreateClubRequest};
pub use email_service::EmailVerificationService;
pub use file_service::FileService;
pub use post_service::{
    CreatePostRequest, PostService, PostServiceDependencies, UpdatePostRequest,
};
pub use user_service::{
    AuthenticateUserRequest, RegisterUserRequest, UpdateProfileRequest, UserService,
    UserServiceDependencies,
};
