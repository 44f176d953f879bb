use std::{collections::HashMap, sync::Arc};

use domain::{DomainError, Page, PageRequest, Post, PostId, UserId};

use crate::{
    actor::Actor,
    clock::Clock,
    dto::PostDto,
    error::ApplicationError,
    repository::{PostRepository, UserRepository},
};

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct PostServiceDependencies {
    pub post_repository: Arc<dyn PostRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct PostService {
    deps: PostServiceDependencies,
}

impl PostService {
    pub fn new(deps: PostServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create_post(
        &self,
        author_id: UserId,
        request: CreatePostRequest,
    ) -> Result<PostId, ApplicationError> {
        let author = self
            .deps
            .user_repository
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", author_id))?;

        let post = Post::create(
            PostId::generate(),
            author.id,
            request.title,
            request.content,
            self.deps.clock.now(),
        )?;
        let stored = self.deps.post_repository.create(post).await?;
        Ok(stored.id)
    }

    pub async fn list_posts(&self, page: PageRequest) -> Result<Page<PostDto>, ApplicationError> {
        let posts = self.deps.post_repository.list(page).await?;

        let mut author_ids: Vec<UserId> = posts.content.iter().map(|post| post.author_id).collect();
        author_ids.sort_by_key(|id| id.0);
        author_ids.dedup();
        let authors: HashMap<UserId, String> = self
            .deps
            .user_repository
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        Ok(posts.map(|post| PostDto::new(&post, authors.get(&post.author_id).cloned())))
    }

    pub async fn get_post(&self, id: PostId) -> Result<PostDto, ApplicationError> {
        let post = self.load(id).await?;
        let author_name = self
            .deps
            .user_repository
            .find_by_id(post.author_id)
            .await?
            .map(|author| author.name);
        Ok(PostDto::new(&post, author_name))
    }

    pub async fn update_post(
        &self,
        actor: Actor,
        id: PostId,
        request: UpdatePostRequest,
    ) -> Result<(), ApplicationError> {
        let mut post = self.load(id).await?;
        actor.ensure_can_manage(post.author_id, "update post")?;

        post.edit(request.title, request.content, self.deps.clock.now())?;
        self.deps.post_repository.update(post).await?;
        Ok(())
    }

    pub async fn delete_post(&self, actor: Actor, id: PostId) -> Result<(), ApplicationError> {
        let post = self.load(id).await?;
        actor.ensure_can_manage(post.author_id, "delete post")?;

        self.deps
            .post_repository
            .soft_delete(id, self.deps.clock.now())
            .await?;
        Ok(())
    }

    async fn load(&self, id: PostId) -> Result<Post, ApplicationError> {
        self.deps
            .post_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id).into())
    }
}
