use std::{collections::HashMap, sync::Arc};

use domain::{
    CategoryId, Club, ClubDetails, ClubId, DomainError, Page, PageRequest, UserId,
};

use crate::{
    actor::Actor,
    clock::Clock,
    dto::{CategoryDto, ClubDetailDto, ClubSummaryDto},
    error::ApplicationError,
    repository::{
        CategoryRepository, ClubFilter, ClubLikeRepository, ClubRepository, UserRepository,
    },
};

#[derive(Debug, Clone)]
pub struct CreateClubRequest {
    pub slug: String,
    pub category_id: CategoryId,
    pub details: ClubDetails,
}

pub struct ClubServiceDependencies {
    pub club_repository: Arc<dyn ClubRepository>,
    pub category_repository: Arc<dyn CategoryRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub like_repository: Arc<dyn ClubLikeRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct ClubService {
    deps: ClubServiceDependencies,
}

impl ClubService {
    pub fn new(deps: ClubServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn create_club(
        &self,
        author_id: UserId,
        request: CreateClubRequest,
    ) -> Result<ClubId, ApplicationError> {
        let slug = request.slug.trim().to_owned();
        if self.deps.club_repository.exists_by_slug(&slug).await? {
            return Err(DomainError::duplicate("club", slug).into());
        }

        let author = self
            .deps
            .user_repository
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", author_id))?;
        let category = self
            .deps
            .category_repository
            .find_by_id(request.category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("category", request.category_id))?;

        let club = Club::create(
            ClubId::generate(),
            slug,
            category.id,
            author.id,
            request.details,
            self.deps.clock.now(),
        )?;
        let stored = self.deps.club_repository.create(club).await?;
        tracing::info!(club_id = %stored.id, slug = %stored.slug, "club created");
        Ok(stored.id)
    }

    /// 公开社团列表（附带点赞数）
    pub async fn list_public_clubs(
        &self,
        page: PageRequest,
    ) -> Result<Page<ClubSummaryDto>, ApplicationError> {
        let clubs = self
            .deps
            .club_repository
            .list(&ClubFilter::public(), page)
            .await?;
        self.summarize(clubs).await
    }

    pub async fn search_clubs_by_tag(
        &self,
        tag: &str,
        page: PageRequest,
    ) -> Result<Page<ClubSummaryDto>, ApplicationError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(DomainError::invalid_argument("tag", "Tag must not be empty").into());
        }
        let clubs = self
            .deps
            .club_repository
            .list(&ClubFilter::public_with_tag(tag), page)
            .await?;
        self.summarize(clubs).await
    }

    /// 非公开、已删除、不存在的社团一律返回 RESOURCE_NOT_FOUND
    pub async fn get_public_club(
        &self,
        id: ClubId,
        viewer: Option<UserId>,
    ) -> Result<ClubDetailDto, ApplicationError> {
        let club = self
            .deps
            .club_repository
            .find_by_id(id)
            .await?
            .filter(Club::is_public)
            .ok_or_else(|| DomainError::not_found("club", id))?;

        let like_count = self.deps.like_repository.count_by_club(id).await?;
        let is_liked = match viewer {
            Some(user_id) => self.deps.like_repository.exists(user_id, id).await?,
            None => false,
        };
        let category_name = self
            .deps
            .category_repository
            .find_by_id(club.category_id)
            .await?
            .map(|category| category.name);
        let author_name = self
            .deps
            .user_repository
            .find_by_id(club.author_id)
            .await?
            .map(|author| author.name);

        let summary = ClubSummaryDto::new(&club, like_count, category_name, author_name);
        Ok(ClubDetailDto::new(&club, summary, is_liked))
    }

    pub async fn update_club(
        &self,
        actor: Actor,
        id: ClubId,
        details: ClubDetails,
    ) -> Result<(), ApplicationError> {
        let mut club = self.load(id).await?;
        actor.ensure_can_manage(club.author_id, "update club")?;

        club.update(details, self.deps.clock.now())?;
        self.deps.club_repository.update(club).await?;
        Ok(())
    }

    pub async fn delete_club(&self, actor: Actor, id: ClubId) -> Result<(), ApplicationError> {
        let club = self.load(id).await?;
        actor.ensure_can_manage(club.author_id, "delete club")?;

        self.deps
            .club_repository
            .soft_delete(id, self.deps.clock.now())
            .await?;
        tracing::info!(club_id = %id, "club soft deleted");
        Ok(())
    }

    /// 切换点赞状态，返回切换后是否为已点赞
    pub async fn toggle_like(
        &self,
        user_id: UserId,
        club_id: ClubId,
    ) -> Result<bool, ApplicationError> {
        self.load(club_id).await?;
        self.deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;

        let liked = self
            .deps
            .like_repository
            .toggle(user_id, club_id, self.deps.clock.now())
            .await?;
        tracing::debug!(%club_id, %user_id, liked, "club like toggled");
        Ok(liked)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryDto>, ApplicationError> {
        let categories = self.deps.category_repository.list_all().await?;
        Ok(categories.iter().map(CategoryDto::from).collect())
    }

    async fn load(&self, id: ClubId) -> Result<Club, ApplicationError> {
        self.deps
            .club_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("club", id).into())
    }

    async fn summarize(&self, clubs: Page<Club>) -> Result<Page<ClubSummaryDto>, ApplicationError> {
        let club_ids: Vec<ClubId> = clubs.content.iter().map(|club| club.id).collect();
        let mut author_ids: Vec<UserId> = clubs.content.iter().map(|club| club.author_id).collect();
        author_ids.sort_by_key(|id| id.0);
        author_ids.dedup();

        let like_counts = self.deps.like_repository.count_by_clubs(&club_ids).await?;
        let categories: HashMap<CategoryId, String> = self
            .deps
            .category_repository
            .list_all()
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();
        let authors: HashMap<UserId, String> = self
            .deps
            .user_repository
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        Ok(clubs.map(|club| {
            ClubSummaryDto::new(
                &club,
                like_counts.get(&club.id).copied().unwrap_or_default(),
                categories.get(&club.category_id).cloned(),
                authors.get(&club.author_id).cloned(),
            )
        }))
    }
}
