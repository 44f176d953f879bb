//! 测试用的内存仓储与简单适配器
//!
//! 与 PostgreSQL 实现保持相同语义：读取只返回未软删除的记录。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use domain::{
    entities::SoftDelete, Category, CategoryId, Club, ClubId, Email, Page, PageRequest,
    PasswordHash, Post, PostId, RepositoryError, Timestamp, User, UserId,
};
use tokio::sync::{Mutex, RwLock};

use crate::{
    password::{PasswordHasher, PasswordHasherError},
    repository::{
        CategoryRepository, ClubFilter, ClubLikeRepository, ClubRepository, PostRepository,
        UserRepository,
    },
};

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let content = if offset >= items.len() {
        Vec::new()
    } else {
        items
            .drain(offset..)
            .take(page.size as usize)
            .collect()
    };
    Page::new(content, page, total)
}

fn live<'a, T: SoftDelete + 'a>(items: impl Iterator<Item = &'a T>) -> impl Iterator<Item = &'a T> {
    items.filter(|item| !item.is_deleted())
}

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    data: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.data.write().await;
        if guard.contains_key(&user.id) || live(guard.values()).any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.data.write().await;
        if !guard.get(&user.id).is_some_and(|existing| !existing.is_deleted()) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let guard = self.data.read().await;
        let found = live(guard.get(&id).into_iter()).next().cloned();
        Ok(found)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let guard = self.data.read().await;
        let found = live(guard.values()).find(|u| &u.email == email).cloned();
        Ok(found)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let guard = self.data.read().await;
        let users = live(ids.iter().filter_map(|id| guard.get(id)))
            .cloned()
            .collect();
        Ok(users)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepositoryError> {
        let guard = self.data.read().await;
        let mut users: Vec<User> = live(guard.values()).cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(paginate(users, page))
    }

    async fn soft_delete(&self, id: UserId, at: Timestamp) -> Result<(), RepositoryError> {
        let mut guard = self.data.write().await;
        match guard.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.soft_delete(at);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryClubRepository {
    data: Arc<RwLock<HashMap<ClubId, Club>>>,
}

impl InMemoryClubRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClubRepository for InMemoryClubRepository {
    async fn create(&self, club: Club) -> Result<Club, RepositoryError> {
        let mut guard = self.data.write().await;
        if guard.contains_key(&club.id) || live(guard.values()).any(|c| c.slug == club.slug) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(club.id, club.clone());
        Ok(club)
    }

    async fn update(&self, club: Club) -> Result<Club, RepositoryError> {
        let mut guard = self.data.write().await;
        if !guard.get(&club.id).is_some_and(|existing| !existing.is_deleted()) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(club.id, club.clone());
        Ok(club)
    }

    async fn find_by_id(&self, id: ClubId) -> Result<Option<Club>, RepositoryError> {
        let guard = self.data.read().await;
        let found = live(guard.get(&id).into_iter()).next().cloned();
        Ok(found)
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool, RepositoryError> {
        let guard = self.data.read().await;
        let exists = live(guard.values()).any(|c| c.slug == slug);
        Ok(exists)
    }

    async fn list(
        &self,
        filter: &ClubFilter,
        page: PageRequest,
    ) -> Result<Page<Club>, RepositoryError> {
        let guard = self.data.read().await;
        let mut clubs: Vec<Club> = live(guard.values())
            .filter(|club| filter.matches(club))
            .cloned()
            .collect();
        clubs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(clubs, page))
    }

    async fn soft_delete(&self, id: ClubId, at: Timestamp) -> Result<(), RepositoryError> {
        let mut guard = self.data.write().await;
        match guard.get_mut(&id) {
            Some(club) if !club.is_deleted() => {
                club.soft_delete(at);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

/// 点赞关联表，单把锁保证切换操作的原子性
#[derive(Default, Clone)]
pub struct InMemoryClubLikeRepository {
    likes: Arc<Mutex<HashSet<(UserId, ClubId)>>>,
}

impl InMemoryClubLikeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClubLikeRepository for InMemoryClubLikeRepository {
    async fn toggle(
        &self,
        user_id: UserId,
        club_id: ClubId,
        _at: Timestamp,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.likes.lock().await;
        if guard.remove(&(user_id, club_id)) {
            Ok(false)
        } else {
            guard.insert((user_id, club_id));
            Ok(true)
        }
    }

    async fn exists(&self, user_id: UserId, club_id: ClubId) -> Result<bool, RepositoryError> {
        let liked = self.likes.lock().await.contains(&(user_id, club_id));
        Ok(liked)
    }

    async fn count_by_club(&self, club_id: ClubId) -> Result<u64, RepositoryError> {
        let guard = self.likes.lock().await;
        let count = guard.iter().filter(|(_, club)| *club == club_id).count() as u64;
        Ok(count)
    }

    async fn count_by_clubs(
        &self,
        club_ids: &[ClubId],
    ) -> Result<HashMap<ClubId, u64>, RepositoryError> {
        let guard = self.likes.lock().await;
        let mut counts = HashMap::new();
        for (_, club_id) in guard.iter().filter(|(_, club)| club_ids.contains(club)) {
            *counts.entry(*club_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCategoryRepository {
    data: Arc<RwLock<Vec<Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            data: Arc::new(RwLock::new(categories)),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let guard = self.data.read().await;
        let found = guard.iter().find(|c| c.id == id).cloned();
        Ok(found)
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.data.read().await.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPostRepository {
    data: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, RepositoryError> {
        let mut guard = self.data.write().await;
        if guard.contains_key(&post.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepositoryError> {
        let mut guard = self.data.write().await;
        if !guard.get(&post.id).is_some_and(|existing| !existing.is_deleted()) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let guard = self.data.read().await;
        let found = live(guard.get(&id).into_iter()).next().cloned();
        Ok(found)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepositoryError> {
        let guard = self.data.read().await;
        let mut posts: Vec<Post> = live(guard.values()).cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(posts, page))
    }

    async fn soft_delete(&self, id: PostId, at: Timestamp) -> Result<(), RepositoryError> {
        let mut guard = self.data.write().await;
        match guard.get_mut(&id) {
            Some(post) if !post.is_deleted() => {
                post.soft_delete(at);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

/// 不做真实哈希的密码适配器，避免测试中 bcrypt 的开销
#[derive(Debug, Default, Clone)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain:{plaintext}"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{CategoryId, ClubDetails};

    use super::*;

    fn user(email: &str) -> User {
        User::register(
            UserId::generate(),
            "tester",
            Email::parse(email).unwrap(),
            PasswordHash::new("plain:secret").unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn soft_deleted_users_are_invisible() {
        let repo = InMemoryUserRepository::new();
        let kept = repo.create(user("kept@knu.ac.kr")).await.unwrap();
        let gone = repo.create(user("gone@knu.ac.kr")).await.unwrap();
        repo.soft_delete(gone.id, Utc::now()).await.unwrap();

        assert!(repo.find_by_id(gone.id).await.unwrap().is_none());
        assert!(repo.find_by_email(&gone.email).await.unwrap().is_none());
        assert_eq!(repo.find_by_id(kept.id).await.unwrap(), Some(kept.clone()));

        let found = repo.find_by_ids(&[kept.id, gone.id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, kept.id);
        assert_eq!(repo.list(PageRequest::default()).await.unwrap().total_elements, 1);
        assert_eq!(
            repo.soft_delete(gone.id, Utc::now()).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn soft_deleted_slug_can_be_reused() {
        let repo = InMemoryClubRepository::new();
        let details = ClubDetails {
            name: "GDGoC".into(),
            summary: "Developer community".into(),
            ..ClubDetails::default()
        };
        let club = |details: ClubDetails| {
            Club::create(
                ClubId::generate(),
                "gdgoc",
                CategoryId::generate(),
                UserId::generate(),
                details,
                Utc::now(),
            )
            .unwrap()
        };

        let first = repo.create(club(details.clone())).await.unwrap();
        assert!(repo.exists_by_slug("gdgoc").await.unwrap());
        assert_eq!(
            repo.create(club(details.clone())).await,
            Err(RepositoryError::Conflict)
        );

        repo.soft_delete(first.id, Utc::now()).await.unwrap();
        assert!(!repo.exists_by_slug("gdgoc").await.unwrap());
        assert!(repo.find_by_id(first.id).await.unwrap().is_none());
        assert!(repo.create(club(details)).await.is_ok());
    }

    #[tokio::test]
    async fn like_toggle_counts_per_club() {
        let repo = InMemoryClubLikeRepository::new();
        let (user, club) = (UserId::generate(), ClubId::generate());

        assert!(repo.toggle(user, club, Utc::now()).await.unwrap());
        assert!(repo.exists(user, club).await.unwrap());
        assert_eq!(repo.count_by_club(club).await.unwrap(), 1);
        assert!(!repo.toggle(user, club, Utc::now()).await.unwrap());
        assert_eq!(repo.count_by_club(club).await.unwrap(), 0);
    }
}
