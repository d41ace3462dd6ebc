use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Article, ArticleUpdate, DeleteResult, NewArticle, User},
};

/// Column list shared by every query returning full article rows.
const ARTICLE_COLUMNS: &str = "id, title, description, img_url, content, seo_keyword, \
                               status, sort_order, browse, updated, created";

/// ArticleRepository
///
/// Abstract contract for article persistence. Handlers talk to the store only
/// through this trait (`Arc<dyn ArticleRepository>`), so Postgres and the
/// in-memory store are interchangeable.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Validates and inserts a new article. The store assigns `id` and `created`.
    async fn create(&self, article: NewArticle) -> AppResult<Article>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Article>>;

    /// Every article, unfiltered, oldest first.
    async fn list(&self) -> AppResult<Vec<Article>>;

    /// Writes the supplied fields. `None` when no article has this id.
    async fn update(&self, id: Uuid, update: ArticleUpdate) -> AppResult<Option<Article>>;

    /// Adds one to `browse` in a single step. `None` when no article has this id.
    async fn increment_browse(&self, id: Uuid) -> AppResult<Option<Article>>;

    async fn delete(&self, id: Uuid) -> AppResult<DeleteResult>;

    /// Another article (not `exclude_id`) already using `title` or `seo_keyword`.
    async fn find_duplicate(
        &self,
        exclude_id: Uuid,
        title: Option<&str>,
        seo_keyword: Option<&str>,
    ) -> AppResult<Option<Article>>;
}

/// UserRepository
///
/// Identity lookup used by the auth extractor.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
}

pub type ArticleRepositoryState = Arc<dyn ArticleRepository>;
pub type UserRepositoryState = Arc<dyn UserRepository>;

/// PostgresRepository
///
/// `ArticleRepository` and `UserRepository` backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PostgresRepository {
    async fn create(&self, article: NewArticle) -> AppResult<Article> {
        article.validate()?;

        let sql = format!(
            "INSERT INTO articles (id, title, description, img_url, content, seo_keyword, \
                                   status, sort_order, browse, created) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ARTICLE_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Article>(&sql)
            .bind(Uuid::new_v4())
            .bind(article.title)
            .bind(article.description)
            .bind(article.img_url)
            .bind(article.content)
            .bind(article.seo_keyword)
            .bind(article.status)
            .bind(article.sort_order)
            .bind(article.browse)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> AppResult<Vec<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created ASC");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Uses `COALESCE` so that only the `Some` fields of `update` are written.
    async fn update(&self, id: Uuid, update: ArticleUpdate) -> AppResult<Option<Article>> {
        let sql = format!(
            "UPDATE articles \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 img_url = COALESCE($4, img_url), \
                 content = COALESCE($5, content), \
                 seo_keyword = COALESCE($6, seo_keyword), \
                 status = COALESCE($7, status), \
                 sort_order = COALESCE($8, sort_order), \
                 browse = COALESCE($9, browse), \
                 updated = COALESCE($10, updated) \
             WHERE id = $1 \
             RETURNING {ARTICLE_COLUMNS}"
        );

        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(update.title)
            .bind(update.description)
            .bind(update.img_url)
            .bind(update.content)
            .bind(update.seo_keyword)
            .bind(update.status)
            .bind(update.sort_order)
            .bind(update.browse)
            .bind(update.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn increment_browse(&self, id: Uuid) -> AppResult<Option<Article>> {
        let sql = format!(
            "UPDATE articles SET browse = browse + 1 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> AppResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::removed(result.rows_affected()))
    }

    async fn find_duplicate(
        &self,
        exclude_id: Uuid,
        title: Option<&str>,
        seo_keyword: Option<&str>,
    ) -> AppResult<Option<Article>> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE id <> $1 \
               AND (($2::text IS NOT NULL AND title = $2) \
                 OR ($3::text IS NOT NULL AND seo_keyword = $3)) \
             LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(exclude_id)
            .bind(title)
            .bind(seo_keyword)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

/// InMemoryRepository
///
/// Process-local store with the same semantics as `PostgresRepository`.
/// Backs the test suite and local runs without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    articles: RwLock<Vec<Article>>,
    users: RwLock<Vec<User>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of known users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            articles: RwLock::default(),
            users: RwLock::new(users.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryRepository {
    async fn create(&self, article: NewArticle) -> AppResult<Article> {
        article.validate()?;
        let created = article.into_article(Uuid::new_v4(), Utc::now());
        self.articles.write().await.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Article>> {
        Ok(self
            .articles
            .read()
            .await
            .iter()
            .find(|article| article.id == id)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Article>> {
        Ok(self.articles.read().await.clone())
    }

    async fn update(&self, id: Uuid, update: ArticleUpdate) -> AppResult<Option<Article>> {
        let mut articles = self.articles.write().await;
        Ok(articles
            .iter_mut()
            .find(|article| article.id == id)
            .map(|article| {
                update.apply_to(article);
                article.clone()
            }))
    }

    /// Fails with `AppError::BrowseOverflow` at `i64::MAX`, as the `BIGINT` column does.
    async fn increment_browse(&self, id: Uuid) -> AppResult<Option<Article>> {
        let mut articles = self.articles.write().await;
        let Some(article) = articles.iter_mut().find(|article| article.id == id) else {
            return Ok(None);
        };
        article.browse = article
            .browse
            .checked_add(1)
            .ok_or(AppError::BrowseOverflow(id))?;
        Ok(Some(article.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<DeleteResult> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|article| article.id != id);
        Ok(DeleteResult::removed((before - articles.len()) as u64))
    }

    async fn find_duplicate(
        &self,
        exclude_id: Uuid,
        title: Option<&str>,
        seo_keyword: Option<&str>,
    ) -> AppResult<Option<Article>> {
        Ok(self
            .articles
            .read()
            .await
            .iter()
            .filter(|article| article.id != exclude_id)
            .find(|article| {
                title.is_some_and(|t| article.title == t)
                    || seo_keyword.is_some_and(|k| article.seo_keyword == k)
            })
            .cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }
}
