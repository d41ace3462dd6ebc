use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const MISSING_FIELDS: &str = "You must provide all required fields.";

// --- Core Schemas (Mapped to the Store) ---

/// Article
///
/// The sole persisted entity, one row of the `articles` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    // Reference returned by the upload sink for the cover image.
    pub img_url: String,
    pub content: String,
    pub seo_keyword: String,
    // 0 = hidden, 1 = visible.
    pub status: i32,
    pub sort_order: i32,
    // View counter. Only ever moves up through the view endpoint.
    pub browse: i64,
    #[ts(type = "string | null")]
    pub updated: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
}

/// ArticleDefaults
///
/// Values applied to optional fields the creator leaves out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleDefaults {
    pub status: i32,
    pub sort_order: i32,
    pub browse: i64,
}

impl Default for ArticleDefaults {
    fn default() -> Self {
        Self {
            status: 1,
            sort_order: 1,
            browse: 0,
        }
    }
}

/// User
///
/// Identity record used by the auth extractor to resolve a token subject to a role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // 'admin' or 'member'.
    pub role: String,
}

// --- Input Schemas ---

/// ArticleDraft
///
/// Text fields of a create request as they arrive, before the cover image is stored.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub seo_keyword: Option<String>,
    pub status: Option<i32>,
    pub sort_order: Option<i32>,
    pub browse: Option<i64>,
}

impl ArticleDraft {
    /// Checks everything that can be checked before the upload happens.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            &self.title,
            &self.description,
            &self.content,
            &self.seo_keyword,
        ];
        if required
            .iter()
            .any(|field| field.as_deref().is_none_or(is_blank))
        {
            return Err(AppError::validation(MISSING_FIELDS));
        }
        validate_browse(self.browse)
    }

    /// Combines the draft with the stored image reference, filling defaults.
    pub fn into_new_article(self, img_url: String) -> NewArticle {
        let defaults = ArticleDefaults::default();
        NewArticle {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            img_url,
            content: self.content.unwrap_or_default(),
            seo_keyword: self.seo_keyword.unwrap_or_default(),
            status: self.status.unwrap_or(defaults.status),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
            browse: self.browse.unwrap_or(defaults.browse),
        }
    }
}

/// NewArticle
///
/// A complete article ready for insertion. The store assigns `id` and `created`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub img_url: String,
    pub content: String,
    pub seo_keyword: String,
    pub status: i32,
    pub sort_order: i32,
    pub browse: i64,
}

impl NewArticle {
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            &self.title,
            &self.description,
            &self.img_url,
            &self.content,
            &self.seo_keyword,
        ];
        if required.iter().any(|field| is_blank(field)) {
            return Err(AppError::validation(MISSING_FIELDS));
        }
        validate_browse(Some(self.browse))
    }

    /// Materializes the record the way every store persists it.
    pub fn into_article(self, id: Uuid, created: DateTime<Utc>) -> Article {
        Article {
            id,
            title: self.title,
            description: self.description,
            img_url: self.img_url,
            content: self.content,
            seo_keyword: self.seo_keyword,
            status: self.status,
            sort_order: self.sort_order,
            browse: self.browse,
            updated: None,
            created,
        }
    }
}

/// ArticleUpdate
///
/// Partial update payload. Only `Some` fields are written; `created` is immutable
/// and therefore absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ArticleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_keyword: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browse: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub updated: Option<DateTime<Utc>>,
}

impl ArticleUpdate {
    /// Supplied text fields may not be blanked out.
    pub fn validate(&self) -> AppResult<()> {
        let supplied = [
            &self.title,
            &self.description,
            &self.img_url,
            &self.content,
            &self.seo_keyword,
        ];
        if supplied
            .iter()
            .any(|field| field.as_deref().is_some_and(is_blank))
        {
            return Err(AppError::validation(MISSING_FIELDS));
        }
        validate_browse(self.browse)
    }

    /// Whether the update touches a field that must stay unique across articles.
    pub fn touches_unique_fields(&self) -> bool {
        self.title.is_some() || self.seo_keyword.is_some()
    }

    pub fn apply_to(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(description) = &self.description {
            article.description = description.clone();
        }
        if let Some(img_url) = &self.img_url {
            article.img_url = img_url.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(seo_keyword) = &self.seo_keyword {
            article.seo_keyword = seo_keyword.clone();
        }
        if let Some(status) = self.status {
            article.status = status;
        }
        if let Some(sort_order) = self.sort_order {
            article.sort_order = sort_order;
        }
        if let Some(browse) = self.browse {
            article.browse = browse;
        }
        if let Some(updated) = self.updated {
            article.updated = Some(updated);
        }
    }
}

/// UpdateArticleRequest
///
/// Body of `PUT /article/{id}`. The partial fields are nested under `article`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateArticleRequest {
    pub article: ArticleUpdate,
}

/// CreateArticleForm
///
/// OpenAPI description of the multipart body accepted by `POST /article/add`.
#[derive(Debug, ToSchema)]
pub struct CreateArticleForm {
    /// Cover image file.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    pub title: String,
    pub description: String,
    pub content: String,
    pub seo_keyword: String,
    pub status: Option<i32>,
    pub sort_order: Option<i32>,
    pub browse: Option<i64>,
}

// --- Output Schemas ---

/// DeleteResult
///
/// Outcome of a delete by identity. `deleted_count` is 0 when nothing matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteResult {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn removed(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleCreatedResponse {
    pub success: bool,
    pub message: String,
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleResponse {
    pub article: Article,
}

/// MessageResponse
///
/// Generic acknowledgement used by update and view-count endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleDeletedResponse {
    pub success: bool,
    pub message: String,
    pub article: DeleteResult,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_browse(browse: Option<i64>) -> AppResult<()> {
    match browse {
        Some(count) if count < 0 => Err(AppError::validation(
            "browse must be a non-negative integer.",
        )),
        _ => Ok(()),
    }
}
