use crate::{
    AppState,
    auth::AdminUser,
    error::{AppError, AppResult},
    models::{
        ArticleCreatedResponse, ArticleDeletedResponse, ArticleDraft, ArticleListResponse,
        ArticleResponse, CreateArticleForm, MessageResponse, UpdateArticleRequest,
    },
};
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequestParts, Multipart, Path, State, rejection::JsonRejection},
    http::request::Parts,
};
use std::str::FromStr;
use uuid::Uuid;

pub const MISSING_IMAGE: &str = "You must upload an image for the article.";
pub const DUPLICATE_ARTICLE: &str = "Title or SEO keyword is already in use.";

/// ArticleId
///
/// The `{id}` path segment as a UUID. A malformed id is answered through `AppError`
/// like every other bad request.
pub struct ArticleId(pub Uuid);

impl<S> FromRequestParts<S> for ArticleId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(ArticleId(id))
    }
}

/// CoverImage
///
/// The `image` part of a create request, held in memory until the text fields validate.
struct CoverImage {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// read_article_form
///
/// Drains the multipart body into a draft plus the optional cover image.
/// Numeric fields must parse as integers; empty numeric fields fall back to defaults.
/// An `image` part without a file name or content counts as no image.
async fn read_article_form(
    mut multipart: Multipart,
) -> AppResult<(ArticleDraft, Option<CoverImage>)> {
    let mut draft = ArticleDraft::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await?;
                if !file_name.is_empty() || !data.is_empty() {
                    image = Some(CoverImage {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            "title" => draft.title = Some(field.text().await?),
            "description" => draft.description = Some(field.text().await?),
            "content" => draft.content = Some(field.text().await?),
            "seo_keyword" => draft.seo_keyword = Some(field.text().await?),
            "status" => draft.status = parse_number(&name, &field.text().await?)?,
            "sort_order" => draft.sort_order = parse_number(&name, &field.text().await?)?,
            "browse" => draft.browse = parse_number(&name, &field.text().await?)?,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok((draft, image))
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> AppResult<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::validation(format!("{} must be an integer.", name)))
}

// --- Handlers ---

/// create_article
///
/// [Admin Route] Creates an article from a multipart form carrying the cover image.
///
/// Text fields are validated before anything touches the upload sink, so a rejected
/// request leaves neither a record nor a stray file behind.
#[utoipa::path(
    post,
    path = "/article/add",
    request_body(content = CreateArticleForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = ArticleCreatedResponse),
        (status = 400, description = "Missing field or processing error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ArticleCreatedResponse>> {
    let (draft, image) = read_article_form(multipart).await?;
    draft.validate()?;
    let image = image.ok_or_else(|| AppError::validation(MISSING_IMAGE))?;

    let upload = state
        .uploads
        .save(&image.file_name, image.content_type.as_deref(), image.data)
        .await?;

    let article = state
        .articles
        .create(draft.into_new_article(upload.path))
        .await?;

    tracing::info!(article_id = %article.id, admin_id = %admin.id, "article created");

    Ok(Json(ArticleCreatedResponse {
        success: true,
        message: "Article has been added successfully!".to_string(),
        article,
    }))
}

/// list_articles
///
/// [Public Route] Returns every article. No filtering, no pagination.
#[utoipa::path(
    get,
    path = "/article/list",
    responses((status = 200, description = "All articles", body = ArticleListResponse))
)]
pub async fn list_articles(State(state): State<AppState>) -> AppResult<Json<ArticleListResponse>> {
    let articles = state.articles.list().await?;
    Ok(Json(ArticleListResponse { articles }))
}

/// get_article
///
/// [Public Route] Fetches one article by id.
#[utoipa::path(
    get,
    path = "/article/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ArticleResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    ArticleId(id): ArticleId,
) -> AppResult<Json<ArticleResponse>> {
    let article = state
        .articles
        .get(id)
        .await?
        .ok_or_else(|| AppError::article_not_found(id))?;
    Ok(Json(ArticleResponse { article }))
}

/// update_article
///
/// [Admin Route] Applies the partial fields under `article` to an existing article.
///
/// A new title or SEO keyword is rejected when another article already uses it.
#[utoipa::path(
    put,
    path = "/article/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Duplicate title/SEO keyword or invalid field"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    ArticleId(id): ArticleId,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let update = payload.article;
    update.validate()?;

    if state.articles.get(id).await?.is_none() {
        return Err(AppError::article_not_found(id));
    }

    if update.touches_unique_fields() {
        let duplicate = state
            .articles
            .find_duplicate(id, update.title.as_deref(), update.seo_keyword.as_deref())
            .await?;
        if let Some(existing) = duplicate {
            tracing::info!(article_id = %id, conflicting_id = %existing.id, "update rejected as duplicate");
            return Err(AppError::Conflict(DUPLICATE_ARTICLE.to_string()));
        }
    }

    // The article can vanish between the existence check and the write.
    state
        .articles
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::article_not_found(id))?;

    tracing::info!(article_id = %id, admin_id = %admin.id, "article updated");

    Ok(Json(MessageResponse {
        success: true,
        message: "Article has been updated successfully!".to_string(),
    }))
}

/// increment_article_views
///
/// [Public Route] Counts one view of the article.
#[utoipa::path(
    put,
    path = "/article/view/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "View counted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn increment_article_views(
    State(state): State<AppState>,
    ArticleId(id): ArticleId,
) -> AppResult<Json<MessageResponse>> {
    let article = state
        .articles
        .increment_browse(id)
        .await?
        .ok_or_else(|| AppError::article_not_found(id))?;

    tracing::debug!(article_id = %id, browse = article.browse, "article viewed");

    Ok(Json(MessageResponse {
        success: true,
        message: "Article has been updated successfully!".to_string(),
    }))
}

/// delete_article
///
/// [Admin Route] Deletes an article by id.
///
/// Always answers 200; `article.deletedCount` tells whether anything was removed.
#[utoipa::path(
    delete,
    path = "/article/delete/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses((status = 200, description = "Delete result", body = ArticleDeletedResponse))
)]
pub async fn delete_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    ArticleId(id): ArticleId,
) -> AppResult<Json<ArticleDeletedResponse>> {
    let result = state.articles.delete(id).await?;

    tracing::info!(
        article_id = %id,
        admin_id = %admin.id,
        deleted = result.deleted_count,
        "article delete requested"
    );

    Ok(Json(ArticleDeletedResponse {
        success: true,
        message: "Article has been deleted successfully!".to_string(),
        article: result,
    }))
}
