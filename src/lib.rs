use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderName,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Route tables segregated by access level (Public, Admin).
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{
    ArticleRepositoryState, InMemoryRepository, PostgresRepository, UserRepositoryState,
};
pub use storage::{LocalUploadSink, MockUploadSink, UploadSinkState};

/// ApiDoc
///
/// OpenAPI document for the article API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_article, handlers::list_articles, handlers::get_article,
        handlers::update_article, handlers::increment_article_views, handlers::delete_article,
    ),
    components(
        schemas(
            models::Article, models::ArticleUpdate, models::UpdateArticleRequest,
            models::CreateArticleForm, models::DeleteResult, models::ArticleCreatedResponse,
            models::ArticleListResponse, models::ArticleResponse, models::MessageResponse,
            models::ArticleDeletedResponse,
        )
    ),
    tags(
        (name = "articles", description = "Article CRUD API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Single shared container for the services every request needs. Cheap to
/// clone: each service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Article store (Postgres or in-memory).
    pub articles: ArticleRepositoryState,
    /// Identity lookup for the auth extractors.
    pub users: UserRepositoryState,
    /// Cover image persistence.
    pub uploads: UploadSinkState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull single components out of AppState.

impl FromRef<AppState> for ArticleRepositoryState {
    fn from_ref(app_state: &AppState) -> ArticleRepositoryState {
        app_state.articles.clone()
    }
}

impl FromRef<AppState> for UserRepositoryState {
    fn from_ref(app_state: &AppState) -> UserRepositoryState {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for UploadSinkState {
    fn from_ref(app_state: &AppState) -> UploadSinkState {
        app_state.uploads.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, applies the body limit and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Public GET /{id} and admin PUT /{id} share a path; merge combines their method routers.
    let article_routes = Router::new()
        .merge(public::public_routes())
        .merge(admin::admin_routes());

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .nest("/article", article_routes)
        // Caps multipart uploads.
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line carries the request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
