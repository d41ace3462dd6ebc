use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Public Router Module
///
/// Unauthenticated article endpoints.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /article/list
        // Every article, unfiltered and unpaginated.
        .route("/list", get(handlers::list_articles))
        // GET /article/{id}
        .route("/{id}", get(handlers::get_article))
        // PUT /article/view/{id}
        // Bumps the browse counter by one.
        .route("/view/{id}", put(handlers::increment_article_views))
}
