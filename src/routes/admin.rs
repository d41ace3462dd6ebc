use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Admin Router Module
///
/// Article management endpoints. There is no router-level guard: every handler
/// takes the `AdminUser` extractor, which answers 401 without a valid identity
/// and 403 for non-admin roles before the handler body runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /article/add
        // Multipart form: `image` file plus the article's text fields.
        .route("/add", post(handlers::create_article))
        // PUT /article/{id}
        // Partial update, body `{ "article": { ... } }`.
        .route("/{id}", put(handlers::update_article))
        // DELETE /article/delete/{id}
        .route("/delete/{id}", delete(handlers::delete_article))
}
