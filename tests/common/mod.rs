#![allow(dead_code)]

use article_service::{
    AppConfig, AppState, InMemoryRepository, MockUploadSink,
    auth::{ROLE_ADMIN, ROLE_MEMBER},
    models::{Article, NewArticle, User},
    repository::ArticleRepository,
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const ADMIN_ID: Uuid = Uuid::from_u128(456);
pub const MEMBER_ID: Uuid = Uuid::from_u128(123);
pub const BOUNDARY: &str = "article-test-boundary";

/// Handles onto the mocks behind an `AppState`, kept for assertions.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub uploads: MockUploadSink,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with(MockUploadSink::new(), AppConfig::default())
    }

    pub fn with(uploads: MockUploadSink, config: AppConfig) -> Self {
        let repo = Arc::new(InMemoryRepository::with_users(known_users()));
        let state = AppState {
            articles: repo.clone(),
            users: repo.clone(),
            uploads: Arc::new(uploads.clone()),
            config,
        };
        Self {
            state,
            repo,
            uploads,
        }
    }

    pub fn router(&self) -> Router {
        article_service::create_router(self.state.clone())
    }

    pub async fn seed(&self, title: &str, seo_keyword: &str) -> Article {
        self.repo
            .create(sample_article(title, seo_keyword))
            .await
            .expect("seeding the in-memory store")
    }
}

pub fn known_users() -> Vec<User> {
    vec![
        User {
            id: ADMIN_ID,
            email: "admin@test.com".to_string(),
            role: ROLE_ADMIN.to_string(),
        },
        User {
            id: MEMBER_ID,
            email: "member@test.com".to_string(),
            role: ROLE_MEMBER.to_string(),
        },
    ]
}

pub fn sample_article(title: &str, seo_keyword: &str) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        description: "A short description".to_string(),
        img_url: "uploads/articles/1700000000000--cover.png".to_string(),
        content: "Body text".to_string(),
        seo_keyword: seo_keyword.to_string(),
        status: 1,
        sort_order: 1,
        browse: 0,
    }
}

/// Encodes text fields plus an optional `image` file part as multipart/form-data.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn create_request(
    user: Option<Uuid>,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/article/add")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder
        .body(Body::from(multipart_body(fields, image)))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Drives one request through the router and decodes the JSON body
/// (`Value::Null` when the body is not JSON).
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
