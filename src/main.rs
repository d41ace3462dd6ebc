use article_service::{
    AppState,
    auth::ROLE_ADMIN,
    config::{AppConfig, Env},
    create_router,
    models::User,
    repository::{
        ArticleRepositoryState, InMemoryRepository, PostgresRepository, UserRepositoryState,
    },
    storage::{LocalUploadSink, UploadSinkState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// main
///
/// Boots configuration, logging, the article store, the upload sink and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "article_service=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Article store
    let (articles, users): (ArticleRepositoryState, UserRepositoryState) = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to run database migrations.");

            let repo = Arc::new(PostgresRepository::new(pool));
            (repo.clone() as ArticleRepositoryState, repo as UserRepositoryState)
        }
        None => {
            // Local only: AppConfig::load insists on DATABASE_URL in production.
            let admin = User {
                id: Uuid::new_v4(),
                email: "admin@localhost".to_string(),
                role: ROLE_ADMIN.to_string(),
            };
            tracing::warn!(
                admin_id = %admin.id,
                "DATABASE_URL not set; using the in-memory article store. \
                 Send `x-user-id: <admin_id>` to call admin routes."
            );
            let repo = Arc::new(InMemoryRepository::with_users([admin]));
            (repo.clone() as ArticleRepositoryState, repo as UserRepositoryState)
        }
    };

    // 4. Upload sink
    let uploads = Arc::new(
        LocalUploadSink::new(&config.upload_dir)
            .await
            .expect("FATAL: Failed to create the upload directory. Check UPLOAD_DIR."),
    ) as UploadSinkState;

    tracing::info!(upload_dir = %config.upload_dir.display(), "upload sink ready");

    // 5. Unified state and router
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        articles,
        users,
        uploads,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
