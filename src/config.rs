use std::{env, path::PathBuf};

/// Fallback signing secret for local development and tests.
pub const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the service's entire configuration state. Loaded once at startup and
/// shared immutably through `AppState` (pulled into extractors via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the dev auth bypass and log format.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Secret used to validate incoming HS256 JWTs.
    pub jwt_secret: String,
    // Directory cover images are written to.
    pub upload_dir: PathBuf,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Upper bound for request bodies, which caps multipart uploads.
    pub max_upload_bytes: usize,
}

/// Env
///
/// Runtime context switch between local development conveniences and
/// hardened production behaviour.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            upload_dir: PathBuf::from("uploads/articles"),
            bind_addr: "0.0.0.0:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `DATABASE_URL` or `JWT_SECRET` is
    /// missing, and on a `MAX_UPLOAD_BYTES` that is not a number. The service
    /// must not start half-configured.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            ),
        };

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: MAX_UPLOAD_BYTES must be a positive integer"),
            Err(_) => defaults.max_upload_bytes,
        };

        Self {
            env,
            db_url,
            jwt_secret,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_upload_bytes,
        }
    }
}
