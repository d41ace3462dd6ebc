use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::{fs, io::AsyncWriteExt};

use crate::error::{AppError, AppResult};

const MAX_NAME_ATTEMPTS: usize = 100;

/// StoredUpload
///
/// Reference to a persisted upload. `path` is what ends up in `Article::img_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub file_name: String,
    pub path: String,
}

// 1. UploadSink Contract
/// UploadSink
///
/// Narrow contract for persisting one uploaded cover image. Handlers only see
/// this trait, so the local-disk writer can be swapped for the in-memory mock
/// in tests.
#[async_trait]
pub trait UploadSink: Send + Sync {
    /// Persists `data` and returns a reference that is unique per call.
    ///
    /// # Arguments
    /// * `original_name`: The client-supplied file name. Sanitized before use.
    /// * `content_type`: The part's declared MIME type, if any.
    /// * `data`: The raw file bytes.
    async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<StoredUpload>;
}

// 2. The Real Implementation (local disk)
/// LocalUploadSink
///
/// Writes uploads into a single configured directory, naming each file
/// `<unix-millis>--<original name>`.
#[derive(Clone, Debug)]
pub struct LocalUploadSink {
    root: PathBuf,
}

impl LocalUploadSink {
    /// Creates the upload directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens a fresh file for `original_name`. Uploads arriving in the same
    /// millisecond under the same name get a `-<n>` suffix on the timestamp.
    async fn create_unique(&self, original_name: &str) -> AppResult<(String, PathBuf, fs::File)> {
        let first = timestamped_name(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = numbered_name(&first, attempt);
            let path = self.root.join(&file_name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((file_name, path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Storage(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for upload {:?}", first),
        )))
    }
}

#[async_trait]
impl UploadSink for LocalUploadSink {
    async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<StoredUpload> {
        let (file_name, path, mut file) = self.create_unique(original_name).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!(
            path = %path.display(),
            bytes = data.len(),
            content_type = content_type.unwrap_or("unknown"),
            "stored upload"
        );

        Ok(StoredUpload {
            file_name,
            path: path.to_string_lossy().into_owned(),
        })
    }
}

/// sanitize_file_name
///
/// Reduces a client-supplied name to its final path component so it cannot
/// escape the upload directory.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .unwrap_or("");

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// `<unix-millis>--<sanitized name>`, the name every sink stores uploads under.
fn timestamped_name(original_name: &str) -> String {
    format!(
        "{}--{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(original_name)
    )
}

/// Retry name for a same-millisecond collision: `<millis>-<n>--<name>`.
fn numbered_name(timestamped: &str, attempt: usize) -> String {
    match attempt {
        0 => timestamped.to_string(),
        n => timestamped.replacen("--", &format!("-{}--", n), 1),
    }
}

// 3. The Mock Implementation (For Tests)
/// MockUploadSink
///
/// Keeps uploads in memory and records the names it was asked to store.
#[derive(Clone, Default)]
pub struct MockUploadSink {
    /// When true, every save fails with a simulated I/O error.
    pub should_fail: bool,
    saved: Arc<Mutex<Vec<StoredUpload>>>,
}

impl MockUploadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Uploads stored so far, oldest first.
    pub fn saved(&self) -> Vec<StoredUpload> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UploadSink for MockUploadSink {
    async fn save(
        &self,
        original_name: &str,
        _content_type: Option<&str>,
        _data: Bytes,
    ) -> AppResult<StoredUpload> {
        if self.should_fail {
            return Err(AppError::Storage(io::Error::other(
                "Mock Upload Error: Simulation requested",
            )));
        }

        let file_name = timestamped_name(original_name);
        let upload = StoredUpload {
            path: format!("uploads/articles/{}", file_name),
            file_name,
        };
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(upload.clone());
        }
        Ok(upload)
    }
}

/// UploadSinkState
///
/// The concrete type used to share the upload sink across the application state.
pub type UploadSinkState = Arc<dyn UploadSink>;
