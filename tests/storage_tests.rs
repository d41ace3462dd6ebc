use article_service::{
    AppError,
    storage::{LocalUploadSink, MockUploadSink, UploadSink},
};
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("article-uploads-{}", Uuid::new_v4()))
}

#[cfg(test)]
mod local_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_creates_the_directory() {
        let root = scratch_dir().join("nested/articles");

        let sink = LocalUploadSink::new(&root).await.unwrap();

        assert!(root.is_dir());
        assert_eq!(sink.root(), root.as_path());
        tokio::fs::remove_dir_all(scratch_root(&root)).await.ok();
    }

    #[tokio::test]
    async fn test_save_writes_timestamped_file() {
        let root = scratch_dir();
        let sink = LocalUploadSink::new(&root).await.unwrap();

        let stored = sink
            .save("cover.png", Some("image/png"), Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        let (prefix, name) = stored.file_name.split_once("--").unwrap();
        assert!(prefix.parse::<i64>().is_ok());
        assert_eq!(name, "cover.png");
        assert_eq!(Path::new(&stored.path), root.join(&stored.file_name));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"png-bytes");

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_same_name_uploads_do_not_overwrite() {
        let root = scratch_dir();
        let sink = LocalUploadSink::new(&root).await.unwrap();

        let first = sink
            .save("cover.png", None, Bytes::from_static(b"first"))
            .await
            .unwrap();
        let second = sink
            .save("cover.png", None, Bytes::from_static(b"second"))
            .await
            .unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(tokio::fs::read(&first.path).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(&second.path).await.unwrap(), b"second");

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_traversal_names_stay_inside_root() {
        let root = scratch_dir();
        let sink = LocalUploadSink::new(&root).await.unwrap();

        let stored = sink
            .save("../../etc/passwd", None, Bytes::from_static(b"nope"))
            .await
            .unwrap();

        assert!(!stored.path.contains(".."));
        assert_eq!(Path::new(&stored.path).parent(), Some(root.as_path()));

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    fn scratch_root(nested: &Path) -> PathBuf {
        nested.ancestors().nth(2).unwrap().to_path_buf()
    }
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_uploads() {
        let mock = MockUploadSink::new();

        let stored = mock
            .save("cover.png", Some("image/png"), Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(stored.path.starts_with("uploads/articles/"));
        assert!(stored.path.ends_with("--cover.png"));
        assert_eq!(mock.saved(), vec![stored]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockUploadSink::new_failing();

        let result = mock.save("cover.png", None, Bytes::new()).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(mock.saved().is_empty());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockUploadSink::new();

        let stored = mock
            .save("../../etc/passwd", None, Bytes::new())
            .await
            .unwrap();

        assert!(!stored.path.contains(".."));
        assert!(stored.file_name.ends_with("--passwd"));
    }
}
