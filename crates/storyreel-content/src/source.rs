//! Where story documents come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::document::{DocumentFormat, StoryDocument};
use crate::error::ContentError;

/// Supplies the story document a scene is played from.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Loads and parses the document.
    async fn load(&self) -> Result<StoryDocument, ContentError>;
}

/// Reads a YAML or JSON story from disk; the extension picks the format.
#[derive(Debug, Clone)]
pub struct FileStorySource {
    path: PathBuf,
}

impl FileStorySource {
    /// Creates a source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorySource for FileStorySource {
    async fn load(&self) -> Result<StoryDocument, ContentError> {
        let format = DocumentFormat::from_path(&self.path)?;
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ContentError::Io {
                path: self.path.clone(),
                source,
            })?;
        let document = StoryDocument::parse(&text, format)?;
        tracing::info!(
            path = %self.path.display(),
            version = %document.version_hash,
            "loaded story document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(file: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storyreel-{}-{file}", std::process::id()))
    }

    #[tokio::test]
    async fn test_load_reads_json_file() {
        // Arrange
        let path = scratch_path("manor.json");
        tokio::fs::write(&path, r#"{"name":"manor","chapters":[null]}"#)
            .await
            .unwrap();
        let source = FileStorySource::new(&path);

        // Act
        let document = source.load().await.unwrap();

        // Assert
        assert_eq!(document.scene.name, "manor");
        assert_eq!(document.scene.chapters.len(), 1);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_reports_missing_file_with_path() {
        let path = scratch_path("missing.yaml");
        let source = FileStorySource::new(&path);

        let result = source.load().await;

        match result {
            Err(ContentError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
