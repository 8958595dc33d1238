//! Parsed story documents.

use std::path::Path;

use sha2::{Digest, Sha256};
use storyreel_core::registry::DispatchRegistry;
use storyreel_core::story::SceneGraph;

use crate::error::ContentError;
use crate::validation::validate;

/// Serialization format of a story document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.yaml` / `.yml`.
    Yaml,
    /// `.json`.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnsupportedFormat` for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ContentError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A scene graph together with the fingerprint of the text it came from.
#[derive(Debug, Clone)]
pub struct StoryDocument {
    /// The parsed graph.
    pub scene: SceneGraph,
    /// Hex SHA-256 of the source text; save data keyed on it can detect
    /// edits to the story.
    pub version_hash: String,
}

impl StoryDocument {
    /// Parses `source` in the given format.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Yaml` or `ContentError::Json` if the text does
    /// not describe a scene graph.
    pub fn parse(source: &str, format: DocumentFormat) -> Result<Self, ContentError> {
        let scene: SceneGraph = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(source)?,
            DocumentFormat::Json => serde_json::from_str(source)?,
        };
        tracing::debug!(
            scene = %scene.name,
            chapters = scene.chapters.len(),
            "parsed story document"
        );
        Ok(Self {
            scene,
            version_hash: version_hash(source),
        })
    }

    /// Runs load-time validation, consuming the document on success.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Invalid` with every issue found.
    pub fn validated(self, registry: Option<&DispatchRegistry>) -> Result<Self, ContentError> {
        validate(&self.scene, registry).map_err(ContentError::Invalid)?;
        Ok(self)
    }
}

fn version_hash(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut hex, byte| {
        use std::fmt::Write;
        // Writing to a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}
