//! Chapter scene resources stored as files next to the story document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storyreel_core::error::SequenceError;
use storyreel_core::registry::DispatchRegistry;
use storyreel_core::services::{LoadedScene, SceneHandle, SceneLoader, SceneNode};
use storyreel_core::story::Chapter;

use crate::document::DocumentFormat;
use crate::validation::validate_chapter;

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Resolves a chapter resource `name` to `<root>/<name>.yaml`, `.yml` or
/// `.json`, in that order, and parses it as a single chapter.
#[derive(Debug, Clone)]
pub struct DirectorySceneLoader {
    root: PathBuf,
    registry: Option<DispatchRegistry>,
}

impl DirectorySceneLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registry: None,
        }
    }

    /// Validates loaded chapters against `registry` as well.
    #[must_use]
    pub fn with_registry(mut self, registry: DispatchRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, name: &str) -> Result<(PathBuf, String), SequenceError> {
        let failed = |reason: String| SequenceError::ResourceLoad {
            name: name.to_owned(),
            reason,
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(failed("resource names must be plain file stems".to_owned()));
        }
        for extension in EXTENSIONS {
            let path = self.root.join(format!("{name}.{extension}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => return Ok((path, text)),
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => return Err(failed(format!("{}: {error}", path.display()))),
            }
        }
        Err(failed(format!(
            "no {name}.yaml, {name}.yml or {name}.json under {}",
            self.root.display()
        )))
    }

    fn parse(&self, name: &str, path: &Path, text: &str) -> Result<Chapter, SequenceError> {
        let failed = |reason: String| SequenceError::ResourceLoad {
            name: name.to_owned(),
            reason,
        };
        let format = DocumentFormat::from_path(path).map_err(|error| failed(error.to_string()))?;
        let chapter: Chapter = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| failed(e.to_string()))?,
            DocumentFormat::Json => serde_json::from_str(text).map_err(|e| failed(e.to_string()))?,
        };
        validate_chapter(&chapter, self.registry.as_ref()).map_err(|issues| {
            let first = issues.first().map(ToString::to_string).unwrap_or_default();
            failed(format!("{} validation issue(s); first: {first}", issues.len()))
        })?;
        Ok(chapter)
    }
}

#[async_trait]
impl SceneLoader for DirectorySceneLoader {
    async fn load_additive(&self, name: &str) -> Result<LoadedScene, SequenceError> {
        let (path, text) = self.read(name).await?;
        let chapter = self.parse(name, &path, &text)?;
        tracing::info!(resource = name, path = %path.display(), "loaded chapter resource");
        Ok(LoadedScene {
            handle: SceneHandle::new(name),
            roots: vec![SceneNode {
                name: name.to_owned(),
                chapter: Some(chapter),
                children: Vec::new(),
            }],
        })
    }

    async fn unload(&self, handle: SceneHandle) -> Result<(), SequenceError> {
        tracing::debug!(resource = %handle.name, id = %handle.id, "released chapter resource");
        Ok(())
    }

    async fn reclaim_unused_resources(&self) {}

    fn change_scene(&self, name: &str) {
        tracing::warn!(scene = name, "scene changes are not supported by file-backed resources");
    }
}
