//! Scene loaders for multi-scene playback tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use storyreel_core::error::SequenceError;
use storyreel_core::services::{LoadedScene, SceneHandle, SceneLoader, SceneNode};
use storyreel_core::story::Chapter;

use crate::services::{CallLog, ServiceCall};

/// Serves scene content from memory, optionally after a simulated latency.
#[derive(Debug, Default)]
pub struct InMemorySceneLoader {
    scenes: HashMap<String, Vec<SceneNode>>,
    latency: Duration,
    log: CallLog,
}

impl InMemorySceneLoader {
    /// Creates an empty loader that records into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Registers raw scene content under `name`.
    #[must_use]
    pub fn with_scene(mut self, name: impl Into<String>, roots: Vec<SceneNode>) -> Self {
        self.scenes.insert(name.into(), roots);
        self
    }

    /// Registers `chapter` as the only content of `name`.
    #[must_use]
    pub fn with_chapter(self, name: impl Into<String>, chapter: Chapter) -> Self {
        let root = SceneNode {
            name: "story".to_owned(),
            chapter: Some(chapter),
            children: Vec::new(),
        };
        self.with_scene(name, vec![root])
    }

    /// Makes every load take `latency` of (virtual) time.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl SceneLoader for InMemorySceneLoader {
    async fn load_additive(&self, name: &str) -> Result<LoadedScene, SequenceError> {
        self.log.push(ServiceCall::LoadAdditive(name.to_owned()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let roots = self
            .scenes
            .get(name)
            .cloned()
            .ok_or_else(|| SequenceError::ResourceLoad {
                name: name.to_owned(),
                reason: "no such scene".to_owned(),
            })?;
        Ok(LoadedScene {
            handle: SceneHandle::new(name),
            roots,
        })
    }

    async fn unload(&self, handle: SceneHandle) -> Result<(), SequenceError> {
        self.log.push(ServiceCall::Unload(handle.name));
        Ok(())
    }

    async fn reclaim_unused_resources(&self) {
        self.log.push(ServiceCall::ReclaimUnusedResources);
    }

    fn change_scene(&self, name: &str) {
        self.log.push(ServiceCall::ChangeScene(name.to_owned()));
    }
}

/// A loader whose loads always fail.
#[derive(Debug, Default)]
pub struct FailingSceneLoader {
    log: CallLog,
}

impl FailingSceneLoader {
    /// Creates a failing loader that records into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl SceneLoader for FailingSceneLoader {
    async fn load_additive(&self, name: &str) -> Result<LoadedScene, SequenceError> {
        self.log.push(ServiceCall::LoadAdditive(name.to_owned()));
        Err(SequenceError::ResourceLoad {
            name: name.to_owned(),
            reason: "simulated load failure".to_owned(),
        })
    }

    async fn unload(&self, handle: SceneHandle) -> Result<(), SequenceError> {
        self.log.push(ServiceCall::Unload(handle.name));
        Ok(())
    }

    async fn reclaim_unused_resources(&self) {
        self.log.push(ServiceCall::ReclaimUnusedResources);
    }

    fn change_scene(&self, name: &str) {
        self.log.push(ServiceCall::ChangeScene(name.to_owned()));
    }
}
