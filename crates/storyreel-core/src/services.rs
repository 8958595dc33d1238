//! Collaborators the sequencer calls into.
//!
//! Every service is optional. A story event whose collaborator is absent is
//! logged and treated as done, so a partially wired host still plays through.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SequenceError;
use crate::geometry::{Quat, Vec3};
use crate::registry::DispatchRegistry;
use crate::story::{AudioChannel, Chapter};

/// Character animation playback.
pub trait AnimationService: Send + Sync {
    /// Plays `clip` on the actor registered as `actor`.
    fn play_animation(&self, actor: &str, clip: &str);
}

/// Dialogue, music and effects playback.
pub trait AudioService: Send + Sync {
    /// Plays `clip` on `channel`.
    fn play_audio(&self, clip: &str, channel: AudioChannel, looping: bool);

    /// Cross-fades the music bed to `clip`.
    fn change_background_music(&self, clip: &str);
}

/// Player rig placement and control.
pub trait PlayerService: Send + Sync {
    /// Moves the player to `position`, optionally facing `rotation`.
    fn teleport(&self, position: Vec3, rotation: Option<Quat>);

    /// Enables or disables locomotion and controller input.
    fn set_control_enabled(&self, enabled: bool);

    /// Places the player at the spawn point of the chapter at `index`.
    fn reposition_for_chapter(&self, index: usize);
}

/// Authored path movement.
pub trait MotionService: Send + Sync {
    /// Moves the player along `path`.
    fn play_path(&self, path: &str);

    /// Starts `target` moving along its own route.
    fn auto_move(&self, target: &str);
}

/// Full-screen fade used between chapters. The sequencer waits out the
/// duration itself.
pub trait ScreenFader: Send + Sync {
    /// Begins fading to black over `duration`.
    fn fade_out(&self, duration: Duration);

    /// Begins fading back in over `duration`.
    fn fade_in(&self, duration: Duration);
}

/// Identifies a scene resource loaded additively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneHandle {
    /// Loader-assigned identity.
    pub id: Uuid,
    /// The resource name that was loaded.
    pub name: String,
}

impl SceneHandle {
    /// Creates a handle with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A node in loaded scene content; may carry a chapter.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    /// Node name.
    pub name: String,
    /// Chapter attached to this node, if any.
    pub chapter: Option<Chapter>,
    /// Child nodes.
    pub children: Vec<SceneNode>,
}

/// Content returned by an additive load.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// Handle to pass back to `SceneLoader::unload`.
    pub handle: SceneHandle,
    /// Root nodes in load order.
    pub roots: Vec<SceneNode>,
}

impl LoadedScene {
    /// First chapter found by a depth-first walk over the root nodes.
    #[must_use]
    pub fn find_chapter(&self) -> Option<&Chapter> {
        let mut stack: Vec<&SceneNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if let Some(chapter) = &node.chapter {
                return Some(chapter);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// Loads and unloads external scene resources.
#[async_trait]
pub trait SceneLoader: Send + Sync {
    /// Loads `name` alongside the running content.
    ///
    /// The scene controller runs each load on its own task and always lets it
    /// finish: if playback stopped meanwhile, the result is handed straight
    /// back to `unload`.
    async fn load_additive(&self, name: &str) -> Result<LoadedScene, SequenceError>;

    /// Unloads content previously returned by `load_additive`.
    async fn unload(&self, handle: SceneHandle) -> Result<(), SequenceError>;

    /// Frees assets no longer referenced by any loaded content.
    async fn reclaim_unused_resources(&self);

    /// Replaces the running scene with `name`. Fire-and-forget.
    fn change_scene(&self, name: &str);
}

/// Collaborators injected into every controller.
#[derive(Clone, Default)]
pub struct Services {
    /// Character animation.
    pub animation: Option<Arc<dyn AnimationService>>,
    /// Audio playback.
    pub audio: Option<Arc<dyn AudioService>>,
    /// Player rig.
    pub player: Option<Arc<dyn PlayerService>>,
    /// Path movement.
    pub motion: Option<Arc<dyn MotionService>>,
    /// Chapter transition fades.
    pub fader: Option<Arc<dyn ScreenFader>>,
    /// External scene resources.
    pub scenes: Option<Arc<dyn SceneLoader>>,
    /// Named hooks and methods.
    pub registry: DispatchRegistry,
}

impl Services {
    /// Creates a context with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the animation collaborator.
    #[must_use]
    pub fn with_animation(mut self, service: Arc<dyn AnimationService>) -> Self {
        self.animation = Some(service);
        self
    }

    /// Sets the audio collaborator.
    #[must_use]
    pub fn with_audio(mut self, service: Arc<dyn AudioService>) -> Self {
        self.audio = Some(service);
        self
    }

    /// Sets the player collaborator.
    #[must_use]
    pub fn with_player(mut self, service: Arc<dyn PlayerService>) -> Self {
        self.player = Some(service);
        self
    }

    /// Sets the motion collaborator.
    #[must_use]
    pub fn with_motion(mut self, service: Arc<dyn MotionService>) -> Self {
        self.motion = Some(service);
        self
    }

    /// Sets the fade collaborator.
    #[must_use]
    pub fn with_fader(mut self, service: Arc<dyn ScreenFader>) -> Self {
        self.fader = Some(service);
        self
    }

    /// Sets the scene loader.
    #[must_use]
    pub fn with_scenes(mut self, service: Arc<dyn SceneLoader>) -> Self {
        self.scenes = Some(service);
        self
    }

    /// Sets the dispatch registry.
    #[must_use]
    pub fn with_registry(mut self, registry: DispatchRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("animation", &self.animation.is_some())
            .field("audio", &self.audio.is_some())
            .field("player", &self.player.is_some())
            .field("motion", &self.motion.is_some())
            .field("fader", &self.fader.is_some())
            .field("scenes", &self.scenes.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, chapter: Option<&str>, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            name: name.to_owned(),
            chapter: chapter.map(|n| Chapter::new(n, Vec::new())),
            children,
        }
    }

    #[test]
    fn test_find_chapter_walks_depth_first() {
        // Arrange: the nested chapter under the first root is found before the
        // chapter on the second root.
        let loaded = LoadedScene {
            handle: SceneHandle::new("chapter_two"),
            roots: vec![
                node(
                    "lighting",
                    None,
                    vec![node("rig", None, vec![node("story", Some("deep"), vec![])])],
                ),
                node("story_root", Some("shallow"), vec![]),
            ],
        };

        // Act
        let found = loaded.find_chapter();

        // Assert
        assert_eq!(found.map(|c| c.name.as_str()), Some("deep"));
    }

    #[test]
    fn test_find_chapter_returns_none_for_empty_content() {
        let loaded = LoadedScene {
            handle: SceneHandle::new("empty"),
            roots: vec![node("camera", None, vec![])],
        };

        assert!(loaded.find_chapter().is_none());
    }
}
