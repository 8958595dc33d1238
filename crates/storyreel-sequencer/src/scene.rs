//! The top of the hierarchy: chapters played back to back with fades between
//! them, either inline or loaded from external scene resources.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storyreel_core::error::SequenceError;
use storyreel_core::level::Level;
use storyreel_core::services::{SceneHandle, SceneLoader};
use storyreel_core::signal::SignalKind;
use storyreel_core::story::{Chapter, ChapterRef, SceneGraph};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::chapter::ChapterController;
use crate::config::PlaybackConfig;
use crate::context::PlaybackContext;
use crate::cut::CutController;
use crate::playback::{Playback, until_idle};
use crate::sequence::{Cursor, Playable};
use crate::status::{NodeRef, PlaybackSnapshot, PlaybackStatus};

#[derive(Debug, Clone)]
enum ChapterSlot {
    Inline(ChapterController),
    Resource(String),
}

#[derive(Debug, Default)]
struct SceneState {
    index: usize,
    active: Option<ChapterController>,
    loaded: Option<SceneHandle>,
    transitioning: bool,
    screen_visible: bool,
}

#[derive(Debug)]
struct SceneInner {
    name: String,
    external: bool,
    slots: Vec<Option<ChapterSlot>>,
    config: PlaybackConfig,
    context: PlaybackContext,
    playback: Playback,
    state: Mutex<SceneState>,
}

/// Plays a scene's chapters in order.
///
/// Before each chapter the scene fades out (except before the first chapter
/// it shows), repositions the player, loads the chapter's scene resource when
/// the scene uses external resources, and fades back in. A chapter that cannot
/// be produced is logged and skipped.
#[derive(Debug, Clone)]
pub struct SceneController {
    inner: Arc<SceneInner>,
}

impl SceneController {
    #[must_use]
    pub fn new(scene: SceneGraph, config: PlaybackConfig, context: PlaybackContext) -> Self {
        let slots = scene
            .chapters
            .into_iter()
            .map(|slot| {
                slot.map(|chapter| match chapter {
                    ChapterRef::Inline(chapter) => {
                        ChapterSlot::Inline(ChapterController::new(chapter, &context))
                    }
                    ChapterRef::Resource { resource } => ChapterSlot::Resource(resource),
                })
            })
            .collect();
        Self {
            inner: Arc::new(SceneInner {
                name: scene.name,
                external: scene.use_external_chapter_resources,
                slots,
                config,
                context,
                playback: Playback::new(),
                state: Mutex::new(SceneState::default()),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn config(&self) -> PlaybackConfig {
        self.inner.config
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.inner.slots.len()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.inner.playback.is_playing()
    }

    #[must_use]
    pub fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.inner.playback.subscribe()
    }

    /// Resolves once the scene completes or is stopped.
    pub async fn wait_idle(&self) {
        until_idle(self.subscribe_playing()).await;
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor {
            index: self.inner.state().index,
            is_playing: self.is_playing(),
        }
    }

    /// The chapter currently playing, once its transition has finished.
    #[must_use]
    pub fn current_chapter(&self) -> Option<ChapterController> {
        self.inner.state().active.clone()
    }

    pub fn start(&self) {
        self.start_at(0);
    }

    /// Plays from chapter `index`, stopping any current run first. An index
    /// out of range is logged and changes nothing.
    pub fn start_from(&self, index: usize) {
        let len = self.inner.slots.len();
        if index >= len {
            let error = SequenceError::InvalidIndex {
                level: Level::Scene,
                owner: self.inner.name.clone(),
                index,
                len,
            };
            tracing::error!(%error, "start index rejected");
            return;
        }
        self.stop();
        self.start_at(index);
    }

    pub fn restart(&self) {
        self.stop();
        self.start();
    }

    /// Stops everything below the scene and announces the stop. A chapter
    /// scene that was loaded is unloaded in the background.
    pub fn stop(&self) {
        let inner = &self.inner;
        if !inner.playback.halt() {
            return;
        }
        let state = std::mem::take(&mut *inner.state());
        if let Some(chapter) = state.active {
            chapter.stop();
        }
        if let Some(handle) = state.loaded {
            inner.unload_detached(handle);
        }
        tracing::info!(scene = %inner.name, index = state.index, "scene stopped");
        inner.context.signals.emit(SignalKind::SceneStopped {
            scene: inner.name.clone(),
        });
    }

    /// Abandons the current chapter. Ignored on the last chapter and while
    /// a transition is running.
    pub fn skip_to_next_chapter(&self) {
        if !self.is_playing() {
            return;
        }
        let (index, active) = {
            let state = self.inner.state();
            (state.index, state.active.clone())
        };
        if index + 1 >= self.inner.slots.len() {
            tracing::debug!(scene = %self.inner.name, index, "no next chapter to skip to");
            return;
        }
        match active {
            Some(chapter) => {
                tracing::debug!(scene = %self.inner.name, index, "skipping to next chapter");
                chapter.stop();
            }
            None => tracing::debug!(scene = %self.inner.name, "skip ignored during transition"),
        }
    }

    /// Forwards to the active cut's `skip_current_wait`.
    pub fn skip_current_wait(&self) {
        match self.active_cut() {
            Some(cut) => cut.skip_current_wait(),
            None => tracing::debug!(scene = %self.inner.name, "no active cut to skip"),
        }
    }

    /// Forwards to the active cut's `player_input`.
    pub fn player_input(&self) {
        if let Some(cut) = self.active_cut() {
            cut.player_input();
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let is_playing = self.is_playing();
        let (index, active, transitioning) = {
            let state = self.inner.state();
            (state.index, state.active.clone(), state.transitioning)
        };
        let act = active
            .as_ref()
            .and_then(|chapter| chapter.current_act().map(|act| (chapter.cursor().index, act)));
        let cut = act
            .as_ref()
            .and_then(|(_, act)| act.current_cut().map(|cut| (act.cursor().index, cut)));
        let status = match (&cut, is_playing, transitioning) {
            (_, false, _) => PlaybackStatus::Idle,
            (_, true, true) => PlaybackStatus::Transitioning,
            (Some((_, cut)), true, false) => cut.status(),
            (None, true, false) => PlaybackStatus::Running,
        };
        PlaybackSnapshot {
            scene: self.inner.name.clone(),
            is_playing,
            chapter: active.as_ref().map(|chapter| NodeRef {
                index,
                name: chapter.chapter().name.clone(),
            }),
            act: act.as_ref().map(|(index, act)| NodeRef {
                index: *index,
                name: act.act().name.clone(),
            }),
            event: cut.as_ref().and_then(|(_, cut)| cut.current_event()),
            cut: cut.map(|(index, cut)| NodeRef {
                index,
                name: cut.cut().name.clone(),
            }),
            status,
        }
    }

    fn active_cut(&self) -> Option<CutController> {
        self.current_chapter()?.current_act()?.current_cut()
    }

    fn start_at(&self, index: usize) {
        let inner = &self.inner;
        if inner.slots.is_empty() {
            let error = SequenceError::Empty {
                level: Level::Scene,
                owner: inner.name.clone(),
            };
            tracing::error!(%error, "refusing to start");
            return;
        }
        let Some(generation) = inner.playback.begin() else {
            let error = SequenceError::AlreadyPlaying {
                level: Level::Scene,
                owner: inner.name.clone(),
            };
            tracing::warn!(%error, "start request ignored");
            return;
        };
        *inner.state() = SceneState {
            index,
            ..SceneState::default()
        };
        tracing::info!(
            scene = %inner.name,
            index,
            external = inner.external,
            "scene started"
        );
        inner.context.signals.emit(SignalKind::SceneStarted {
            scene: inner.name.clone(),
        });
        let task = Arc::clone(inner);
        inner.playback.spawn(generation, task.run(generation));
    }
}

impl SceneInner {
    fn state(&self) -> MutexGuard<'_, SceneState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, generation: u64) {
        loop {
            if !self.playback.is_current(generation) {
                return;
            }
            let index = self.state().index;
            let Some(slot) = self.slots.get(index) else {
                break;
            };
            if let Some(chapter) = self.prepare(generation, index, slot.as_ref()).await {
                {
                    let mut state = self.state();
                    state.active = Some(chapter.clone());
                    state.transitioning = false;
                }
                chapter.start();
                until_idle(chapter.subscribe_playing()).await;
                if !self.playback.is_current(generation) {
                    return;
                }
                {
                    let mut state = self.state();
                    state.active = None;
                    state.transitioning = true;
                }
                self.release_loaded().await;
            }
            if !self.playback.is_current(generation) {
                return;
            }
            self.state().index = index + 1;
        }
        *self.state() = SceneState::default();
        if self.playback.finish(generation) {
            tracing::info!(scene = %self.name, "scene completed");
            self.context.signals.emit(SignalKind::SceneCompleted {
                scene: self.name.clone(),
            });
        }
    }

    /// Runs the transition into chapter `index` and returns the chapter to
    /// play, or `None` if it has to be skipped.
    async fn prepare(
        self: &Arc<Self>,
        generation: u64,
        index: usize,
        slot: Option<&ChapterSlot>,
    ) -> Option<ChapterController> {
        let slot = self.usable_slot(index, slot)?;
        self.state().transitioning = true;

        if self.state().screen_visible {
            self.fade_out().await;
            if !self.playback.is_current(generation) {
                return None;
            }
        }
        match self.context.services.player.as_deref() {
            Some(player) => player.reposition_for_chapter(index),
            None => tracing::debug!(scene = %self.name, index, "no player service to reposition"),
        }

        let chapter = match slot {
            ChapterSlot::Inline(chapter) => chapter.clone(),
            ChapterSlot::Resource(resource) => self.load_chapter(generation, resource).await?,
        };
        if !self.playback.is_current(generation) {
            return None;
        }

        self.fade_in().await;
        if !self.playback.is_current(generation) {
            return None;
        }
        tracing::info!(
            scene = %self.name,
            index,
            chapter = %chapter.chapter().name,
            "starting chapter"
        );
        Some(chapter)
    }

    /// Rejects empty slots and slots that do not match the scene's mode.
    fn usable_slot<'s>(
        &self,
        index: usize,
        slot: Option<&'s ChapterSlot>,
    ) -> Option<&'s ChapterSlot> {
        match (slot, self.external) {
            (None, _) => {
                let error = SequenceError::MissingChild {
                    level: Level::Scene,
                    owner: self.name.clone(),
                    child: Level::Chapter,
                    index,
                };
                tracing::error!(%error, "skipping empty chapter slot");
                None
            }
            (Some(ChapterSlot::Resource(resource)), false) => {
                let error = SequenceError::ResourceLoad {
                    name: resource.clone(),
                    reason: "scene does not use external chapter resources".to_owned(),
                };
                tracing::error!(%error, index, "skipping chapter");
                None
            }
            (Some(ChapterSlot::Inline(chapter)), true) => {
                tracing::error!(
                    scene = %self.name,
                    index,
                    chapter = %chapter.chapter().name,
                    "inline chapter in a scene that loads chapters externally; skipping"
                );
                None
            }
            (Some(slot), _) => Some(slot),
        }
    }

    /// Loads `resource` on its own task. A stop while the load is pending
    /// does not cancel it; the finished load is unloaded instead.
    async fn load_chapter(
        self: &Arc<Self>,
        generation: u64,
        resource: &str,
    ) -> Option<ChapterController> {
        let Some(scenes) = self.context.services.scenes.clone() else {
            let error = SequenceError::CollaboratorMissing("scenes");
            tracing::error!(%error, resource, "cannot load chapter scene");
            return None;
        };
        tracing::info!(scene = %self.name, resource, "loading chapter scene");
        let inner = Arc::clone(self);
        let name = resource.to_owned();
        let load =
            tokio::spawn(async move { inner.complete_load(generation, scenes, name).await });
        match load.await {
            Ok(chapter) => chapter.map(|chapter| ChapterController::new(chapter, &self.context)),
            Err(error) => {
                tracing::error!(%error, resource, "chapter scene load panicked; skipping chapter");
                None
            }
        }
    }

    async fn complete_load(
        &self,
        generation: u64,
        scenes: Arc<dyn SceneLoader>,
        resource: String,
    ) -> Option<Chapter> {
        let loaded = match scenes.load_additive(&resource).await {
            Ok(loaded) => loaded,
            Err(error) => {
                tracing::error!(%error, %resource, "chapter scene failed to load; skipping chapter");
                return None;
            }
        };
        let Some(chapter) = loaded.find_chapter().cloned() else {
            let error = SequenceError::ChapterNotFound(resource);
            tracing::error!(%error, "skipping chapter");
            unload_and_reclaim(scenes.as_ref(), loaded.handle).await;
            return None;
        };
        {
            // `stop` halts before it takes the state, so under this lock either
            // the run is still current or the stop has already happened.
            let mut state = self.state();
            if self.playback.is_current(generation) {
                state.loaded = Some(loaded.handle);
                return Some(chapter);
            }
        }
        tracing::info!(%resource, "scene stopped while loading; unloading chapter scene");
        unload_and_reclaim(scenes.as_ref(), loaded.handle).await;
        None
    }

    async fn release_loaded(&self) {
        let handle = self.state().loaded.take();
        if let (Some(handle), Some(scenes)) = (handle, self.context.services.scenes.clone()) {
            unload_and_reclaim(scenes.as_ref(), handle).await;
        }
    }

    fn unload_detached(&self, handle: SceneHandle) {
        let Some(scenes) = self.context.services.scenes.clone() else {
            return;
        };
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { unload_and_reclaim(scenes.as_ref(), handle).await });
            }
            Err(_) => tracing::warn!(
                resource = %handle.name,
                "no runtime to unload chapter scene; left loaded"
            ),
        }
    }

    async fn fade_out(&self) {
        let duration = self.config.fade_out;
        if let Some(fader) = self.context.services.fader.as_deref() {
            fader.fade_out(duration);
        }
        tokio::time::sleep(duration).await;
        self.state().screen_visible = false;
    }

    async fn fade_in(&self) {
        let duration = self.config.fade_in;
        if let Some(fader) = self.context.services.fader.as_deref() {
            fader.fade_in(duration);
        }
        tokio::time::sleep(duration).await;
        self.state().screen_visible = true;
    }
}

async fn unload_and_reclaim(scenes: &dyn SceneLoader, handle: SceneHandle) {
    let resource = handle.name.clone();
    match scenes.unload(handle).await {
        Ok(()) => tracing::debug!(%resource, "chapter scene unloaded"),
        Err(error) => tracing::error!(%error, %resource, "chapter scene failed to unload"),
    }
    scenes.reclaim_unused_resources().await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use storyreel_core::registry::DispatchRegistry;
    use storyreel_core::services::SceneNode;
    use storyreel_core::story::{Act, Chapter, Cut, CutEvent, CutEventKind};
    use storyreel_test_support::{FailingSceneLoader, InMemorySceneLoader, ServiceCall};
    use tokio::time::Instant;

    use super::*;
    use crate::testing::{Harness, settle};
    use crate::wait::InputGate;

    const HALF: Duration = Duration::from_millis(500);

    fn moving_cut(name: &str, secs: f32) -> Cut {
        Cut::new(name, secs).with_start_event(CutEvent::new(
            name,
            CutEventKind::AutoMove {
                target: Some(name.to_owned()),
            },
        ))
    }

    fn chapter(name: &str, cuts: Vec<Cut>) -> Chapter {
        Chapter::new(name, vec![Act::new(format!("{name}-act"), cuts)])
    }

    fn inline_scene(chapters: Vec<Option<Chapter>>) -> SceneGraph {
        SceneGraph {
            name: "manor".to_owned(),
            chapters: chapters
                .into_iter()
                .map(|slot| slot.map(ChapterRef::Inline))
                .collect(),
            ..SceneGraph::default()
        }
    }

    fn external_scene(resources: &[&str]) -> SceneGraph {
        SceneGraph {
            name: "estate".to_owned(),
            use_external_chapter_resources: true,
            chapters: resources
                .iter()
                .map(|name| {
                    Some(ChapterRef::Resource {
                        resource: (*name).to_owned(),
                    })
                })
                .collect(),
            ..SceneGraph::default()
        }
    }

    fn scene_of(harness: &Harness, graph: SceneGraph) -> SceneController {
        SceneController::new(graph, PlaybackConfig::default(), harness.context.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_chapter_scene_plays_end_to_end() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![Some(chapter(
            "arrival",
            vec![moving_cut("a", 1.0), Cut::new("b", 0.0)],
        ))]);
        let scene = scene_of(&harness, graph);
        let started = Instant::now();

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(started.elapsed(), HALF + Duration::from_secs(1));
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("a".to_owned()),
            ]
        );
        assert_eq!(
            harness.signals.types(),
            vec![
                "scene.started",
                "chapter.started",
                "act.started",
                "act.save_point_reached",
                "cut.started",
                "cut.completed",
                "cut.started",
                "cut.completed",
                "act.completed",
                "chapter.completed",
                "scene.completed",
            ]
        );
        assert_eq!(scene.snapshot().status, PlaybackStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_runs_between_chapters_only() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![
            Some(chapter("one", vec![moving_cut("a", 0.0)])),
            None,
            Some(chapter("two", vec![moving_cut("b", 0.0)])),
        ]);
        let scene = scene_of(&harness, graph);

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("a".to_owned()),
                ServiceCall::FadeOut(HALF),
                ServiceCall::RepositionForChapter(2),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("b".to_owned()),
            ]
        );
        assert_eq!(harness.signals.types().last(), Some(&"scene.completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_chapters_load_run_and_unload_in_order() {
        // Arrange
        let harness = Harness::with(|services, recorder| {
            let loader = InMemorySceneLoader::new(recorder.log().clone())
                .with_chapter("cellar", chapter("cellar", vec![moving_cut("a", 0.0)]))
                .with_scene(
                    "attic",
                    vec![SceneNode {
                        name: "lights".to_owned(),
                        chapter: None,
                        children: vec![SceneNode {
                            name: "story".to_owned(),
                            chapter: Some(chapter("attic", vec![moving_cut("b", 0.0)])),
                            children: Vec::new(),
                        }],
                    }],
                )
                .with_latency(Duration::from_secs(2));
            services.with_scenes(Arc::new(loader))
        });
        let scene = scene_of(&harness, external_scene(&["cellar", "attic"]));

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::LoadAdditive("cellar".to_owned()),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("a".to_owned()),
                ServiceCall::Unload("cellar".to_owned()),
                ServiceCall::ReclaimUnusedResources,
                ServiceCall::FadeOut(HALF),
                ServiceCall::RepositionForChapter(1),
                ServiceCall::LoadAdditive("attic".to_owned()),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("b".to_owned()),
                ServiceCall::Unload("attic".to_owned()),
                ServiceCall::ReclaimUnusedResources,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_loads_skip_chapters_and_scene_completes() {
        // Arrange
        let harness = Harness::with(|services, recorder| {
            services.with_scenes(Arc::new(FailingSceneLoader::new(recorder.log().clone())))
        });
        let scene = scene_of(&harness, external_scene(&["cellar", "attic"]));

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::LoadAdditive("cellar".to_owned()),
                ServiceCall::RepositionForChapter(1),
                ServiceCall::LoadAdditive("attic".to_owned()),
            ]
        );
        assert_eq!(harness.signals.types(), vec!["scene.started", "scene.completed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_content_without_chapter_is_unloaded_and_skipped() {
        // Arrange
        let harness = Harness::with(|services, recorder| {
            let loader = InMemorySceneLoader::new(recorder.log().clone())
                .with_scene("empty", vec![SceneNode::default()]);
            services.with_scenes(Arc::new(loader))
        });
        let scene = scene_of(&harness, external_scene(&["empty"]));

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::LoadAdditive("empty".to_owned()),
                ServiceCall::Unload("empty".to_owned()),
                ServiceCall::ReclaimUnusedResources,
            ]
        );
        assert_eq!(harness.signals.types(), vec!["scene.started", "scene.completed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_chapter_stops_every_level_and_unloads() {
        // Arrange
        let harness = Harness::with(|services, recorder| {
            let loader = InMemorySceneLoader::new(recorder.log().clone())
                .with_chapter("cellar", chapter("cellar", vec![moving_cut("long", 60.0)]));
            services.with_scenes(Arc::new(loader))
        });
        let scene = scene_of(&harness, external_scene(&["cellar", "attic"]));
        scene.start();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let chapter = scene.current_chapter().unwrap();
        let act = chapter.current_act().unwrap();
        let cut = act.current_cut().unwrap();

        // Act
        scene.stop();
        settle().await;

        // Assert
        assert!(!scene.is_playing());
        assert!(!chapter.is_playing());
        assert!(!act.is_playing());
        assert!(!cut.is_playing());
        assert_eq!(harness.signals.types().last(), Some(&"scene.stopped"));
        assert_eq!(
            harness
                .recorder
                .log()
                .count(|call| *call == ServiceCall::Unload("cellar".to_owned())),
            1
        );
        assert_eq!(scene.snapshot().chapter, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_to_next_chapter_never_overlaps_chapters() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![
            Some(chapter("one", vec![moving_cut("a", 30.0)])),
            Some(chapter("two", vec![moving_cut("b", 30.0)])),
        ]);
        let scene = scene_of(&harness, graph);
        scene.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let first = scene.current_chapter().unwrap();

        // Act
        scene.skip_to_next_chapter();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Assert
        let second = scene.current_chapter().unwrap();
        assert!(!first.is_playing());
        assert!(second.is_playing());
        assert_eq!(second.chapter().name, "two");
        assert_eq!(scene.cursor().index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_and_input_routing_reach_active_cut() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![Some(chapter(
            "letter",
            vec![Cut::new("read", 0.0).with_gates(false, true)],
        ))]);
        let scene = scene_of(&harness, graph);
        scene.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Act
        let held = scene.snapshot();
        scene.player_input();
        scene.wait_idle().await;

        // Assert
        assert_eq!(held.status, PlaybackStatus::WaitingInput(InputGate::End));
        assert_eq!(
            held.chapter,
            Some(NodeRef {
                index: 0,
                name: "letter".to_owned(),
            })
        );
        assert_eq!(held.act.map(|a| a.name), Some("letter-act".to_owned()));
        assert_eq!(held.cut.map(|c| c.name), Some("read".to_owned()));
        assert_eq!(harness.signals.types().last(), Some(&"scene.completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_transition_during_fade() {
        let harness = Harness::new();
        let scene = scene_of(
            &harness,
            inline_scene(vec![Some(chapter("one", vec![Cut::new("c", 0.0)]))]),
        );

        scene.start();
        settle().await;

        assert_eq!(scene.snapshot().status, PlaybackStatus::Transitioning);
        assert!(scene.current_chapter().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scene_skip_current_wait_shortens_cut() {
        // Arrange
        let harness = Harness::new();
        let scene = scene_of(
            &harness,
            inline_scene(vec![Some(chapter("one", vec![Cut::new("hold", 10.0)]))]),
        );
        let started = Instant::now();
        scene.start();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Act
        scene.skip_current_wait();
        scene.wait_idle().await;

        // Assert
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_from_skips_earlier_chapters_and_rejects_bad_index() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![
            Some(chapter("one", vec![moving_cut("a", 0.0)])),
            Some(chapter("two", vec![moving_cut("b", 0.0)])),
        ]);
        let scene = scene_of(&harness, graph);

        // Act
        scene.start_from(9);
        let rejected = scene.is_playing();
        scene.start_from(1);
        scene.wait_idle().await;

        // Assert
        assert!(!rejected);
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(1),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("b".to_owned()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_announces_stop_then_plays_again() {
        let harness = Harness::new();
        let scene = scene_of(
            &harness,
            inline_scene(vec![Some(chapter("one", vec![Cut::new("hold", 5.0)]))]),
        );
        scene.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        scene.restart();
        scene.wait_idle().await;

        let types = harness.signals.types();
        assert_eq!(types.iter().filter(|t| **t == "scene.started").count(), 2);
        assert!(types.contains(&"scene.stopped"));
        assert_eq!(types.last(), Some(&"scene.completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_mismatch_is_skipped() {
        let harness = Harness::new();
        let mut graph = inline_scene(vec![Some(chapter("one", vec![moving_cut("a", 0.0)]))]);
        graph.chapters.insert(
            0,
            Some(ChapterRef::Resource {
                resource: "cellar".to_owned(),
            }),
        );
        let scene = scene_of(&harness, graph);

        scene.start();
        scene.wait_idle().await;

        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(1),
                ServiceCall::FadeIn(HALF),
                ServiceCall::AutoMove("a".to_owned()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_load_unloads_scene_once_load_finishes() {
        // Arrange
        let harness = Harness::with(|services, recorder| {
            let loader = InMemorySceneLoader::new(recorder.log().clone())
                .with_chapter("cellar", chapter("cellar", vec![moving_cut("a", 0.0)]))
                .with_latency(Duration::from_secs(2));
            services.with_scenes(Arc::new(loader))
        });
        let scene = scene_of(&harness, external_scene(&["cellar"]));
        scene.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Act
        scene.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Assert
        assert_eq!(
            harness.recorder.log().calls(),
            vec![
                ServiceCall::RepositionForChapter(0),
                ServiceCall::LoadAdditive("cellar".to_owned()),
                ServiceCall::Unload("cellar".to_owned()),
                ServiceCall::ReclaimUnusedResources,
            ]
        );
        assert_eq!(harness.signals.types(), vec!["scene.started", "scene.stopped"]);
        assert!(!scene.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_hook_does_not_stall_the_scene() {
        // Arrange
        let harness = Harness::with(|services, _| {
            let mut registry = DispatchRegistry::new();
            registry.register_hook("boom", || panic!("listener failed"));
            services.with_registry(registry)
        });
        let faulty = Cut::new("faulty", 1.0).with_start_event(CutEvent::new(
            "bang",
            CutEventKind::InvokeHooks {
                hook: Some("boom".to_owned()),
            },
        ));
        let graph = inline_scene(vec![Some(chapter(
            "arrival",
            vec![faulty, moving_cut("after", 0.0)],
        ))]);
        let scene = scene_of(&harness, graph);
        let started = Instant::now();

        // Act
        scene.start();
        scene.wait_idle().await;

        // Assert
        assert_eq!(started.elapsed(), HALF + Duration::from_secs(1));
        assert!(
            harness
                .recorder
                .log()
                .calls()
                .contains(&ServiceCall::AutoMove("after".to_owned()))
        );
        assert_eq!(harness.signals.types().last(), Some(&"scene.completed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_cut_duration_is_skippable() {
        // Arrange
        let harness = Harness::new();
        let graph = inline_scene(vec![Some(chapter("endless", vec![Cut::new("forever", 1e19)]))]);
        let scene = scene_of(&harness, graph);
        scene.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(scene.snapshot().status, PlaybackStatus::WaitingDuration);

        // Act
        scene.skip_current_wait();
        scene.wait_idle().await;

        // Assert
        assert_eq!(harness.signals.types().last(), Some(&"scene.completed"));
    }
}
