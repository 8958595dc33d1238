//! Loads the story and drives one scene to its end.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storyreel_content::{DirectorySceneLoader, FileStorySource, StorySource};
use storyreel_core::registry::DispatchRegistry;
use storyreel_core::signal::SignalBus;
use storyreel_sequencer::{PlaybackContext, PlaybackStatus, SceneController};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::services::TracingServices;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The scene played to its last chapter.
    Completed,
    /// Shutdown was requested first; the scene was stopped.
    Interrupted,
}

/// Loads `config.story_path` and builds a scene controller for it.
///
/// Same as `prepare_with_registry` with an empty registry: the headless host
/// registers no hooks or methods, so a story that dispatches to any is
/// rejected at load time.
///
/// # Errors
///
/// Returns `HostError::Content` if the document cannot be loaded or fails
/// validation.
pub async fn prepare(config: &HostConfig) -> Result<SceneController, HostError> {
    prepare_with_registry(config, DispatchRegistry::new()).await
}

/// Loads `config.story_path`, validates it against `registry` and builds a
/// scene controller that dispatches to `registry`.
///
/// Chapter resources of multi-scene stories are read from the story's
/// directory and checked against the same registry when they load. Signals
/// are logged as JSON payloads.
///
/// # Errors
///
/// Returns `HostError::Content` if the document cannot be loaded or fails
/// validation, including hook or method names missing from `registry`.
pub async fn prepare_with_registry(
    config: &HostConfig,
    registry: DispatchRegistry,
) -> Result<SceneController, HostError> {
    let document = FileStorySource::new(&config.story_path)
        .load()
        .await?
        .validated(Some(&registry))?;
    let story_dir = config
        .story_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let scenes = DirectorySceneLoader::new(story_dir).with_registry(registry.clone());
    let services = TracingServices::services()
        .with_registry(registry)
        .with_scenes(Arc::new(scenes));

    let signals = SignalBus::default();
    signals.subscribe(|signal| {
        tracing::info!(
            signal = signal.signal_type(),
            payload = %signal.to_payload(),
            "playback signal"
        );
    });

    tracing::info!(
        scene = %document.scene.name,
        version = %document.version_hash,
        chapters = document.scene.chapters.len(),
        "story ready"
    );
    Ok(SceneController::new(
        document.scene,
        config.playback,
        PlaybackContext::new(services, signals),
    ))
}

/// Starts `scene` at `start_chapter` and waits until it completes or
/// `shutdown` resolves. With `auto_confirm`, any armed input gate is
/// confirmed on the next tick of that interval.
///
/// # Errors
///
/// Returns `HostError::NotStarted` if the scene refused to start.
pub async fn play(
    scene: &SceneController,
    start_chapter: usize,
    auto_confirm: Option<Duration>,
    shutdown: impl Future<Output = ()>,
) -> Result<RunOutcome, HostError> {
    if start_chapter == 0 {
        scene.start();
    } else {
        scene.start_from(start_chapter);
    }
    if !scene.is_playing() {
        return Err(HostError::NotStarted(scene.name().to_owned()));
    }

    tokio::pin!(shutdown);
    let mut confirm = auto_confirm.map(tokio::time::interval);
    loop {
        tokio::select! {
            () = scene.wait_idle() => return Ok(RunOutcome::Completed),
            () = &mut shutdown => {
                tracing::info!(scene = %scene.name(), "shutdown requested; stopping scene");
                scene.stop();
                return Ok(RunOutcome::Interrupted);
            }
            _ = tick(confirm.as_mut()) => {
                if let PlaybackStatus::WaitingInput(gate) = scene.snapshot().status {
                    tracing::info!(?gate, "auto-confirming input gate");
                    scene.player_input();
                }
            }
        }
    }
}

async fn tick(interval: Option<&mut tokio::time::Interval>) -> tokio::time::Instant {
    match interval {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// `prepare` then `play`, stopping on Ctrl-C.
///
/// # Errors
///
/// Propagates errors from `prepare` and `play`.
pub async fn run(config: HostConfig) -> Result<RunOutcome, HostError> {
    let scene = prepare(&config).await?;
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "cannot listen for Ctrl-C; running to completion");
            std::future::pending::<()>().await;
        }
    };
    let outcome = play(&scene, config.start_chapter, config.auto_confirm, shutdown).await?;
    tracing::info!(scene = %scene.name(), ?outcome, "run finished");
    Ok(outcome)
}
