//! Collaborators that record every call instead of acting on it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use storyreel_core::geometry::{Quat, Vec3};
use storyreel_core::services::{
    AnimationService, AudioService, MotionService, PlayerService, ScreenFader, Services,
};
use storyreel_core::story::AudioChannel;

/// One observed collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    PlayAnimation { actor: String, clip: String },
    PlayAudio { clip: String, channel: AudioChannel, looping: bool },
    ChangeBackgroundMusic(String),
    Teleport { position: Vec3, rotation: Option<Quat> },
    SetControlEnabled(bool),
    RepositionForChapter(usize),
    PlayPath(String),
    AutoMove(String),
    FadeOut(Duration),
    FadeIn(Duration),
    LoadAdditive(String),
    Unload(String),
    ReclaimUnusedResources,
    ChangeScene(String),
}

/// Ordered call log shared by every recording collaborator in a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ServiceCall>>>);

impl CallLog {
    /// Appends a call.
    pub fn push(&self, call: ServiceCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&ServiceCall) -> bool) -> usize {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

/// Implements every synchronous collaborator trait by logging the call.
#[derive(Debug, Clone, Default)]
pub struct RecordingServices {
    log: CallLog,
}

impl RecordingServices {
    /// Creates a recorder with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that appends to an existing log.
    #[must_use]
    pub fn with_log(log: CallLog) -> Self {
        Self { log }
    }

    /// The shared log.
    #[must_use]
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// A `Services` context with this recorder behind every synchronous
    /// collaborator. No scene loader is attached.
    #[must_use]
    pub fn services(&self) -> Services {
        let recorder = Arc::new(self.clone());
        Services::new()
            .with_animation(recorder.clone())
            .with_audio(recorder.clone())
            .with_player(recorder.clone())
            .with_motion(recorder.clone())
            .with_fader(recorder)
    }
}

impl AnimationService for RecordingServices {
    fn play_animation(&self, actor: &str, clip: &str) {
        self.log.push(ServiceCall::PlayAnimation {
            actor: actor.to_owned(),
            clip: clip.to_owned(),
        });
    }
}

impl AudioService for RecordingServices {
    fn play_audio(&self, clip: &str, channel: AudioChannel, looping: bool) {
        self.log.push(ServiceCall::PlayAudio {
            clip: clip.to_owned(),
            channel,
            looping,
        });
    }

    fn change_background_music(&self, clip: &str) {
        self.log
            .push(ServiceCall::ChangeBackgroundMusic(clip.to_owned()));
    }
}

impl PlayerService for RecordingServices {
    fn teleport(&self, position: Vec3, rotation: Option<Quat>) {
        self.log.push(ServiceCall::Teleport { position, rotation });
    }

    fn set_control_enabled(&self, enabled: bool) {
        self.log.push(ServiceCall::SetControlEnabled(enabled));
    }

    fn reposition_for_chapter(&self, index: usize) {
        self.log.push(ServiceCall::RepositionForChapter(index));
    }
}

impl MotionService for RecordingServices {
    fn play_path(&self, path: &str) {
        self.log.push(ServiceCall::PlayPath(path.to_owned()));
    }

    fn auto_move(&self, target: &str) {
        self.log.push(ServiceCall::AutoMove(target.to_owned()));
    }
}

impl ScreenFader for RecordingServices {
    fn fade_out(&self, duration: Duration) {
        self.log.push(ServiceCall::FadeOut(duration));
    }

    fn fade_in(&self, duration: Duration) {
        self.log.push(ServiceCall::FadeIn(duration));
    }
}
