//! Executes a single `CutEvent` against the injected collaborators.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use storyreel_core::error::SequenceError;
use storyreel_core::services::Services;
use storyreel_core::story::{CutEvent, CutEventKind};

use crate::wait::{TimedWait, WaitOutcome, WaitState};

/// Dispatches cut events to collaborators.
#[derive(Debug, Clone, Copy)]
pub struct CutEventRunner<'a> {
    services: &'a Services,
}

fn collaborator<'s, T: ?Sized>(
    service: Option<&'s T>,
    name: &'static str,
) -> Result<&'s T, SequenceError> {
    service.ok_or(SequenceError::CollaboratorMissing(name))
}

fn payload<'e, T: ?Sized>(
    event: &CutEvent,
    field: &'static str,
    value: Option<&'e T>,
) -> Result<&'e T, SequenceError> {
    value.ok_or_else(|| SequenceError::MissingPayload {
        event: event.name.clone(),
        field,
    })
}

impl<'a> CutEventRunner<'a> {
    /// Creates a runner over `services`.
    #[must_use]
    pub fn new(services: &'a Services) -> Self {
        Self { services }
    }

    /// Performs the event's one collaborator call.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorMissing`, `MissingPayload` or `UnknownHandler`
    /// when the call cannot be made. Nothing has been called in that case.
    pub fn execute(&self, event: &CutEvent) -> Result<(), SequenceError> {
        let services = self.services;
        match &event.kind {
            CutEventKind::InvokeHooks { hook } => {
                let hook = payload(event, "hook", hook.as_deref())?;
                let ran = services.registry.invoke_hooks(hook)?;
                tracing::debug!(hook, callbacks = ran, "invoked hooks");
            }
            CutEventKind::CallMethod { method, args } => {
                let method = payload(event, "method", method.as_deref())?;
                services.registry.call_method(method, args)?;
            }
            CutEventKind::PlayAnimation { actor, clip } => {
                let animation = collaborator(services.animation.as_deref(), "animation")?;
                let actor = payload(event, "actor", actor.as_deref())?;
                let clip = payload(event, "clip", clip.as_deref())?;
                animation.play_animation(actor, clip);
            }
            CutEventKind::PlayAudio {
                clip,
                channel,
                looping,
            } => {
                let audio = collaborator(services.audio.as_deref(), "audio")?;
                let clip = payload(event, "clip", clip.as_deref())?;
                audio.play_audio(clip, *channel, *looping);
            }
            CutEventKind::Teleport { position, rotation } => {
                let player = collaborator(services.player.as_deref(), "player")?;
                let position = *payload(event, "position", position.as_ref())?;
                player.teleport(position, *rotation);
            }
            CutEventKind::ChangeBackgroundMusic { clip } => {
                let audio = collaborator(services.audio.as_deref(), "audio")?;
                let clip = payload(event, "clip", clip.as_deref())?;
                audio.change_background_music(clip);
            }
            CutEventKind::ChangeScene { scene } => {
                let scenes = collaborator(services.scenes.as_deref(), "scenes")?;
                let scene = payload(event, "scene", scene.as_deref())?;
                scenes.change_scene(scene);
            }
            CutEventKind::PlayerControl { enabled } => {
                let player = collaborator(services.player.as_deref(), "player")?;
                player.set_control_enabled(*enabled);
            }
            CutEventKind::PlayPath { path } => {
                let motion = collaborator(services.motion.as_deref(), "motion")?;
                let path = payload(event, "path", path.as_deref())?;
                motion.play_path(path);
            }
            CutEventKind::AutoMove { target } => {
                let motion = collaborator(services.motion.as_deref(), "motion")?;
                let target = payload(event, "target", target.as_deref())?;
                motion.auto_move(target);
            }
        }
        Ok(())
    }

    /// Delay, execute, post-execution wait. Both waits end early on skip. A
    /// failed execution is logged and the event still counts as done.
    /// `execute`, with a panicking collaborator or callback turned into
    /// `EventPanicked`.
    fn execute_caught(&self, event: &CutEvent) -> Result<(), SequenceError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.execute(event))).unwrap_or_else(|payload| {
            Err(SequenceError::EventPanicked {
                event: event.name.clone(),
                message: panic_message(payload.as_ref()),
            })
        })
    }

    pub(crate) async fn run(&self, event: &CutEvent, waits: &WaitState) {
        if waits.timed(TimedWait::Delay, event.delay()).await == WaitOutcome::Skipped {
            tracing::debug!(event = %event.name, "event delay skipped");
        }
        match self.execute_caught(event) {
            Ok(()) => tracing::debug!(
                event = %event.name,
                kind = event.kind.label(),
                "executed cut event"
            ),
            Err(error) => tracing::warn!(
                event = %event.name,
                kind = event.kind.label(),
                %error,
                "cut event skipped"
            ),
        }
        if waits
            .timed(TimedWait::PostExecution, event.wait_after_execution())
            .await
            == WaitOutcome::Skipped
        {
            tracing::debug!(event = %event.name, "post-execution wait skipped");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
