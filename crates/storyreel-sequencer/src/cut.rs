//! The smallest playable unit: three event lists around a timed hold.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use storyreel_core::error::SequenceError;
use storyreel_core::level::Level;
use storyreel_core::signal::SignalKind;
use storyreel_core::story::{Cut, CutEvent};
use tokio::sync::watch;

use crate::context::PlaybackContext;
use crate::cut_event::CutEventRunner;
use crate::playback::Playback;
use crate::sequence::Playable;
use crate::status::{CurrentEvent, EventGroup, PlaybackStatus};
use crate::wait::{InputGate, SkipEffect, TimedWait, WaitOutcome, WaitState};

/// Where a cut is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutPhase {
    /// Not playing.
    #[default]
    Idle,
    /// Held until the before-start gate is released.
    WaitingBeforeStart,
    /// Running `start_events`.
    RunningStartEvents,
    /// Running `middle_events`.
    RunningMiddleEvents,
    /// Holding for the cut's duration.
    WaitingDuration,
    /// Held until the before-end gate is released.
    WaitingBeforeEnd,
    /// Running `end_events`.
    RunningEndEvents,
}

#[derive(Debug, Default)]
struct CutProgress {
    phase: CutPhase,
    event: Option<CurrentEvent>,
}

#[derive(Debug)]
struct CutInner {
    cut: Cut,
    context: PlaybackContext,
    playback: Playback,
    waits: WaitState,
    progress: Mutex<CutProgress>,
}

/// Plays one cut.
///
/// Phases run strictly in order: before-start gate, start events, middle
/// events, the duration hold, before-end gate, end events. Each event runs its
/// delay, its collaborator call and its post-execution wait before the next
/// event begins.
#[derive(Debug, Clone)]
pub struct CutController {
    inner: Arc<CutInner>,
}

impl CutController {
    /// Creates an idle controller for `cut`.
    #[must_use]
    pub fn new(cut: Cut, context: PlaybackContext) -> Self {
        Self {
            inner: Arc::new(CutInner {
                cut,
                context,
                playback: Playback::new(),
                waits: WaitState::default(),
                progress: Mutex::new(CutProgress::default()),
            }),
        }
    }

    /// The cut being played.
    #[must_use]
    pub fn cut(&self) -> &Cut {
        &self.inner.cut
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.inner.playback.is_playing()
    }

    #[must_use]
    pub fn phase(&self) -> CutPhase {
        self.inner.progress().phase
    }

    /// The event currently running, including its delay and post wait.
    #[must_use]
    pub fn current_event(&self) -> Option<CurrentEvent> {
        self.inner.progress().event.clone()
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        if !self.is_playing() {
            return PlaybackStatus::Idle;
        }
        PlaybackStatus::from_waits(self.inner.waits.armed_gate(), self.inner.waits.active_timed())
    }

    #[must_use]
    pub fn is_waiting_before_start(&self) -> bool {
        self.inner.waits.armed_gate() == Some(InputGate::Start)
    }

    #[must_use]
    pub fn is_waiting_before_end(&self) -> bool {
        self.inner.waits.armed_gate() == Some(InputGate::End)
    }

    /// Starts the cut.
    ///
    /// With `wait_before_start` the cut becomes playing but holds at the gate;
    /// a second request while held releases it. Any other request while
    /// playing is ignored with a warning.
    pub fn request_start(&self) {
        let inner = &self.inner;
        if inner.playback.is_playing() {
            if inner.waits.release(InputGate::Start) {
                tracing::debug!(cut = %inner.cut.name, "start request released the before-start gate");
            } else {
                let error = SequenceError::AlreadyPlaying {
                    level: Level::Cut,
                    owner: inner.cut.name.clone(),
                };
                tracing::warn!(%error, "start request ignored");
            }
            return;
        }
        let Some(generation) = inner.playback.begin() else {
            return;
        };
        inner.waits.reset();
        *inner.progress() = CutProgress::default();
        if inner.cut.wait_before_start {
            inner.waits.arm(InputGate::Start);
            inner.progress().phase = CutPhase::WaitingBeforeStart;
            tracing::info!(cut = %inner.cut.name, "cut waiting for input before start");
        }
        let task = Arc::clone(inner);
        inner.playback.spawn(generation, task.run(generation));
    }

    /// Releases the before-start gate. Returns `false` if it was not armed.
    pub fn release_before_start(&self) -> bool {
        self.inner.waits.release(InputGate::Start)
    }

    /// Releases the before-end gate. Returns `false` if it was not armed.
    pub fn release_before_end(&self) -> bool {
        self.inner.waits.release(InputGate::End)
    }

    /// Player confirmation: releases whichever input gate is armed.
    pub fn player_input(&self) {
        if let Some(gate) = self.inner.waits.armed_gate() {
            self.inner.waits.release(gate);
            tracing::debug!(cut = %self.inner.cut.name, ?gate, "player input released gate");
        }
    }

    /// Ends the current wait early: releases an armed gate, or cuts a delay,
    /// duration or post-execution wait short. Does nothing otherwise.
    pub fn skip_current_wait(&self) {
        if !self.is_playing() {
            return;
        }
        let cut = &self.inner.cut.name;
        match self.inner.waits.skip() {
            SkipEffect::Released(gate) => tracing::debug!(%cut, ?gate, "skip released gate"),
            SkipEffect::Interrupted(wait) => tracing::debug!(%cut, ?wait, "skip interrupted wait"),
            SkipEffect::Nothing => tracing::debug!(%cut, "nothing to skip"),
        }
    }

    /// Cancels the run and clears every wait. Idempotent.
    pub fn stop(&self) {
        let inner = &self.inner;
        if !inner.playback.halt() {
            return;
        }
        inner.waits.reset();
        *inner.progress() = CutProgress::default();
        tracing::info!(cut = %inner.cut.name, "cut stopped");
    }

    pub fn restart(&self) {
        self.stop();
        self.request_start();
    }
}

impl CutInner {
    fn progress(&self) -> MutexGuard<'_, CutProgress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves to `phase` if `generation` is still the live run.
    fn enter(&self, generation: u64, phase: CutPhase) -> bool {
        if !self.playback.is_current(generation) {
            return false;
        }
        self.progress().phase = phase;
        tracing::debug!(cut = %self.cut.name, ?phase, "cut phase");
        true
    }

    async fn run(self: Arc<Self>, generation: u64) {
        if self.cut.wait_before_start {
            self.waits.wait_released(InputGate::Start).await;
        }
        if !self.enter(generation, CutPhase::RunningStartEvents) {
            return;
        }
        self.context.signals.emit(SignalKind::CutStarted {
            cut: self.cut.name.clone(),
        });
        self.run_group(generation, EventGroup::Start, &self.cut.start_events)
            .await;

        if !self.enter(generation, CutPhase::RunningMiddleEvents) {
            return;
        }
        self.run_group(generation, EventGroup::Middle, &self.cut.middle_events)
            .await;

        if !self.enter(generation, CutPhase::WaitingDuration) {
            return;
        }
        if self.waits.timed(TimedWait::Duration, self.cut.duration()).await == WaitOutcome::Skipped
        {
            tracing::debug!(cut = %self.cut.name, "duration skipped");
        }

        if self.cut.wait_before_end {
            if !self.enter(generation, CutPhase::WaitingBeforeEnd) {
                return;
            }
            self.waits.arm(InputGate::End);
            self.waits.wait_released(InputGate::End).await;
        }

        if !self.enter(generation, CutPhase::RunningEndEvents) {
            return;
        }
        self.run_group(generation, EventGroup::End, &self.cut.end_events)
            .await;

        if !self.playback.is_current(generation) {
            return;
        }
        *self.progress() = CutProgress::default();
        if self.playback.finish(generation) {
            tracing::info!(cut = %self.cut.name, "cut completed");
            self.context.signals.emit(SignalKind::CutCompleted {
                cut: self.cut.name.clone(),
            });
        }
    }

    async fn run_group(&self, generation: u64, group: EventGroup, events: &[Option<CutEvent>]) {
        let runner = CutEventRunner::new(&self.context.services);
        for (index, slot) in events.iter().enumerate() {
            if !self.playback.is_current(generation) {
                return;
            }
            let Some(event) = slot else {
                let error = SequenceError::MissingChild {
                    level: Level::Cut,
                    owner: self.cut.name.clone(),
                    child: Level::CutEvent,
                    index,
                };
                tracing::error!(%error, ?group, "skipping empty event slot");
                continue;
            };
            self.progress().event = Some(CurrentEvent {
                group,
                index,
                name: event.name.clone(),
            });
            runner.run(event, &self.waits).await;
        }
        if self.playback.is_current(generation) {
            self.progress().event = None;
        }
    }
}

impl Playable for CutController {
    const LEVEL: Level = Level::Cut;

    fn name(&self) -> &str {
        &self.inner.cut.name
    }

    fn start(&self) {
        self.request_start();
    }

    fn stop(&self) {
        CutController::stop(self);
    }

    fn is_playing(&self) -> bool {
        CutController::is_playing(self)
    }

    fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.inner.playback.subscribe()
    }
}
