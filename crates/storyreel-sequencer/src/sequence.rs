//! Ordered playback of child controllers.
//!
//! Acts play cuts and chapters play acts in exactly the same way: start the
//! child at the cursor, wait until it stops playing, advance. Empty slots are
//! logged and skipped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use storyreel_core::error::SequenceError;
use storyreel_core::level::Level;
use storyreel_core::signal::{SignalBus, SignalKind};
use tokio::sync::watch;

use crate::playback::{Playback, until_idle};

/// A controller a parent sequence can drive.
pub trait Playable: Clone + Send + Sync + 'static {
    /// The level this controller plays.
    const LEVEL: Level;

    fn name(&self) -> &str;

    /// Begins playback. Must flip `subscribe_playing` to `true` before
    /// returning, or leave it `false` if the start was refused.
    fn start(&self);

    fn stop(&self);

    fn is_playing(&self) -> bool;

    /// Playing state; goes `false` on completion or stop.
    fn subscribe_playing(&self) -> watch::Receiver<bool>;
}

/// Position of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    /// Index of the child being played; `0` when idle.
    pub index: usize,
    /// Whether the sequence is playing.
    pub is_playing: bool,
}

#[derive(Debug, Default)]
struct Position {
    index: usize,
    jump: Option<usize>,
}

#[derive(Debug)]
struct SequenceInner<T> {
    level: Level,
    name: String,
    children: Vec<Option<T>>,
    signals: SignalBus,
    on_start: Vec<SignalKind>,
    on_complete: SignalKind,
    playback: Playback,
    position: Mutex<Position>,
}

#[derive(Debug)]
pub(crate) struct Sequence<T> {
    inner: Arc<SequenceInner<T>>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Signals a sequence emits around its run.
pub(crate) struct Announcements {
    pub(crate) on_start: Vec<SignalKind>,
    pub(crate) on_complete: SignalKind,
}

impl<T: Playable> Sequence<T> {
    pub(crate) fn new(
        level: Level,
        name: String,
        children: Vec<Option<T>>,
        signals: SignalBus,
        announcements: Announcements,
    ) -> Self {
        Self {
            inner: Arc::new(SequenceInner {
                level,
                name,
                children,
                signals,
                on_start: announcements.on_start,
                on_complete: announcements.on_complete,
                playback: Playback::new(),
                position: Mutex::new(Position::default()),
            }),
        }
    }

    pub(crate) fn children(&self) -> &[Option<T>] {
        &self.inner.children
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.inner.playback.is_playing()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.playback.subscribe()
    }

    pub(crate) fn cursor(&self) -> Cursor {
        Cursor {
            index: self.inner.position().index,
            is_playing: self.is_playing(),
        }
    }

    /// The child at the cursor, while playing.
    pub(crate) fn current(&self) -> Option<T> {
        if !self.is_playing() {
            return None;
        }
        let index = self.inner.position().index;
        self.inner.children.get(index).cloned().flatten()
    }

    pub(crate) fn start(&self) {
        self.start_at(0);
    }

    pub(crate) fn start_from(&self, index: usize) {
        if !self.check_index(index) {
            return;
        }
        self.stop();
        self.start_at(index);
    }

    /// Jumps to `index`: the current child is stopped and playback continues
    /// from `index`. Starts the sequence there if it is idle.
    pub(crate) fn go_to(&self, index: usize) {
        if !self.check_index(index) {
            return;
        }
        if !self.is_playing() {
            self.start_at(index);
            return;
        }
        let current = {
            let mut position = self.inner.position();
            position.jump = Some(index);
            position.index
        };
        tracing::debug!(
            node = %self.inner.level,
            name = %self.inner.name,
            from = current,
            to = index,
            "jumping"
        );
        self.inner.stop_child(current);
    }

    /// Stops the current child so the run advances by exactly one. Ignored
    /// on the last child.
    pub(crate) fn skip_to_next(&self) {
        if !self.is_playing() {
            return;
        }
        let index = self.inner.position().index;
        if index + 1 >= self.inner.children.len() {
            tracing::debug!(
                node = %self.inner.level,
                name = %self.inner.name,
                index,
                "no next child to skip to"
            );
            return;
        }
        tracing::debug!(
            node = %self.inner.level,
            name = %self.inner.name,
            index,
            "skipping to next child"
        );
        self.inner.stop_child(index);
    }

    pub(crate) fn stop(&self) {
        let inner = &self.inner;
        if !inner.playback.halt() {
            return;
        }
        let index = std::mem::take(&mut *inner.position()).index;
        inner.stop_child(index);
        tracing::info!(node = %inner.level, name = %inner.name, index, "stopped");
    }

    pub(crate) fn restart(&self) {
        self.stop();
        self.start();
    }

    fn check_index(&self, index: usize) -> bool {
        let len = self.inner.children.len();
        if index < len {
            return true;
        }
        let error = SequenceError::InvalidIndex {
            level: self.inner.level,
            owner: self.inner.name.clone(),
            index,
            len,
        };
        tracing::error!(%error, "start index rejected");
        false
    }

    fn start_at(&self, index: usize) {
        let inner = &self.inner;
        if inner.children.is_empty() {
            let error = SequenceError::Empty {
                level: inner.level,
                owner: inner.name.clone(),
            };
            tracing::error!(%error, "refusing to start");
            return;
        }
        let Some(generation) = inner.playback.begin() else {
            let error = SequenceError::AlreadyPlaying {
                level: inner.level,
                owner: inner.name.clone(),
            };
            tracing::warn!(%error, "start request ignored");
            return;
        };
        *inner.position() = Position { index, jump: None };
        tracing::info!(node = %inner.level, name = %inner.name, index, "started");
        for kind in &inner.on_start {
            inner.signals.emit(kind.clone());
        }
        let task = Arc::clone(inner);
        inner.playback.spawn(generation, task.run(generation));
    }
}

impl<T: Playable> SequenceInner<T> {
    fn position(&self) -> MutexGuard<'_, Position> {
        self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_child(&self, index: usize) {
        if let Some(Some(child)) = self.children.get(index) {
            child.stop();
        }
    }

    async fn run(self: Arc<Self>, generation: u64) {
        loop {
            if !self.playback.is_current(generation) {
                return;
            }
            let index = self.position().index;
            let Some(slot) = self.children.get(index) else {
                break;
            };
            if let Some(child) = slot {
                tracing::debug!(
                    node = %self.level,
                    name = %self.name,
                    child = child.name(),
                    index,
                    "starting child"
                );
                child.start();
                until_idle(child.subscribe_playing()).await;
            } else {
                let error = SequenceError::MissingChild {
                    level: self.level,
                    owner: self.name.clone(),
                    child: T::LEVEL,
                    index,
                };
                tracing::error!(%error, "skipping empty slot");
            }
            if !self.playback.is_current(generation) {
                return;
            }
            let mut position = self.position();
            position.index = position.jump.take().unwrap_or(index + 1);
        }
        *self.position() = Position::default();
        if self.playback.finish(generation) {
            tracing::info!(node = %self.level, name = %self.name, "completed");
            self.signals.emit(self.on_complete.clone());
        }
    }
}
