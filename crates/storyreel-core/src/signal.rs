//! Playback lifecycle signals.
//!
//! Controllers announce starts, completions and save points through a shared
//! `SignalBus`. Listeners are plain callbacks, run in registration order.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Metadata attached to every signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalMetadata {
    /// Unique signal identifier.
    pub signal_id: Uuid,
    /// When the signal was raised.
    pub occurred_at: DateTime<Utc>,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SignalKind {
    /// Scene playback began.
    SceneStarted {
        /// Scene name.
        scene: String,
    },
    /// The last chapter finished.
    SceneCompleted {
        /// Scene name.
        scene: String,
    },
    /// Scene playback was stopped before completion.
    SceneStopped {
        /// Scene name.
        scene: String,
    },
    /// A chapter began.
    ChapterStarted {
        /// Chapter name.
        chapter: String,
        /// Character tag of the chapter.
        character: String,
    },
    /// A chapter ran all of its acts.
    ChapterCompleted {
        /// Chapter name.
        chapter: String,
    },
    /// An act began.
    ActStarted {
        /// Act name.
        act: String,
    },
    /// An act ran all of its cuts.
    ActCompleted {
        /// Act name.
        act: String,
    },
    /// A save-point act began.
    SavePointReached {
        /// Act name.
        act: String,
    },
    /// A cut began running (after any before-start gate).
    CutStarted {
        /// Cut name.
        cut: String,
    },
    /// A cut ran its end events.
    CutCompleted {
        /// Cut name.
        cut: String,
    },
}

/// Signal envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSignal {
    /// Signal metadata.
    pub metadata: SignalMetadata,
    /// Signal payload.
    #[serde(flatten)]
    pub kind: SignalKind,
}

impl PlaybackSignal {
    /// Stamps `kind` with a fresh id and the clock's time.
    #[must_use]
    pub fn new(kind: SignalKind, clock: &dyn Clock) -> Self {
        Self {
            metadata: SignalMetadata {
                signal_id: Uuid::new_v4(),
                occurred_at: clock.now(),
            },
            kind,
        }
    }

    /// Dotted type name for logs.
    #[must_use]
    pub fn signal_type(&self) -> &'static str {
        match &self.kind {
            SignalKind::SceneStarted { .. } => "scene.started",
            SignalKind::SceneCompleted { .. } => "scene.completed",
            SignalKind::SceneStopped { .. } => "scene.stopped",
            SignalKind::ChapterStarted { .. } => "chapter.started",
            SignalKind::ChapterCompleted { .. } => "chapter.completed",
            SignalKind::ActStarted { .. } => "act.started",
            SignalKind::ActCompleted { .. } => "act.completed",
            SignalKind::SavePointReached { .. } => "act.save_point_reached",
            SignalKind::CutStarted { .. } => "cut.started",
            SignalKind::CutCompleted { .. } => "cut.completed",
        }
    }

    /// Serializes the signal to JSON.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Callback receiving every signal.
pub type SignalListener = Arc<dyn Fn(&PlaybackSignal) + Send + Sync>;

/// Fan-out point shared by every controller in a hierarchy.
#[derive(Clone)]
pub struct SignalBus {
    clock: Arc<dyn Clock>,
    listeners: Arc<Mutex<Vec<SignalListener>>>,
}

impl SignalBus {
    /// Creates a bus that stamps signals with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a listener; it receives signals after all earlier listeners.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&PlaybackSignal) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Stamps and delivers a signal.
    pub fn emit(&self, kind: SignalKind) {
        let signal = PlaybackSignal::new(kind, self.clock.as_ref());
        tracing::debug!(signal = signal.signal_type(), "playback signal");
        // Listeners may call back into controllers; deliver outside the lock.
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&signal);
        }
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("SignalBus")
            .field("listeners", &count)
            .finish_non_exhaustive()
    }
}
