//! Input gates and skippable timed waits for one cut.
//!
//! A cut is in at most one wait at a time: either an input gate (before start
//! or before end) or a timed wait (event delay, cut duration, post-execution
//! wait). `skip` acts on whichever is active and does nothing otherwise. The
//! skip latch is cleared whenever a timed wait ends, so a skip never carries
//! over into the next wait.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};

/// Upper bound on a single timed wait. Longer authored waits are held this
/// long, which keeps the deadline representable.
const LONGEST_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Which input gate is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputGate {
    /// Held before the cut's start events.
    Start,
    /// Held before the cut's end events.
    End,
}

/// Which timed wait is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedWait {
    /// Delay before an event executes.
    Delay,
    /// The cut's own duration.
    Duration,
    /// Wait after an event executed.
    PostExecution,
}

/// How a timed wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Elapsed,
    Skipped,
}

/// What a skip request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipEffect {
    Released(InputGate),
    Interrupted(TimedWait),
    Nothing,
}

#[derive(Debug, Default)]
struct WaitFlags {
    gate: Option<InputGate>,
    timed: Option<TimedWait>,
    skip_requested: bool,
}

#[derive(Debug, Default)]
pub(crate) struct WaitState {
    flags: Mutex<WaitFlags>,
    wake: Notify,
}

impl WaitState {
    fn flags(&self) -> MutexGuard<'_, WaitFlags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn armed_gate(&self) -> Option<InputGate> {
        self.flags().gate
    }

    pub(crate) fn active_timed(&self) -> Option<TimedWait> {
        self.flags().timed
    }

    /// Arms `gate`; `wait_released` then blocks until it is released.
    pub(crate) fn arm(&self, gate: InputGate) {
        self.flags().gate = Some(gate);
    }

    /// Releases `gate` if it is the armed one.
    pub(crate) fn release(&self, gate: InputGate) -> bool {
        let mut flags = self.flags();
        if flags.gate != Some(gate) {
            return false;
        }
        flags.gate = None;
        drop(flags);
        self.wake.notify_waiters();
        true
    }

    pub(crate) fn skip(&self) -> SkipEffect {
        let mut flags = self.flags();
        let effect = if let Some(gate) = flags.gate.take() {
            SkipEffect::Released(gate)
        } else if let Some(timed) = flags.timed {
            flags.skip_requested = true;
            SkipEffect::Interrupted(timed)
        } else {
            SkipEffect::Nothing
        };
        drop(flags);
        if effect != SkipEffect::Nothing {
            self.wake.notify_waiters();
        }
        effect
    }

    /// Clears every flag. Used when the owning cut stops.
    pub(crate) fn reset(&self) {
        *self.flags() = WaitFlags::default();
        self.wake.notify_waiters();
    }

    /// Resolves once `gate` is no longer armed.
    pub(crate) async fn wait_released(&self, gate: InputGate) {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.flags().gate != Some(gate) {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `duration` unless skipped first. A zero duration returns at
    /// once without entering the wait.
    pub(crate) async fn timed(&self, kind: TimedWait, duration: Duration) -> WaitOutcome {
        if duration.is_zero() {
            return WaitOutcome::Elapsed;
        }
        let deadline = Instant::now() + duration.min(LONGEST_WAIT);
        {
            let mut flags = self.flags();
            flags.timed = Some(kind);
            flags.skip_requested = false;
        }
        let outcome = loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.flags().skip_requested {
                break WaitOutcome::Skipped;
            }
            tokio::select! {
                () = sleep_until(deadline) => break WaitOutcome::Elapsed,
                () = &mut notified => {}
            }
        };
        let mut flags = self.flags();
        flags.timed = None;
        flags.skip_requested = false;
        outcome
    }
}
