//! Run state shared by every controller level.
//!
//! A controller owns one `Playback`. Starting a run bumps the generation and
//! flips the `playing` channel to `true`; the run itself is a spawned task that
//! only finishes the generation it was started with. `halt` bumps the
//! generation, so an aborted task that is still inside its current poll can
//! no longer complete or mutate the newer run. A run that panics is finished by
//! its supervisor, so parents waiting on it move on.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;

#[derive(Debug)]
struct RunState {
    playing: watch::Sender<bool>,
    generation: AtomicU64,
    task: Mutex<Option<AbortHandle>>,
}

#[derive(Debug, Clone)]
pub(crate) struct Playback {
    state: Arc<RunState>,
}

impl Playback {
    pub(crate) fn new() -> Self {
        let (playing, _) = watch::channel(false);
        Self {
            state: Arc::new(RunState {
                playing,
                generation: AtomicU64::new(0),
                task: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        *self.state.playing.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.playing.subscribe()
    }

    /// Marks the controller playing. Returns `None` if it already was.
    pub(crate) fn begin(&self) -> Option<u64> {
        if self.is_playing() {
            return None;
        }
        let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.playing.send_replace(true);
        Some(generation)
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.state.generation.load(Ordering::SeqCst) == generation && self.is_playing()
    }

    /// Runs `run` as the task of `generation`.
    ///
    /// Without a tokio runtime there is nothing to drive the run; the
    /// generation is finished immediately and the failure logged. If the run
    /// panics, the generation is finished and the panic logged.
    pub(crate) fn spawn<F>(&self, generation: u64, run: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::error!("playback requires a tokio runtime; run abandoned");
            self.finish(generation);
            return;
        };
        let join = runtime.spawn(run);
        {
            let handle = join.abort_handle();
            let mut task = self.state.task.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_current(generation) {
                *task = Some(handle);
            } else {
                handle.abort();
            }
        }
        let supervisor = self.clone();
        runtime.spawn(async move {
            match join.await {
                Err(error) if error.is_panic() => {
                    if supervisor.finish(generation) {
                        tracing::error!(%error, "playback run panicked; treated as finished");
                    }
                }
                Ok(()) | Err(_) => {}
            }
        });
    }

    /// Ends `generation` normally. Returns `false` if it was already
    /// superseded or halted.
    pub(crate) fn finish(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.state.playing.send_replace(false);
        true
    }

    /// Aborts the current run. Returns `false` if nothing was playing.
    pub(crate) fn halt(&self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.state.playing.send_replace(false);
        if let Some(task) = self
            .state
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        true
    }
}

/// Resolves once `receiver` reports not playing.
pub(crate) async fn until_idle(mut receiver: watch::Receiver<bool>) {
    // The sender lives as long as the controller; a closed channel means idle.
    let _ = receiver.wait_for(|playing| !*playing).await;
}
