//! Acts: an ordered run of cuts.

use std::sync::Arc;

use storyreel_core::level::Level;
use storyreel_core::signal::SignalKind;
use storyreel_core::story::Act;
use tokio::sync::watch;

use crate::context::PlaybackContext;
use crate::cut::CutController;
use crate::sequence::{Announcements, Cursor, Playable, Sequence};

/// Plays an act's cuts one after another.
#[derive(Debug, Clone)]
pub struct ActController {
    act: Arc<Act>,
    cuts: Sequence<CutController>,
}

impl ActController {
    /// Builds the act and a controller per cut.
    #[must_use]
    pub fn new(act: Act, context: &PlaybackContext) -> Self {
        let cuts = act
            .cuts
            .iter()
            .map(|slot| {
                slot.clone()
                    .map(|cut| CutController::new(cut, context.clone()))
            })
            .collect();
        let mut on_start = vec![SignalKind::ActStarted {
            act: act.name.clone(),
        }];
        if act.is_save_point {
            on_start.push(SignalKind::SavePointReached {
                act: act.name.clone(),
            });
        }
        let announcements = Announcements {
            on_start,
            on_complete: SignalKind::ActCompleted {
                act: act.name.clone(),
            },
        };
        let cuts = Sequence::new(
            Level::Act,
            act.name.clone(),
            cuts,
            context.signals.clone(),
            announcements,
        );
        Self {
            act: Arc::new(act),
            cuts,
        }
    }

    #[must_use]
    pub fn act(&self) -> &Act {
        &self.act
    }

    #[must_use]
    pub fn is_save_point(&self) -> bool {
        self.act.is_save_point
    }

    /// Scene the host should show behind this act, if any.
    #[must_use]
    pub fn background_scene(&self) -> Option<&str> {
        self.act.background_scene.as_deref()
    }

    /// Cut controllers in authored order; empty slots are `None`.
    #[must_use]
    pub fn cuts(&self) -> &[Option<CutController>] {
        self.cuts.children()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cuts.cursor()
    }

    /// The cut being played, if any.
    #[must_use]
    pub fn current_cut(&self) -> Option<CutController> {
        self.cuts.current()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.cuts.is_playing()
    }

    /// Plays from the first cut. An act without cuts refuses to start.
    pub fn start(&self) {
        self.cuts.start();
    }

    /// Plays from cut `index`, stopping any current run first. An index out
    /// of range is logged and changes nothing.
    pub fn start_from(&self, index: usize) {
        self.cuts.start_from(index);
    }

    /// Continues from cut `index` after stopping the current cut.
    pub fn go_to_cut(&self, index: usize) {
        self.cuts.go_to(index);
    }

    /// Abandons the current cut and moves on to the next one.
    pub fn skip_to_next_cut(&self) {
        self.cuts.skip_to_next();
    }

    /// Stops the act and its current cut.
    pub fn stop(&self) {
        self.cuts.stop();
    }

    pub fn restart(&self) {
        self.cuts.restart();
    }
}

impl Playable for ActController {
    const LEVEL: Level = Level::Act;

    fn name(&self) -> &str {
        &self.act.name
    }

    fn start(&self) {
        ActController::start(self);
    }

    fn stop(&self) {
        ActController::stop(self);
    }

    fn is_playing(&self) -> bool {
        ActController::is_playing(self)
    }

    fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.cuts.subscribe()
    }
}
