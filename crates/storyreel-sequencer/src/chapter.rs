//! Chapters: an ordered run of acts told from one character's perspective.

use std::sync::Arc;

use storyreel_core::level::Level;
use storyreel_core::signal::SignalKind;
use storyreel_core::story::{Chapter, CharacterTag};
use tokio::sync::watch;

use crate::act::ActController;
use crate::context::PlaybackContext;
use crate::sequence::{Announcements, Cursor, Playable, Sequence};

/// Plays a chapter's acts one after another.
#[derive(Debug, Clone)]
pub struct ChapterController {
    chapter: Arc<Chapter>,
    acts: Sequence<ActController>,
}

impl ChapterController {
    #[must_use]
    pub fn new(chapter: Chapter, context: &PlaybackContext) -> Self {
        let acts = chapter
            .acts
            .iter()
            .map(|slot| slot.clone().map(|act| ActController::new(act, context)))
            .collect();
        let announcements = Announcements {
            on_start: vec![SignalKind::ChapterStarted {
                chapter: chapter.name.clone(),
                character: chapter.character.as_str().to_owned(),
            }],
            on_complete: SignalKind::ChapterCompleted {
                chapter: chapter.name.clone(),
            },
        };
        let acts = Sequence::new(
            Level::Chapter,
            chapter.name.clone(),
            acts,
            context.signals.clone(),
            announcements,
        );
        Self {
            chapter: Arc::new(chapter),
            acts,
        }
    }

    #[must_use]
    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    /// Opaque character tag; the sequencer never interprets it.
    #[must_use]
    pub fn character(&self) -> &CharacterTag {
        &self.chapter.character
    }

    #[must_use]
    pub fn acts(&self) -> &[Option<ActController>] {
        self.acts.children()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.acts.cursor()
    }

    #[must_use]
    pub fn current_act(&self) -> Option<ActController> {
        self.acts.current()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.acts.is_playing()
    }

    pub fn start(&self) {
        self.acts.start();
    }

    pub fn start_from(&self, index: usize) {
        self.acts.start_from(index);
    }

    pub fn go_to_act(&self, index: usize) {
        self.acts.go_to(index);
    }

    pub fn skip_to_next_act(&self) {
        self.acts.skip_to_next();
    }

    /// Stops the chapter, its current act and that act's current cut.
    pub fn stop(&self) {
        self.acts.stop();
    }

    pub fn restart(&self) {
        self.acts.restart();
    }
}

impl Playable for ChapterController {
    const LEVEL: Level = Level::Chapter;

    fn name(&self) -> &str {
        &self.chapter.name
    }

    fn start(&self) {
        ChapterController::start(self);
    }

    fn stop(&self) {
        ChapterController::stop(self);
    }

    fn is_playing(&self) -> bool {
        ChapterController::is_playing(self)
    }

    fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.acts.subscribe()
    }
}
