//! Load-time checks on a story graph.
//!
//! Empty child slots are deliberately not reported here: playback skips them
//! and keeps going. Validation only rejects what would otherwise fail silently
//! mid-scene: unusable timings, chapter references that do not match the
//! scene's mode, and hook or method names the host never registered.

use std::fmt;

use storyreel_core::registry::DispatchRegistry;
use storyreel_core::story::{Chapter, ChapterRef, Cut, CutEvent, CutEventKind, SceneGraph};

/// One problem found in a story graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location in the document, e.g. `chapters[0].acts[1].cuts[2]`.
    pub path: String,
    /// What is wrong.
    pub problem: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.problem)
    }
}

struct Validator<'a> {
    registry: Option<&'a DispatchRegistry>,
    issues: Vec<ValidationIssue>,
}

impl Validator<'_> {
    fn report(&mut self, path: &str, problem: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_owned(),
            problem: problem.into(),
        });
    }

    fn check_seconds(&mut self, path: &str, field: &str, value: f32) {
        if !value.is_finite() || value < 0.0 {
            self.report(
                path,
                format!("`{field}` must be a finite number of seconds >= 0, got {value}"),
            );
        }
    }

    fn scene(&mut self, scene: &SceneGraph) {
        for (index, slot) in scene.chapters.iter().enumerate() {
            let path = format!("chapters[{index}]");
            match (slot, scene.use_external_chapter_resources) {
                (None, _) => {}
                (Some(ChapterRef::Resource { resource }), true) => {
                    if resource.trim().is_empty() {
                        self.report(&path, "resource name is empty");
                    }
                }
                (Some(ChapterRef::Resource { resource }), false) => self.report(
                    &path,
                    format!(
                        "references resource `{resource}` but the scene does not use external chapter resources"
                    ),
                ),
                (Some(ChapterRef::Inline(_)), true) => self.report(
                    &path,
                    "inline chapter in a scene that loads chapters from external resources",
                ),
                (Some(ChapterRef::Inline(chapter)), false) => self.chapter(&path, chapter),
            }
        }
    }

    fn chapter(&mut self, path: &str, chapter: &Chapter) {
        for (act_index, act) in chapter.acts.iter().enumerate() {
            let Some(act) = act else { continue };
            for (cut_index, cut) in act.cuts.iter().enumerate() {
                if let Some(cut) = cut {
                    self.cut(&format!("{path}.acts[{act_index}].cuts[{cut_index}]"), cut);
                }
            }
        }
    }

    fn cut(&mut self, path: &str, cut: &Cut) {
        self.check_seconds(path, "duration", cut.duration_secs);
        let groups = [
            ("start_events", &cut.start_events),
            ("middle_events", &cut.middle_events),
            ("end_events", &cut.end_events),
        ];
        for (group, events) in groups {
            for (index, event) in events.iter().enumerate() {
                if let Some(event) = event {
                    self.event(&format!("{path}.{group}[{index}]"), event);
                }
            }
        }
    }

    fn event(&mut self, path: &str, event: &CutEvent) {
        self.check_seconds(path, "delay", event.delay_secs);
        self.check_seconds(path, "wait_after_execution", event.wait_after_execution_secs);

        let Some(registry) = self.registry else {
            return;
        };
        match &event.kind {
            CutEventKind::InvokeHooks { hook: Some(hook) } if !registry.has_hook(hook) => {
                self.report(path, format!("no hook registered under `{hook}`"));
            }
            CutEventKind::CallMethod {
                method: Some(method),
                ..
            } if !registry.has_method(method) => {
                self.report(path, format!("no method registered under `{method}`"));
            }
            _ => {}
        }
    }
}

/// Checks `scene` and, when `registry` is given, every hook and method name it
/// dispatches to.
///
/// Chapters behind external resources are not visible here; their content is
/// checked by whoever authors the resource.
///
/// # Errors
///
/// Returns every issue found, in document order.
pub fn validate(
    scene: &SceneGraph,
    registry: Option<&DispatchRegistry>,
) -> Result<(), Vec<ValidationIssue>> {
    let mut validator = Validator {
        registry,
        issues: Vec::new(),
    };
    validator.scene(scene);
    if validator.issues.is_empty() {
        Ok(())
    } else {
        Err(validator.issues)
    }
}

/// Checks a chapter loaded on its own, e.g. from an external scene resource.
/// Paths are rooted at `chapter`.
///
/// # Errors
///
/// Returns every issue found, in document order.
pub fn validate_chapter(
    chapter: &Chapter,
    registry: Option<&DispatchRegistry>,
) -> Result<(), Vec<ValidationIssue>> {
    let mut validator = Validator {
        registry,
        issues: Vec::new(),
    };
    validator.chapter("chapter", chapter);
    if validator.issues.is_empty() {
        Ok(())
    } else {
        Err(validator.issues)
    }
}
