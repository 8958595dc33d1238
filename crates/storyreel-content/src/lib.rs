//! Storyreel: story content loading.
//!
//! Parses authored story documents, fingerprints them and checks them against
//! the host's dispatch registry before playback starts, so unknown names and
//! malformed timings surface at load time rather than mid-scene.

pub mod document;
pub mod error;
pub mod resources;
pub mod source;
pub mod validation;

pub use document::{DocumentFormat, StoryDocument};
pub use error::ContentError;
pub use resources::DirectorySceneLoader;
pub use source::{FileStorySource, StorySource};
pub use validation::{ValidationIssue, validate, validate_chapter};
