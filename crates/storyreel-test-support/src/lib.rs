//! Shared test doubles for the storyreel crates.

mod clock;
mod scenes;
mod services;
mod signals;

pub use clock::FixedClock;
pub use scenes::{FailingSceneLoader, InMemorySceneLoader};
pub use services::{CallLog, RecordingServices, ServiceCall};
pub use signals::SignalLog;
