//! Storyreel Core: shared narrative abstractions.
//!
//! This crate defines the story graph (Scene → Chapter → Act → Cut →
//! `CutEvent`), the collaborator traits the sequencer calls into, the named
//! dispatch registry and the playback signals observers receive. It contains
//! no scheduling code.

pub mod clock;
pub mod error;
pub mod geometry;
pub mod level;
pub mod registry;
pub mod services;
pub mod signal;
pub mod story;
