//! Storyreel host: plays one story document headlessly.
//!
//! Configuration comes from environment variables; collaborator calls and
//! playback signals are written to the log.

pub mod config;
pub mod error;
pub mod runner;
pub mod services;
