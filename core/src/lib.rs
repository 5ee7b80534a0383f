//! Replay observer core: frame store, entity resolver, interpolation
//! engine, and playback timeline for the space-strategy replay viewer.
//!
//! The core is headless. Hosts feed it wall-clock deltas and commands,
//! and read back the displayed snapshot, the resolved selection, and
//! the event outbox.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod frame_store;
pub mod interpolation;
pub mod snapshot;
pub mod summary;
pub mod types;
