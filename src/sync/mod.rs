//! Sync engine for the session state.
//!
//! This module contains the intake side of synchronization:
//! - `engine`: the poll/trigger/companion intake loop

pub mod engine;

pub use engine::{SyncEngine, SyncTrigger, SyncTriggerHandle};
