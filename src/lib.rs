//! Pomodoro Session Sync Library
//!
//! This library provides the core functionality for a Pomodoro timer whose
//! session state replicates across devices. It includes:
//! - Session state model and manager with a single conflict-gated apply path
//! - Local mirror (shared key-value files) for widget-speed reads
//! - Remote mirror client for the single shared cloud record
//! - Companion channel with message push and context-slot fallback
//! - Sync engine driving polling, triggers, and inbound companion messages
//! - Widget timeline construction
//! - CLI command parsing and display utilities

pub mod cli;
pub mod companion;
pub mod config;
pub mod mirror;
pub mod remote;
pub mod session;
pub mod sync;
pub mod types;
pub mod widget;

// Re-export commonly used types for convenience
pub use types::{SessionRecord, SessionState, DEFAULT_BREAK_SECONDS, DEFAULT_FOCUS_SECONDS};

// Re-export session manager types
pub use session::{SessionError, SessionEvent, SessionManager, SyncOrigin};

// Re-export capability interfaces
pub use companion::{CompanionChannel, CompanionError};
pub use mirror::{LocalMirror, MirrorError};
pub use remote::{RemoteError, RemoteStore};

// Re-export sync engine types
pub use sync::{SyncEngine, SyncTrigger, SyncTriggerHandle};

// Re-export widget types
pub use widget::{build_timeline, RefreshPolicy, Timeline, TimelineEntry};

// Re-export configuration types
pub use config::{AppConfig, ConfigError};
