//! Session state management.
//!
//! This module contains the shared state holder:
//! - `manager`: the dependency-injected [`SessionManager`] and its
//!   observer event fan-out
//! - `error`: caller-visible mutation errors

pub mod error;
pub mod manager;

pub use error::SessionError;
pub use manager::{SessionEvent, SessionManager, SyncOrigin};
