//! Usage session aggregate
//!
//! Contains the UsageSession entity, tap status/state types, and repository interface.

pub mod model;
pub mod repository;

pub use model::{TapState, TapStatus, UsageSession};
pub use repository::UsageSessionRepository;
