//! Dispenser module: registration, tap transitions and spending reports

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
