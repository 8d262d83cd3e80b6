//! Authentication module: token issuance for the operator account

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
