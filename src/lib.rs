//! # Dispenser billing service
//!
//! Tracks open/close sessions of beer taps and bills them by elapsed time
//! and flow rate.
//!
//! ## Architecture
//!
//! - **domain**: Dispenser and usage session entities, repository traits
//! - **application**: Session ledger, billing calculator, `DispenserService`
//! - **infrastructure**: SeaORM persistence, in-memory storage, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Errors and graceful shutdown
//! - **server**: Runtime lifecycle used by the CLI binary

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;
