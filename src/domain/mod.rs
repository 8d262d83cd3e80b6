pub mod billing;
pub mod dispenser;
pub mod repositories;
pub mod usage;

// Re-export commonly used types
pub use billing::{Billing, BillingRepository};
pub use dispenser::{Dispenser, DispenserRepository};
pub use repositories::{DomainResult, RepositoryProvider};
pub use usage::{TapState, TapStatus, UsageSession, UsageSessionRepository};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::{DomainError, ErrorKind};
