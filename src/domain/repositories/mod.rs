//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::billing::BillingRepository;
use super::dispenser::DispenserRepository;
use super::usage::UsageSessionRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let dispenser = repos.dispensers().find_by_id(1).await?;
///     let last = repos.usage_sessions().find_last_by_dispenser(1).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn dispensers(&self) -> &dyn DispenserRepository;
    fn usage_sessions(&self) -> &dyn UsageSessionRepository;
    fn billing(&self) -> &dyn BillingRepository;
}
