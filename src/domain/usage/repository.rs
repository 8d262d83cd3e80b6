//! Usage session repository interface

use async_trait::async_trait;

use super::model::UsageSession;
use crate::domain::DomainResult;

#[async_trait]
pub trait UsageSessionRepository: Send + Sync {
    /// All sessions of a dispenser in creation order.
    async fn find_by_dispenser(&self, dispenser_id: i32) -> DomainResult<Vec<UsageSession>>;
    /// The most recently created session of a dispenser.
    async fn find_last_by_dispenser(&self, dispenser_id: i32)
        -> DomainResult<Option<UsageSession>>;
    /// Insert a new session and return it with its assigned ID.
    async fn insert(&self, session: UsageSession) -> DomainResult<UsageSession>;
    /// Persist timestamps and amount of an existing session.
    async fn update(&self, session: &UsageSession) -> DomainResult<()>;
}
