//! Dispenser repository interface

use async_trait::async_trait;

use super::model::Dispenser;
use crate::domain::DomainResult;

#[async_trait]
pub trait DispenserRepository: Send + Sync {
    /// Insert a new dispenser and return it with its assigned ID.
    async fn create(&self, flow_rate: f64) -> DomainResult<Dispenser>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Dispenser>>;
}
