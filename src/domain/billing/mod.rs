//! Billing results and their persistence interface

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::usage::UsageSession;
use crate::domain::DomainResult;

/// Priced sessions of one dispenser.
///
/// Every session carries its computed `total_spent`; `total` is their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct Billing {
    pub dispenser_id: i32,
    pub total: Decimal,
    pub sessions: Vec<UsageSession>,
}

#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// Write every session amount and the dispenser total as one unit.
    async fn save_billing(&self, billing: &Billing) -> DomainResult<()>;
}
