//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult};

pub mod billing_repository;
pub mod dispenser_repository;
pub mod repository_provider;
pub mod usage_session_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

/// Amounts are stored as decimal strings to keep them exact.
pub(crate) fn parse_amount(raw: Option<String>) -> DomainResult<Option<Decimal>> {
    raw.map(|s| {
        Decimal::from_str(&s)
            .map_err(|e| DomainError::Storage(format!("Invalid stored amount '{}': {}", s, e)))
    })
    .transpose()
}
