use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::TapStatus;

/// Coarse classification of a [`DomainError`], used by the HTTP layer to
/// pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    DataIntegrity,
    Validation,
    Unauthorized,
    Internal,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Dispenser {dispenser_id} is not open yet")]
    NotOpenYet { dispenser_id: i32 },

    #[error("Dispenser {dispenser_id} is already in status {status}")]
    AlreadyInStatus { dispenser_id: i32, status: TapStatus },

    #[error(
        "Closing time {closed_at} is before opening time {opened_at} for dispenser {dispenser_id}"
    )]
    ClosedBeforeOpened {
        dispenser_id: i32,
        opened_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
    },

    #[error("Usage session {session_id} of dispenser {dispenser_id} was closed without being opened")]
    MissingOpeningTime { dispenser_id: i32, session_id: i32 },

    #[error("Flow rate {flow_rate} of dispenser {dispenser_id} cannot be billed")]
    UnbillableFlowRate { dispenser_id: i32, flow_rate: f64 },

    #[error("Amount owed by dispenser {dispenser_id} exceeds the supported range")]
    AmountOutOfRange { dispenser_id: i32 },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn dispenser_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "Dispenser",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::NotOpenYet { .. } | DomainError::AlreadyInStatus { .. } => {
                ErrorKind::Conflict
            }
            DomainError::ClosedBeforeOpened { .. }
            | DomainError::MissingOpeningTime { .. }
            | DomainError::UnbillableFlowRate { .. }
            | DomainError::AmountOutOfRange { .. } => ErrorKind::DataIntegrity,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Storage(_) => ErrorKind::Internal,
        }
    }
}
