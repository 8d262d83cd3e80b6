//! Session ledger
//!
//! Decides whether an open/close request is legal for a dispenser. Only the
//! last session of the sequence is inspected: a dispenser is `Idle` unless
//! its tail session has been opened and not closed.

use chrono::{DateTime, Utc};

use crate::domain::{Dispenser, DomainError, DomainResult, TapStatus, UsageSession};

/// Outcome of an accepted transition, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A new session to insert
    Opened(UsageSession),
    /// The tail session with `closed_at` set, to update in place
    Closed(UsageSession),
}

impl Transition {
    pub fn session(&self) -> &UsageSession {
        match self {
            Self::Opened(s) | Self::Closed(s) => s,
        }
    }

    pub fn status(&self) -> TapStatus {
        match self {
            Self::Opened(_) => TapStatus::Open,
            Self::Closed(_) => TapStatus::Close,
        }
    }
}

/// Apply `status` at `at` to the session sequence of `dispenser`.
///
/// `sessions` must be in creation order; only its last element matters.
pub fn apply_transition(
    dispenser: &Dispenser,
    sessions: &[UsageSession],
    status: TapStatus,
    at: DateTime<Utc>,
) -> DomainResult<Transition> {
    let dispenser_id = dispenser.id;

    let Some(last) = sessions.last() else {
        return match status {
            TapStatus::Open => Ok(Transition::Opened(UsageSession::open(dispenser_id, at))),
            TapStatus::Close => Err(DomainError::NotOpenYet { dispenser_id }),
        };
    };

    match (status, last.opened_at, last.closed_at) {
        (TapStatus::Open, Some(_), Some(_)) => {
            Ok(Transition::Opened(UsageSession::open(dispenser_id, at)))
        }
        (TapStatus::Close, None, _) => Err(DomainError::NotOpenYet { dispenser_id }),
        (TapStatus::Open, Some(_), None) | (TapStatus::Close, Some(_), Some(_)) => {
            Err(DomainError::AlreadyInStatus {
                dispenser_id,
                status,
            })
        }
        (TapStatus::Close, Some(_), None) => {
            let mut closed = last.clone();
            closed.closed_at = Some(at);
            Ok(Transition::Closed(closed))
        }
        // A tail that was never opened holds no running interval.
        (TapStatus::Open, None, _) => Ok(Transition::Opened(UsageSession::open(dispenser_id, at))),
    }
}
