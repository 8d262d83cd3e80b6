//! Usage session domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Requested tap status carried by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapStatus {
    Open,
    Close,
}

impl TapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for TapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TapStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            other => Err(format!("unknown tap status '{}'", other)),
        }
    }
}

/// Current state of a dispenser's tap, derived from its last session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapState {
    /// No session is open
    Idle,
    /// The last session has been opened and not closed yet
    Running,
}

impl TapState {
    /// Derive the state from the tail of a dispenser's session sequence.
    pub fn from_last(last: Option<&UsageSession>) -> Self {
        match last {
            Some(session) if session.is_open() => Self::Running,
            _ => Self::Idle,
        }
    }
}

/// One open-to-close interval of tap usage
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSession {
    /// Unique session ID; `0` until persisted
    pub id: i32,
    /// Owning dispenser (lookup key only)
    pub dispenser_id: i32,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Amount owed for this session, as of the last pricing
    pub total_spent: Option<Decimal>,
}

impl UsageSession {
    /// A new, not yet persisted session opened at `at`.
    pub fn open(dispenser_id: i32, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            dispenser_id,
            opened_at: Some(at),
            closed_at: None,
            total_spent: None,
        }
    }

    /// Opened and not closed yet.
    pub fn is_open(&self) -> bool {
        self.opened_at.is_some() && self.closed_at.is_none()
    }

    /// Both timestamps are set.
    pub fn is_closed(&self) -> bool {
        self.opened_at.is_some() && self.closed_at.is_some()
    }
}
