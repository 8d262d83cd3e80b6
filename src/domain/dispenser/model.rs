//! Dispenser domain entity

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::shared::errors::DomainError;

/// A beer tap with a fixed flow rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispenser {
    /// Unique dispenser ID (assigned by storage)
    pub id: i32,
    /// Flow volume in liters per second; immutable after creation
    pub flow_rate: f64,
    /// Total amount owed across all sessions, as of the last recompute
    pub amount: Option<Decimal>,
    /// When the dispenser was created
    pub created_at: DateTime<Utc>,
}

impl Dispenser {
    /// Reject flow rates that cannot bill anything meaningful.
    ///
    /// The rate must be positive and survive conversion to a decimal without
    /// collapsing to zero or overflowing.
    pub fn validate_flow_rate(flow_rate: f64) -> Result<(), DomainError> {
        if !flow_rate.is_finite() || flow_rate <= 0.0 {
            return Err(DomainError::Validation(format!(
                "flow rate must be a positive number, got {}",
                flow_rate
            )));
        }
        if billable_rate(flow_rate).is_none() {
            return Err(DomainError::Validation(format!(
                "flow rate {} is outside the billable range",
                flow_rate
            )));
        }
        Ok(())
    }

    /// Flow rate as a fixed-point decimal.
    pub fn flow_rate_decimal(&self) -> Result<Decimal, DomainError> {
        billable_rate(self.flow_rate).ok_or(DomainError::UnbillableFlowRate {
            dispenser_id: self.id,
            flow_rate: self.flow_rate,
        })
    }
}

fn billable_rate(flow_rate: f64) -> Option<Decimal> {
    Decimal::from_f64(flow_rate).filter(|d| d.is_sign_positive() && !d.is_zero())
}
