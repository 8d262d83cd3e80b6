//! Billing calculator for dispenser usage sessions

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::domain::{Billing, Dispenser, DomainError, DomainResult, UsageSession};

/// Price per second of tap usage per unit of flow rate (12.25).
pub const PRICE_PER_SECOND: Decimal = Decimal::from_parts(1225, 0, 0, false, 2);

/// Flat amount billed for a session that is still running (1.23).
pub const OPEN_SESSION_AMOUNT: Decimal = Decimal::from_parts(123, 0, 0, false, 2);

/// Decimal places kept on computed amounts.
pub const AMOUNT_SCALE: u32 = 4;

/// Computes per-session amounts and the dispenser total.
#[derive(Debug, Clone)]
pub struct BillingCalculator {
    price_per_second: Decimal,
    open_session_amount: Decimal,
}

impl Default for BillingCalculator {
    fn default() -> Self {
        Self::new(PRICE_PER_SECOND, OPEN_SESSION_AMOUNT)
    }
}

impl BillingCalculator {
    pub fn new(price_per_second: Decimal, open_session_amount: Decimal) -> Self {
        Self {
            price_per_second,
            open_session_amount,
        }
    }

    /// Amount owed for one session.
    ///
    /// Running sessions get the flat open-session amount. Closed sessions
    /// are billed per whole second elapsed, sub-second precision dropped on
    /// both ends.
    pub fn price_session(&self, flow_rate: Decimal, session: &UsageSession) -> DomainResult<Decimal> {
        let Some(closed_at) = session.closed_at else {
            return Ok(self.open_session_amount);
        };
        let Some(opened_at) = session.opened_at else {
            return Err(DomainError::MissingOpeningTime {
                dispenser_id: session.dispenser_id,
                session_id: session.id,
            });
        };

        let seconds = elapsed_seconds(opened_at, closed_at);
        if seconds < 0 {
            return Err(DomainError::ClosedBeforeOpened {
                dispenser_id: session.dispenser_id,
                opened_at,
                closed_at,
            });
        }

        let amount = Decimal::from(seconds)
            .checked_mul(self.price_per_second)
            .and_then(|a| a.checked_mul(flow_rate))
            .ok_or_else(|| overflow(session.dispenser_id))?;

        Ok(amount.round_dp(AMOUNT_SCALE).normalize())
    }

    /// Price every session of `dispenser` and sum them.
    pub fn price_sessions(
        &self,
        dispenser: &Dispenser,
        sessions: Vec<UsageSession>,
    ) -> DomainResult<Billing> {
        let flow_rate = dispenser.flow_rate_decimal()?;
        let mut total = Decimal::ZERO;
        let mut priced = Vec::with_capacity(sessions.len());

        for mut session in sessions {
            let amount = self.price_session(flow_rate, &session)?;
            total = total
                .checked_add(amount)
                .ok_or_else(|| overflow(dispenser.id))?;
            session.total_spent = Some(amount);
            priced.push(session);
        }

        Ok(Billing {
            dispenser_id: dispenser.id,
            total: total.normalize(),
            sessions: priced,
        })
    }
}

fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to.trunc_subsecs(0) - from.trunc_subsecs(0)).num_seconds()
}

fn overflow(dispenser_id: i32) -> DomainError {
    DomainError::AmountOutOfRange { dispenser_id }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use chrono::{Duration, TimeZone};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn dispenser(flow_rate: f64) -> Dispenser {
        Dispenser {
            id: 1,
            flow_rate,
            amount: None,
            created_at: Utc::now(),
        }
    }

    fn session(opened: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> UsageSession {
        UsageSession {
            id: 1,
            dispenser_id: 1,
            opened_at: Some(opened),
            closed_at: closed,
            total_spent: None,
        }
    }

    #[test]
    fn constants_match_reference_prices() {
        assert_eq!(PRICE_PER_SECOND, dec("12.25"));
        assert_eq!(OPEN_SESSION_AMOUNT, dec("1.23"));
    }

    #[test]
    fn ten_seconds_at_tenth_of_a_liter() {
        let t1 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 10).unwrap();
        let billing = BillingCalculator::default()
            .price_sessions(&dispenser(0.1), vec![session(t1, Some(t2))])
            .unwrap();
        assert_eq!(billing.total, dec("12.25"));
        assert_eq!(billing.total.to_string(), "12.25");
        assert_eq!(billing.sessions[0].total_spent, Some(dec("12.25")));
    }

    #[test]
    fn sub_second_precision_is_dropped_on_both_ends() {
        let t1 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(900);
        let t2 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 10).unwrap() + Duration::milliseconds(100);
        let amount = BillingCalculator::default()
            .price_session(dec("0.1"), &session(t1, Some(t2)))
            .unwrap();
        assert_eq!(amount, dec("12.25"));
    }

    #[test]
    fn inversion_within_one_second_bills_zero() {
        let base = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let amount = BillingCalculator::default()
            .price_session(
                dec("0.1"),
                &session(base + Duration::milliseconds(500), Some(base + Duration::milliseconds(200))),
            )
            .unwrap();
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn running_session_gets_flat_amount() {
        let billing = BillingCalculator::default()
            .price_sessions(&dispenser(0.5), vec![session(Utc::now(), None)])
            .unwrap();
        assert_eq!(billing.total, dec("1.23"));
        assert_eq!(billing.sessions[0].total_spent, Some(dec("1.23")));
    }

    #[test]
    fn close_before_open_is_an_integrity_error() {
        let opened = Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2021, 12, 20, 0, 0, 0).unwrap();
        let err = BillingCalculator::default()
            .price_sessions(&dispenser(0.1), vec![session(opened, Some(closed))])
            .unwrap_err();
        assert!(matches!(err, DomainError::ClosedBeforeOpened { .. }));
    }

    #[test]
    fn closed_without_opening_time_is_an_integrity_error() {
        let s = UsageSession {
            id: 4,
            dispenser_id: 1,
            opened_at: None,
            closed_at: Some(Utc::now()),
            total_spent: None,
        };
        let err = BillingCalculator::default()
            .price_session(dec("0.1"), &s)
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingOpeningTime { session_id: 4, .. }));
    }

    #[test]
    fn total_sums_closed_and_running_sessions() {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let sessions = vec![
            session(t0, Some(t0 + Duration::seconds(100))),
            session(t0 + Duration::seconds(200), None),
        ];
        let billing = BillingCalculator::default()
            .price_sessions(&dispenser(0.0834), sessions)
            .unwrap();
        assert_eq!(billing.sessions[0].total_spent, Some(dec("102.165")));
        assert_eq!(billing.total, dec("103.395"));
        assert_eq!(billing.dispenser_id, 1);
    }

    #[test]
    fn overflowing_amount_is_out_of_range() {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let err = BillingCalculator::default()
            .price_session(Decimal::MAX, &session(t0, Some(t0 + Duration::seconds(10))))
            .unwrap_err();
        assert!(matches!(err, DomainError::AmountOutOfRange { dispenser_id: 1 }));
        assert_eq!(err.kind(), crate::domain::ErrorKind::DataIntegrity);
    }

    #[test]
    fn no_sessions_bill_zero() {
        let billing = BillingCalculator::default()
            .price_sessions(&dispenser(0.1), Vec::new())
            .unwrap();
        assert_eq!(billing.total, Decimal::ZERO);
        assert!(billing.sessions.is_empty());
    }
}
