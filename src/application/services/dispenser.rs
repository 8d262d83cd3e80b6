//! Dispenser business logic service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use super::billing::BillingCalculator;
use super::ledger::{apply_transition, Transition};
use crate::domain::{
    Billing, Dispenser, DomainError, DomainResult, ErrorKind, RepositoryProvider, TapState,
    TapStatus, UsageSession,
};

/// Service for dispenser operations: registration, tap transitions and
/// spending reports.
///
/// Transitions and recomputes on the same dispenser are serialized; different
/// dispensers proceed in parallel.
pub struct DispenserService {
    repos: Arc<dyn RepositoryProvider>,
    calculator: BillingCalculator,
    locks: DashMap<i32, Arc<Mutex<()>>>,
}

impl DispenserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self::with_calculator(repos, BillingCalculator::default())
    }

    pub fn with_calculator(repos: Arc<dyn RepositoryProvider>, calculator: BillingCalculator) -> Self {
        Self {
            repos,
            calculator,
            locks: DashMap::new(),
        }
    }

    async fn lock(&self, dispenser_id: i32) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(dispenser_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Register a new dispenser with the given flow rate.
    pub async fn create(&self, flow_rate: f64) -> DomainResult<Dispenser> {
        Dispenser::validate_flow_rate(flow_rate)?;

        let dispenser = self.repos.dispensers().create(flow_rate).await?;

        metrics::counter!("dispensers_created_total").increment(1);
        info!(dispenser_id = dispenser.id, flow_rate, "Dispenser created");

        Ok(dispenser)
    }

    pub async fn find(&self, dispenser_id: i32) -> DomainResult<Dispenser> {
        self.repos
            .dispensers()
            .find_by_id(dispenser_id)
            .await?
            .ok_or_else(|| DomainError::dispenser_not_found(dispenser_id))
    }

    /// The dispenser with its current tap state.
    pub async fn state(&self, dispenser_id: i32) -> DomainResult<(Dispenser, TapState)> {
        let dispenser = self.find(dispenser_id).await?;
        let last = self
            .repos
            .usage_sessions()
            .find_last_by_dispenser(dispenser_id)
            .await?;
        Ok((dispenser, TapState::from_last(last.as_ref())))
    }

    /// Open or close the tap of a dispenser at `at`.
    ///
    /// Returns the session that was created or closed. The stored amounts
    /// are recomputed afterwards; a failed recompute is logged and leaves the
    /// accepted transition in place.
    pub async fn change_status(
        &self,
        dispenser_id: i32,
        status: TapStatus,
        at: DateTime<Utc>,
    ) -> DomainResult<UsageSession> {
        let result = self.change_status_checked(dispenser_id, status, at).await;
        let outcome = match &result {
            Ok(_) => "accepted",
            Err(e) if e.kind() == ErrorKind::Conflict => "rejected",
            Err(_) => "failed",
        };
        metrics::counter!(
            "dispenser_transitions_total",
            "status" => status.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    async fn change_status_checked(
        &self,
        dispenser_id: i32,
        status: TapStatus,
        at: DateTime<Utc>,
    ) -> DomainResult<UsageSession> {
        // Unknown ids never get a lock entry.
        self.find(dispenser_id).await?;
        let _guard = self.lock(dispenser_id).await;

        let session = self.transition_locked(dispenser_id, status, at).await?;

        info!(
            dispenser_id,
            session_id = session.id,
            status = %status,
            at = %at,
            "Tap status changed"
        );

        self.refresh_amounts_locked(dispenser_id).await;
        Ok(session)
    }

    async fn refresh_amounts_locked(&self, dispenser_id: i32) {
        let refreshed = match self.find(dispenser_id).await {
            Ok(dispenser) => self.recompute_locked(&dispenser).await,
            Err(e) => Err(e),
        };
        match refreshed {
            Ok(billing) => debug!(dispenser_id, total = %billing.total, "Amounts recomputed"),
            Err(e) if e.kind() == ErrorKind::DataIntegrity => {
                warn!(dispenser_id, error = %e, "Stored amounts left unchanged");
            }
            Err(e) => error!(dispenser_id, error = %e, "Failed to store recomputed amounts"),
        }
    }

    async fn transition_locked(
        &self,
        dispenser_id: i32,
        status: TapStatus,
        at: DateTime<Utc>,
    ) -> DomainResult<UsageSession> {
        let dispenser = self.find(dispenser_id).await?;
        let sessions = self.repos.usage_sessions();

        let last: Vec<UsageSession> = sessions
            .find_last_by_dispenser(dispenser_id)
            .await?
            .into_iter()
            .collect();

        match apply_transition(&dispenser, &last, status, at)? {
            Transition::Opened(session) => sessions.insert(session).await,
            Transition::Closed(session) => {
                sessions.update(&session).await?;
                Ok(session)
            }
        }
    }

    /// Price every session of a dispenser without writing anything.
    pub async fn spending(&self, dispenser_id: i32) -> DomainResult<(Dispenser, Billing)> {
        let dispenser = self.find(dispenser_id).await?;
        let sessions = self
            .repos
            .usage_sessions()
            .find_by_dispenser(dispenser_id)
            .await?;
        let billing = self.calculator.price_sessions(&dispenser, sessions)?;
        Ok((dispenser, billing))
    }

    /// Recompute every session amount and the dispenser total, and store them.
    pub async fn recompute_and_persist(&self, dispenser_id: i32) -> DomainResult<Billing> {
        self.find(dispenser_id).await?;
        let _guard = self.lock(dispenser_id).await;
        let dispenser = self.find(dispenser_id).await?;
        self.recompute_locked(&dispenser).await
    }

    async fn recompute_locked(&self, dispenser: &Dispenser) -> DomainResult<Billing> {
        let sessions = self
            .repos
            .usage_sessions()
            .find_by_dispenser(dispenser.id)
            .await?;
        let billing = self.calculator.price_sessions(dispenser, sessions)?;
        self.repos.billing().save_billing(&billing).await?;
        Ok(billing)
    }
}
