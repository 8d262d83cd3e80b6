//! In-memory repository provider

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{
    Billing, BillingRepository, Dispenser, DispenserRepository, DomainError, DomainResult,
    RepositoryProvider, UsageSession, UsageSessionRepository,
};

/// In-memory storage for development and testing
pub struct InMemoryRepositoryProvider {
    dispensers: InMemoryDispensers,
    usage_sessions: InMemoryUsageSessions,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            dispensers: InMemoryDispensers {
                rows: DashMap::new(),
                counter: AtomicI32::new(1),
            },
            usage_sessions: InMemoryUsageSessions {
                rows: DashMap::new(),
                counter: AtomicI32::new(1),
            },
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn dispensers(&self) -> &dyn DispenserRepository {
        &self.dispensers
    }

    fn usage_sessions(&self) -> &dyn UsageSessionRepository {
        &self.usage_sessions
    }

    fn billing(&self) -> &dyn BillingRepository {
        self
    }
}

pub struct InMemoryDispensers {
    rows: DashMap<i32, Dispenser>,
    counter: AtomicI32,
}

#[async_trait]
impl DispenserRepository for InMemoryDispensers {
    async fn create(&self, flow_rate: f64) -> DomainResult<Dispenser> {
        let dispenser = Dispenser {
            id: self.counter.fetch_add(1, Ordering::SeqCst),
            flow_rate,
            amount: None,
            created_at: Utc::now(),
        };
        self.rows.insert(dispenser.id, dispenser.clone());
        Ok(dispenser)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Dispenser>> {
        Ok(self.rows.get(&id).map(|d| d.clone()))
    }
}

pub struct InMemoryUsageSessions {
    rows: DashMap<i32, UsageSession>,
    counter: AtomicI32,
}

impl InMemoryUsageSessions {
    fn of_dispenser(&self, dispenser_id: i32) -> Vec<UsageSession> {
        let mut sessions: Vec<UsageSession> = self
            .rows
            .iter()
            .filter(|e| e.dispenser_id == dispenser_id)
            .map(|e| e.value().clone())
            .collect();
        sessions.sort_by_key(|s| s.id);
        sessions
    }
}

#[async_trait]
impl UsageSessionRepository for InMemoryUsageSessions {
    async fn find_by_dispenser(&self, dispenser_id: i32) -> DomainResult<Vec<UsageSession>> {
        Ok(self.of_dispenser(dispenser_id))
    }

    async fn find_last_by_dispenser(&self, dispenser_id: i32) -> DomainResult<Option<UsageSession>> {
        Ok(self.of_dispenser(dispenser_id).pop())
    }

    async fn insert(&self, mut session: UsageSession) -> DomainResult<UsageSession> {
        session.id = self.counter.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update(&self, session: &UsageSession) -> DomainResult<()> {
        let mut row = self.rows.get_mut(&session.id).ok_or_else(|| DomainError::NotFound {
            entity: "UsageSession",
            field: "id",
            value: session.id.to_string(),
        })?;
        *row = session.clone();
        Ok(())
    }
}

#[async_trait]
impl BillingRepository for InMemoryRepositoryProvider {
    async fn save_billing(&self, billing: &Billing) -> DomainResult<()> {
        let mut dispenser = self
            .dispensers
            .rows
            .get_mut(&billing.dispenser_id)
            .ok_or_else(|| DomainError::dispenser_not_found(billing.dispenser_id))?;

        for session in &billing.sessions {
            if let Some(mut row) = self.usage_sessions.rows.get_mut(&session.id) {
                row.total_spent = session.total_spent;
            }
        }
        dispenser.amount = Some(billing.total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let repos = InMemoryRepositoryProvider::new();
        let a = repos.dispensers().create(0.1).await.unwrap();
        let b = repos.dispensers().create(0.2).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let s1 = repos
            .usage_sessions()
            .insert(UsageSession::open(a.id, Utc::now()))
            .await
            .unwrap();
        let s2 = repos
            .usage_sessions()
            .insert(UsageSession::open(a.id, Utc::now()))
            .await
            .unwrap();
        assert!(s1.id < s2.id);

        let last = repos
            .usage_sessions()
            .find_last_by_dispenser(a.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, s2.id);
        assert!(repos
            .usage_sessions()
            .find_last_by_dispenser(b.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn updating_a_missing_session_fails() {
        let repos = InMemoryRepositoryProvider::new();
        let err = repos
            .usage_sessions()
            .update(&UsageSession::open(1, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
