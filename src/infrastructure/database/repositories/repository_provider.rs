//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{BillingRepository, DispenserRepository, RepositoryProvider, UsageSessionRepository};

use super::billing_repository::SeaOrmBillingRepository;
use super::dispenser_repository::SeaOrmDispenserRepository;
use super::usage_session_repository::SeaOrmUsageSessionRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let dispenser = repos.dispensers().find_by_id(1).await?;
/// let sessions = repos.usage_sessions().find_by_dispenser(1).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    dispensers: SeaOrmDispenserRepository,
    usage_sessions: SeaOrmUsageSessionRepository,
    billing: SeaOrmBillingRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            dispensers: SeaOrmDispenserRepository::new(db.clone()),
            usage_sessions: SeaOrmUsageSessionRepository::new(db.clone()),
            billing: SeaOrmBillingRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn dispensers(&self) -> &dyn DispenserRepository {
        &self.dispensers
    }

    fn usage_sessions(&self) -> &dyn UsageSessionRepository {
        &self.usage_sessions
    }

    fn billing(&self) -> &dyn BillingRepository {
        &self.billing
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::application::DispenserService;
    use crate::domain::{Billing, DomainError, ErrorKind, TapStatus, UsageSession};
    use crate::infrastructure::database::migrator::Migrator;

    async fn provider() -> SeaOrmRepositoryProvider {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRepositoryProvider::new(db)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn dispenser_round_trips_through_sqlite() {
        let repos = provider().await;
        let created = repos.dispensers().create(0.0834).await.unwrap();
        assert!(created.id > 0);

        let found = repos.dispensers().find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.flow_rate, 0.0834);
        assert_eq!(found.amount, None);

        assert!(repos.dispensers().find_by_id(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_are_listed_in_insertion_order() {
        let repos = provider().await;
        let d = repos.dispensers().create(0.1).await.unwrap();
        let other = repos.dispensers().create(0.1).await.unwrap();
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

        let first = repos
            .usage_sessions()
            .insert(UsageSession::open(d.id, t0))
            .await
            .unwrap();
        repos
            .usage_sessions()
            .insert(UsageSession::open(other.id, t0))
            .await
            .unwrap();
        let second = repos
            .usage_sessions()
            .insert(UsageSession::open(d.id, t0 - Duration::days(1)))
            .await
            .unwrap();

        let sessions = repos.usage_sessions().find_by_dispenser(d.id).await.unwrap();
        assert_eq!(
            sessions.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let last = repos
            .usage_sessions()
            .find_last_by_dispenser(d.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, second.id);
        assert_eq!(last.opened_at, Some(t0 - Duration::days(1)));
    }

    #[tokio::test]
    async fn update_closes_a_session() {
        let repos = provider().await;
        let d = repos.dispensers().create(0.1).await.unwrap();
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

        let mut session = repos
            .usage_sessions()
            .insert(UsageSession::open(d.id, t0))
            .await
            .unwrap();
        session.closed_at = Some(t0 + Duration::seconds(10));
        repos.usage_sessions().update(&session).await.unwrap();

        let stored = repos
            .usage_sessions()
            .find_last_by_dispenser(d.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.closed_at, Some(t0 + Duration::seconds(10)));

        session.id = 999;
        let err = repos.usage_sessions().update(&session).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn save_billing_writes_session_amounts_and_total() {
        let repos = provider().await;
        let d = repos.dispensers().create(0.1).await.unwrap();
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

        let mut session = repos
            .usage_sessions()
            .insert(UsageSession::open(d.id, t0))
            .await
            .unwrap();
        session.total_spent = Some(dec("1.23"));

        repos
            .billing()
            .save_billing(&Billing {
                dispenser_id: d.id,
                total: dec("1.23"),
                sessions: vec![session.clone()],
            })
            .await
            .unwrap();

        let stored = repos.dispensers().find_by_id(d.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, Some(dec("1.23")));
        let sessions = repos.usage_sessions().find_by_dispenser(d.id).await.unwrap();
        assert_eq!(sessions[0].total_spent, Some(dec("1.23")));
    }

    #[tokio::test]
    async fn inverted_close_keeps_previous_totals_in_sqlite() {
        let repos = Arc::new(provider().await);
        let service = DispenserService::new(repos.clone());
        let d = service.create(0.1).await.unwrap();
        let opened = Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2021, 12, 20, 0, 0, 0).unwrap();

        service.change_status(d.id, TapStatus::Open, opened).await.unwrap();
        service.change_status(d.id, TapStatus::Close, closed).await.unwrap();

        let stored = repos.dispensers().find_by_id(d.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, Some(dec("1.23")));
        let sessions = repos.usage_sessions().find_by_dispenser(d.id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].closed_at, Some(closed));
        assert_eq!(sessions[0].total_spent, Some(dec("1.23")));

        let err = service.spending(d.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[tokio::test]
    async fn save_billing_for_unknown_dispenser_fails() {
        let repos = provider().await;
        let err = repos
            .billing()
            .save_billing(&Billing {
                dispenser_id: 42,
                total: Decimal::ZERO,
                sessions: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
