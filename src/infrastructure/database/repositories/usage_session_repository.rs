//! SeaORM implementation of UsageSessionRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::{db_err, parse_amount};
use crate::domain::{DomainError, DomainResult, UsageSession, UsageSessionRepository};
use crate::infrastructure::database::entities::usage_session;

fn entity_to_domain(m: usage_session::Model) -> DomainResult<UsageSession> {
    Ok(UsageSession {
        id: m.id,
        dispenser_id: m.dispenser_id,
        opened_at: m.opened_at,
        closed_at: m.closed_at,
        total_spent: parse_amount(m.total_spent)?,
    })
}

pub struct SeaOrmUsageSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsageSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsageSessionRepository for SeaOrmUsageSessionRepository {
    async fn find_by_dispenser(&self, dispenser_id: i32) -> DomainResult<Vec<UsageSession>> {
        let models = usage_session::Entity::find()
            .filter(usage_session::Column::DispenserId.eq(dispenser_id))
            .order_by_asc(usage_session::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn find_last_by_dispenser(&self, dispenser_id: i32) -> DomainResult<Option<UsageSession>> {
        let model = usage_session::Entity::find()
            .filter(usage_session::Column::DispenserId.eq(dispenser_id))
            .order_by_desc(usage_session::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }

    async fn insert(&self, session: UsageSession) -> DomainResult<UsageSession> {
        let model = usage_session::ActiveModel {
            id: NotSet,
            dispenser_id: Set(session.dispenser_id),
            opened_at: Set(session.opened_at),
            closed_at: Set(session.closed_at),
            total_spent: Set(session.total_spent.map(|d| d.to_string())),
            created_at: Set(Utc::now()),
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        entity_to_domain(result)
    }

    async fn update(&self, session: &UsageSession) -> DomainResult<()> {
        let existing = usage_session::Entity::find_by_id(session.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "UsageSession",
                field: "id",
                value: session.id.to_string(),
            });
        };

        let mut model: usage_session::ActiveModel = existing.into();
        model.opened_at = Set(session.opened_at);
        model.closed_at = Set(session.closed_at);
        model.total_spent = Set(session.total_spent.map(|d| d.to_string()));
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
