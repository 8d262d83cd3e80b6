//! SeaORM implementation of BillingRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};

use super::db_err;
use crate::domain::{Billing, BillingRepository, DomainError, DomainResult};
use crate::infrastructure::database::entities::{dispenser, usage_session};

pub struct SeaOrmBillingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBillingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillingRepository for SeaOrmBillingRepository {
    async fn save_billing(&self, billing: &Billing) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        for session in &billing.sessions {
            usage_session::Entity::update_many()
                .col_expr(
                    usage_session::Column::TotalSpent,
                    Expr::value(session.total_spent.map(|d| d.to_string())),
                )
                .filter(usage_session::Column::Id.eq(session.id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        let result = dispenser::Entity::update_many()
            .col_expr(
                dispenser::Column::Amount,
                Expr::value(Some(billing.total.to_string())),
            )
            .filter(dispenser::Column::Id.eq(billing.dispenser_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::dispenser_not_found(billing.dispenser_id));
        }

        txn.commit().await.map_err(db_err)
    }
}
