//! SeaORM implementation of DispenserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, Set};
use tracing::debug;

use super::{db_err, parse_amount};
use crate::domain::{Dispenser, DispenserRepository, DomainResult};
use crate::infrastructure::database::entities::dispenser;

fn entity_to_domain(m: dispenser::Model) -> DomainResult<Dispenser> {
    Ok(Dispenser {
        id: m.id,
        flow_rate: m.flow_volume,
        amount: parse_amount(m.amount)?,
        created_at: m.created_at,
    })
}

pub struct SeaOrmDispenserRepository {
    db: DatabaseConnection,
}

impl SeaOrmDispenserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DispenserRepository for SeaOrmDispenserRepository {
    async fn create(&self, flow_rate: f64) -> DomainResult<Dispenser> {
        let model = dispenser::ActiveModel {
            id: NotSet,
            flow_volume: Set(flow_rate),
            amount: Set(None),
            created_at: Set(Utc::now()),
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        debug!(dispenser_id = result.id, "Dispenser row inserted");
        entity_to_domain(result)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Dispenser>> {
        let model = dispenser::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }
}
