//! Dispenser entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dispenser model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dispensers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Liters per second
    #[sea_orm(column_type = "Double")]
    pub flow_volume: f64,

    /// Total owed as a decimal string, set by the last recompute
    pub amount: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usage_session::Entity")]
    UsageSessions,
}

impl Related<super::usage_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
