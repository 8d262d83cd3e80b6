//! Usage session entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One open-to-close interval of a dispenser's tap
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub dispenser_id: i32,

    pub opened_at: Option<DateTime<Utc>>,

    pub closed_at: Option<DateTime<Utc>>,

    /// Amount owed as a decimal string
    pub total_spent: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dispenser::Entity",
        from = "Column::DispenserId",
        to = "super::dispenser::Column::Id",
        on_delete = "Cascade"
    )]
    Dispenser,
}

impl Related<super::dispenser::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dispenser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
