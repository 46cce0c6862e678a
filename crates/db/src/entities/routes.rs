//! `SeaORM` Entity for routes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "routes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub departure_port_id: Uuid,
    pub arrival_port_id: Uuid,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ports::Entity",
        from = "Column::DeparturePortId",
        to = "super::ports::Column::Id"
    )]
    DeparturePort,
    #[sea_orm(
        belongs_to = "super::ports::Entity",
        from = "Column::ArrivalPortId",
        to = "super::ports::Column::Id"
    )]
    ArrivalPort,
    #[sea_orm(has_many = "super::trips::Entity")]
    Trips,
    #[sea_orm(has_many = "super::pricing_rules::Entity")]
    PricingRules,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::pricing_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PricingRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
