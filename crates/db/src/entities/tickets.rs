//! `SeaORM` Entity for tickets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{NationalityGroup, PassengerType, TicketStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub return_trip_id: Option<Uuid>,
    pub passenger_name: String,
    pub passenger_type: PassengerType,
    pub nationality_group: NationalityGroup,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub fare_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub price_paid: Decimal,
    pub subscription_id: Option<Uuid>,
    pub status: TicketStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
