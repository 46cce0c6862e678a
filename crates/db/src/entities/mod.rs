//! `SeaORM` entity definitions.

pub mod prelude;

pub mod bookings;
pub mod cash_desks;
pub mod cash_sessions;
pub mod ports;
pub mod pricing_rules;
pub mod routes;
pub mod sea_orm_active_enums;
pub mod ships;
pub mod subscription_plans;
pub mod subscriptions;
pub mod tickets;
pub mod transactions;
pub mod trips;
pub mod users;
