//! `SeaORM` active enums mirroring the Postgres enum types, and their
//! conversions to the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use navette_core::auth as core_auth;
use navette_core::cash as core_cash;
use navette_core::pricing as core_pricing;
use navette_core::reservation as core_reservation;
use navette_core::wallet as core_wallet;

/// Maps a db enum to and from its core twin, variant for variant.
macro_rules! mirror_enum {
    ($db:ident <=> $core:path { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $(<$core>::$variant => Self::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "cashier")]
    Cashier,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
    #[sea_orm(string_value = "admin")]
    Admin,
}

mirror_enum!(UserRole <=> core_auth::UserRole { Customer, Cashier, Supervisor, Admin });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trip_status")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "boarding")]
    Boarding,
    #[sea_orm(string_value = "departed")]
    Departed,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

mirror_enum!(TripStatus <=> core_reservation::TripStatus {
    Scheduled, Boarding, Departed, Arrived, Cancelled
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "passenger_type")]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    #[sea_orm(string_value = "adult")]
    Adult,
    #[sea_orm(string_value = "child")]
    Child,
    #[sea_orm(string_value = "baby")]
    Baby,
}

mirror_enum!(PassengerType <=> core_pricing::PassengerType { Adult, Child, Baby });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "nationality_group")]
#[serde(rename_all = "snake_case")]
pub enum NationalityGroup {
    #[sea_orm(string_value = "national")]
    National,
    #[sea_orm(string_value = "resident")]
    Resident,
    #[sea_orm(string_value = "african")]
    African,
    #[sea_orm(string_value = "hors_afrique")]
    HorsAfrique,
}

mirror_enum!(NationalityGroup <=> core_pricing::NationalityGroup {
    National, Resident, African, HorsAfrique
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "pending")]
    Pending,
}

mirror_enum!(BookingStatus <=> core_reservation::BookingStatus { Confirmed, Cancelled, Pending });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_status")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[sea_orm(string_value = "issued")]
    Issued,
    #[sea_orm(string_value = "boarded")]
    Boarded,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "used")]
    Used,
}

mirror_enum!(TicketStatus <=> core_reservation::TicketStatus { Issued, Boarded, Cancelled, Used });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    #[sea_orm(string_value = "subscription")]
    Subscription,
}

mirror_enum!(PaymentMethod <=> core_reservation::PaymentMethod {
    Cash, Card, MobileMoney, Subscription
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

mirror_enum!(TransactionStatus <=> core_reservation::TransactionStatus {
    Pending, Completed, Failed
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_type")]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    #[sea_orm(string_value = "unlimited")]
    Unlimited,
    #[sea_orm(string_value = "counted")]
    Counted,
    #[sea_orm(string_value = "legacy")]
    Legacy,
}

mirror_enum!(CreditType <=> core_wallet::CreditType { Unlimited, Counted, Legacy });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "subscription_status")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "blocked")]
    Blocked,
    #[sea_orm(string_value = "expired")]
    Expired,
}

mirror_enum!(SubscriptionStatus <=> core_wallet::SubscriptionStatus { Active, Blocked, Expired });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cash_session_status")]
#[serde(rename_all = "snake_case")]
pub enum CashSessionStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "closed_admin")]
    ClosedAdmin,
}

mirror_enum!(CashSessionStatus <=> core_cash::CashSessionStatus { Open, Closed, ClosedAdmin });
