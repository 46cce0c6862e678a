//! Entity re-exports.

pub use super::bookings::Entity as Bookings;
pub use super::cash_desks::Entity as CashDesks;
pub use super::cash_sessions::Entity as CashSessions;
pub use super::ports::Entity as Ports;
pub use super::pricing_rules::Entity as PricingRules;
pub use super::routes::Entity as Routes;
pub use super::ships::Entity as Ships;
pub use super::subscription_plans::Entity as SubscriptionPlans;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::tickets::Entity as Tickets;
pub use super::transactions::Entity as Transactions;
pub use super::trips::Entity as Trips;
pub use super::users::Entity as Users;
