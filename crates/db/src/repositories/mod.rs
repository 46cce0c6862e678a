//! Repository abstractions for data access.
//!
//! Repositories load rows into the core crate's snapshot types, run the
//! core rules on them and write the outcome back, holding row locks where a
//! shared counter is read and modified.

pub mod booking;
pub mod cash_session;
pub mod fare;
pub mod subscription;
pub mod trip;
pub mod user;

pub use booking::{BookingDetails, BookingRepository, BookingRepositoryError, CreatedBooking};
pub use cash_session::{CashSessionRepository, CashSessionRepositoryError};
pub use fare::{FareError, FareQuote, FareRepository};
pub use subscription::{SubscriptionError, SubscriptionRepository};
pub use trip::TripError;
pub use user::{UserError, UserRepository};
