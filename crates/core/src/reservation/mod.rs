//! Seat sales and cancellations.
//!
//! A sale is planned in pure code from rows the caller has locked:
//!
//! 1. [`ReservationPlanner::validate_request`] checks the request shape.
//! 2. The caller locks trips in [`lock_order`], then the wallet, then the
//!    cash session.
//! 3. [`ReservationPlanner::plan_sale`] prices each passenger, settles it
//!    against the wallet or the payment method, and checks capacity.
//! 4. The caller persists the plan, [`sale_lines`], the wallet and the seat
//!    counts in the same transaction.
//!
//! Cancellation follows the same pattern through [`plan_cancellation`].

pub mod cancellation;
pub mod confirmation;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod planner;
pub mod reference;
pub mod types;

#[cfg(test)]
mod planner_props;

pub use cancellation::{CancellationActor, CancellationPlan, plan_cancellation, trips_held};
pub use confirmation::{BookingConfirmation, ConfirmationTicket};
pub use error::BookingError;
pub use inventory::{SeatRestore, lock_order, restore_seats, take_seats};
pub use ledger::{refund_line, sale_lines};
pub use planner::{DEFAULT_MAX_PASSENGERS, Leg, ReservationPlanner};
pub use reference::generate_reference;
pub use types::{
    BookingSnapshot, BookingStatus, LedgerLine, PassengerInput, PaymentMethod, SalePlan,
    SaleRequest, Settlement, TicketPlan, TicketSnapshot, TicketStatus, TransactionStatus,
    TripSnapshot, TripStatus,
};
