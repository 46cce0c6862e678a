//! Reservation domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use navette_shared::types::{BookingId, RouteId, SubscriptionId, TicketId, TripId, UserId};

use crate::auth::GuestAccountRequest;
use crate::cash::DeskContext;
use crate::pricing::{FareSource, NationalityGroup, PassengerType, PricingRule, TripFareTable};
use crate::wallet::WalletCharge;

/// How a booking, ticket or ledger entry was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at a desk.
    Cash,
    /// Bank card.
    Card,
    /// Mobile money transfer.
    MobileMoney,
    /// Drawn from a subscription wallet.
    Subscription,
}

string_enum!(PaymentMethod, "payment method" {
    Cash => "cash",
    Card => "card",
    MobileMoney => "mobile_money",
    Subscription => "subscription",
});

/// Trip lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Open for sale.
    Scheduled,
    /// Boarding; still open for sale.
    Boarding,
    /// Left port.
    Departed,
    /// Reached port.
    Arrived,
    /// Cancelled by the operator.
    Cancelled,
}

string_enum!(TripStatus, "trip status" {
    Scheduled => "scheduled",
    Boarding => "boarding",
    Departed => "departed",
    Arrived => "arrived",
    Cancelled => "cancelled",
});

impl TripStatus {
    /// Returns true if seats may be sold.
    #[must_use]
    pub const fn is_bookable(self) -> bool {
        matches!(self, Self::Scheduled | Self::Boarding)
    }
}

/// Booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Sold.
    Confirmed,
    /// Cancelled; rows stay as audit trail.
    Cancelled,
    /// Awaiting an external payment.
    Pending,
}

string_enum!(BookingStatus, "booking status" {
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Pending => "pending",
});

/// Ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Sold, not yet boarded.
    Issued,
    /// Passenger on board.
    Boarded,
    /// Cancelled.
    Cancelled,
    /// Voyage completed.
    Used,
}

string_enum!(TicketStatus, "ticket status" {
    Issued => "issued",
    Boarded => "boarded",
    Cancelled => "cancelled",
    Used => "used",
});

impl TicketStatus {
    /// Active tickets hold a seat.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Ledger entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Not yet settled, e.g. a refund obligation.
    Pending,
    /// Settled.
    Completed,
    /// Failed.
    Failed,
}

string_enum!(TransactionStatus, "transaction status" {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

/// A trip row as read under lock, with what is needed to price it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSnapshot {
    /// Trip ID.
    pub id: TripId,
    /// Route the trip sails.
    pub route_id: RouteId,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Scheduled departure.
    pub departure_time: DateTime<Utc>,
    /// Seats left.
    pub available_seats: u32,
    /// Ship capacity.
    pub capacity: u32,
    /// Override fare table.
    pub fare_table: Option<TripFareTable>,
    /// Route-level pricing rules.
    pub pricing_rules: Vec<PricingRule>,
}

/// One passenger in a sale request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PassengerInput {
    /// Name printed on the ticket.
    pub name: String,
    /// Passenger type.
    pub passenger_type: PassengerType,
    /// Nationality group.
    pub nationality_group: NationalityGroup,
    /// Whether this passenger owns the referenced wallet.
    #[serde(default)]
    pub is_wallet_holder: bool,
}

/// A sale, self-service or at a desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    /// Outbound trip.
    pub trip_id: TripId,
    /// Return trip, for round trips.
    pub return_trip_id: Option<TripId>,
    /// Passengers in listed order.
    pub passengers: Vec<PassengerInput>,
    /// Method for whatever the wallet does not cover.
    pub payment_method: PaymentMethod,
    /// Wallet to draw from.
    pub subscription_id: Option<SubscriptionId>,
    /// Point-of-sale context.
    pub desk: Option<DeskContext>,
    /// Authenticated buyer.
    pub purchaser: Option<UserId>,
    /// Account to create for an anonymous buyer.
    pub guest_account: Option<GuestAccountRequest>,
    /// Seller recorded as `created_by`.
    pub seller: Option<UserId>,
}

/// How one ticket is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    /// Paid in full by cash, card or mobile money.
    FullPrice {
        /// Payment method.
        method: PaymentMethod,
        /// Amount paid.
        amount: Decimal,
    },
    /// Paid in full from a wallet.
    WalletCovered {
        /// Wallet drawn from.
        subscription_id: SubscriptionId,
        /// What the wallet gave up.
        charge: WalletCharge,
        /// Fare value covered.
        amount: Decimal,
    },
}

impl Settlement {
    /// Amount the purchaser actually pays for this ticket.
    #[must_use]
    pub const fn price_paid(&self) -> Decimal {
        match self {
            Self::FullPrice { amount, .. } => *amount,
            Self::WalletCovered { .. } => Decimal::ZERO,
        }
    }

    /// Returns true if the wallet paid.
    #[must_use]
    pub const fn is_wallet_covered(&self) -> bool {
        matches!(self, Self::WalletCovered { .. })
    }
}

/// A ticket about to be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketPlan {
    /// Ticket ID.
    pub id: TicketId,
    /// Passenger name.
    pub passenger_name: String,
    /// Passenger type.
    pub passenger_type: PassengerType,
    /// Nationality group.
    pub nationality_group: NationalityGroup,
    /// Outbound trip.
    pub trip_id: TripId,
    /// Return trip.
    pub return_trip_id: Option<TripId>,
    /// Full fare, both legs summed.
    pub fare_amount: Decimal,
    /// How the ticket is paid.
    pub settlement: Settlement,
    /// Where the outbound fare came from.
    pub outbound_source: FareSource,
    /// Where the return fare came from.
    pub return_source: Option<FareSource>,
}

/// A fully priced sale, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalePlan {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Tickets in passenger order.
    pub tickets: Vec<TicketPlan>,
    /// Amount payable by cash, card or mobile money.
    pub payable_total: Decimal,
    /// Fare value covered by the wallet.
    pub wallet_covered_total: Decimal,
    /// Booking-level payment method.
    pub payment_method: PaymentMethod,
}

impl SalePlan {
    /// Number of seats taken on each leg.
    #[must_use]
    pub fn seat_count(&self) -> u32 {
        u32::try_from(self.tickets.len()).unwrap_or(u32::MAX)
    }

    /// Tickets paid from the wallet.
    pub fn wallet_tickets(&self) -> impl Iterator<Item = &TicketPlan> {
        self.tickets.iter().filter(|t| t.settlement.is_wallet_covered())
    }
}

/// A ledger entry to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    /// Signed amount; negative for refunds.
    pub amount: Decimal,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Entry status.
    pub status: TransactionStatus,
    /// Wallet involved.
    pub subscription_id: Option<SubscriptionId>,
    /// Voyage credits consumed.
    pub credits_used: u32,
    /// Human-readable description.
    pub description: String,
}

/// A ticket as read back for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    /// Ticket ID.
    pub id: TicketId,
    /// Outbound trip.
    pub trip_id: TripId,
    /// Return trip.
    pub return_trip_id: Option<TripId>,
    /// Status.
    pub status: TicketStatus,
    /// Amount paid.
    pub price_paid: Decimal,
}

/// A booking as read back for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSnapshot {
    /// Booking ID.
    pub id: BookingId,
    /// Booking reference.
    pub reference: String,
    /// Status.
    pub status: BookingStatus,
    /// Owning user.
    pub owner_id: Option<UserId>,
    /// Seller.
    pub created_by: Option<UserId>,
    /// Booking-level payment method.
    pub payment_method: PaymentMethod,
    /// Outbound trip.
    pub trip_id: TripId,
    /// Tickets.
    pub tickets: Vec<TicketSnapshot>,
}
