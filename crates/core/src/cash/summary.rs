//! End-of-shift figures, computed from the bookings tagged with a session.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use navette_shared::types::CashSessionId;

use crate::cash::types::{CashSessionState, CashSessionStatus};
use crate::reservation::types::{BookingStatus, PaymentMethod};

/// One booking as seen by the shift summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBookingRow {
    /// Booking status.
    pub status: BookingStatus,
    /// Booking-level payment method.
    pub payment_method: PaymentMethod,
    /// Amount taken for the booking.
    pub total_amount: Decimal,
    /// Tickets on the booking.
    pub ticket_count: u32,
    /// Tickets paid from a wallet.
    pub wallet_covered_tickets: u32,
}

/// Aggregate report for one cash session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftSummary {
    /// Session ID.
    pub session_id: CashSessionId,
    /// Session status.
    pub status: CashSessionStatus,
    /// Opening float.
    pub opening_amount: Decimal,
    /// Running expected amount.
    pub expected_amount: Decimal,
    /// Declared count, once closed.
    pub closing_amount_declared: Option<Decimal>,
    /// Discrepancy, once closed.
    pub discrepancy_amount: Option<Decimal>,
    /// Confirmed bookings.
    pub confirmed_bookings: u32,
    /// Cancelled bookings.
    pub cancelled_bookings: u32,
    /// Tickets on confirmed bookings.
    pub ticket_count: u32,
    /// Wallet-covered tickets on confirmed bookings.
    pub wallet_covered_tickets: u32,
    /// Takings of confirmed bookings per payment method.
    pub totals_by_method: BTreeMap<PaymentMethod, Decimal>,
    /// Sum of `totals_by_method`.
    pub total_takings: Decimal,
}

impl ShiftSummary {
    /// Builds the summary for `session` from its bookings.
    #[must_use]
    pub fn compute(session: &CashSessionState, bookings: &[SessionBookingRow]) -> Self {
        let mut summary = Self {
            session_id: session.id,
            status: session.status,
            opening_amount: session.opening_amount,
            expected_amount: session.expected_amount,
            closing_amount_declared: session.closing_amount_declared,
            discrepancy_amount: session.discrepancy_amount,
            confirmed_bookings: 0,
            cancelled_bookings: 0,
            ticket_count: 0,
            wallet_covered_tickets: 0,
            totals_by_method: BTreeMap::new(),
            total_takings: Decimal::ZERO,
        };

        for row in bookings {
            match row.status {
                BookingStatus::Confirmed => {
                    summary.confirmed_bookings += 1;
                    summary.ticket_count += row.ticket_count;
                    summary.wallet_covered_tickets += row.wallet_covered_tickets;
                    *summary
                        .totals_by_method
                        .entry(row.payment_method)
                        .or_insert(Decimal::ZERO) += row.total_amount;
                    summary.total_takings += row.total_amount;
                }
                BookingStatus::Cancelled => summary.cancelled_bookings += 1,
                BookingStatus::Pending => {}
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use navette_shared::types::{CashDeskId, UserId};
    use rust_decimal_macros::dec;

    use super::*;

    fn session() -> CashSessionState {
        CashSessionState {
            id: CashSessionId::new(),
            desk_id: CashDeskId::new(),
            cashier_id: UserId::new(),
            status: CashSessionStatus::Open,
            opening_amount: dec!(10000),
            expected_amount: dec!(19000),
            closing_amount_declared: None,
            discrepancy_amount: None,
            opened_at: Utc::now(),
            closed_at: None,
            closed_by: None,
            notes: None,
        }
    }

    fn row(
        status: BookingStatus,
        payment_method: PaymentMethod,
        total_amount: Decimal,
        tickets: u32,
        covered: u32,
    ) -> SessionBookingRow {
        SessionBookingRow {
            status,
            payment_method,
            total_amount,
            ticket_count: tickets,
            wallet_covered_tickets: covered,
        }
    }

    #[test]
    fn test_summary_aggregates_confirmed_only() {
        let bookings = vec![
            row(BookingStatus::Confirmed, PaymentMethod::Cash, dec!(6000), 2, 0),
            row(BookingStatus::Confirmed, PaymentMethod::Cash, dec!(3000), 2, 1),
            row(BookingStatus::Confirmed, PaymentMethod::MobileMoney, dec!(3000), 1, 0),
            row(BookingStatus::Confirmed, PaymentMethod::Subscription, dec!(0), 1, 1),
            row(BookingStatus::Cancelled, PaymentMethod::Card, dec!(9000), 3, 0),
        ];

        let summary = ShiftSummary::compute(&session(), &bookings);

        assert_eq!(summary.confirmed_bookings, 4);
        assert_eq!(summary.cancelled_bookings, 1);
        assert_eq!(summary.ticket_count, 6);
        assert_eq!(summary.wallet_covered_tickets, 2);
        assert_eq!(summary.totals_by_method[&PaymentMethod::Cash], dec!(9000));
        assert_eq!(summary.totals_by_method[&PaymentMethod::MobileMoney], dec!(3000));
        assert!(!summary.totals_by_method.contains_key(&PaymentMethod::Card));
        assert_eq!(summary.total_takings, dec!(12000));
        assert_eq!(summary.expected_amount, dec!(19000));
    }

    #[test]
    fn test_empty_shift() {
        let summary = ShiftSummary::compute(&session(), &[]);
        assert_eq!(summary.confirmed_bookings, 0);
        assert!(summary.totals_by_method.is_empty());
        assert_eq!(summary.total_takings, Decimal::ZERO);
    }
}
