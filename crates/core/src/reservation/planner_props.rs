//! Property-based tests for sale planning and cancellation.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use navette_shared::types::{PricingRuleId, RouteId, SubscriptionId, TripId, UserId};

use crate::auth::UserRole;
use crate::pricing::{NationalityGroup, PassengerType, PricingRule};
use crate::reservation::cancellation::{CancellationActor, plan_cancellation};
use crate::reservation::inventory::{restore_seats, take_seats};
use crate::reservation::planner::ReservationPlanner;
use crate::reservation::types::{
    BookingSnapshot, BookingStatus, PassengerInput, PaymentMethod, SaleRequest, TicketSnapshot,
    TicketStatus, TripSnapshot, TripStatus,
};
use crate::wallet::{SubscriptionStatus, Wallet, WalletBalance};

fn arb_passenger_type() -> impl Strategy<Value = PassengerType> {
    prop_oneof![
        Just(PassengerType::Adult),
        Just(PassengerType::Child),
        Just(PassengerType::Baby),
    ]
}

fn arb_group() -> impl Strategy<Value = NationalityGroup> {
    prop_oneof![
        Just(NationalityGroup::National),
        Just(NationalityGroup::Resident),
        Just(NationalityGroup::African),
        Just(NationalityGroup::HorsAfrique),
    ]
}

fn arb_passenger() -> impl Strategy<Value = PassengerInput> {
    ("[A-Z][a-z]{2,10}", arb_passenger_type(), arb_group()).prop_map(
        |(name, passenger_type, nationality_group)| PassengerInput {
            name,
            passenger_type,
            nationality_group,
            is_wallet_holder: false,
        },
    )
}

/// A trip whose route prices every (type, group) pair.
fn trip(seats: u32, capacity: u32) -> TripSnapshot {
    let route_id = RouteId::new();
    let mut pricing_rules = Vec::new();
    for (pt, base) in [
        (PassengerType::Adult, 3000),
        (PassengerType::Child, 1500),
        (PassengerType::Baby, 0),
    ] {
        for group in [
            NationalityGroup::National,
            NationalityGroup::Resident,
            NationalityGroup::African,
            NationalityGroup::HorsAfrique,
        ] {
            pricing_rules.push(PricingRule {
                id: PricingRuleId::new(),
                route_id,
                passenger_type: pt,
                nationality_group: group,
                base_price: Decimal::from(base),
                tax_amount: Decimal::from(200),
                is_active: true,
            });
        }
    }

    TripSnapshot {
        id: TripId::new(),
        route_id,
        status: TripStatus::Scheduled,
        departure_time: Utc::now() + Duration::hours(3),
        available_seats: seats,
        capacity,
        fare_table: None,
        pricing_rules,
    }
}

fn request(trip_id: TripId, passengers: Vec<PassengerInput>) -> SaleRequest {
    SaleRequest {
        trip_id,
        return_trip_id: None,
        passengers,
        payment_method: PaymentMethod::Cash,
        subscription_id: None,
        desk: None,
        purchaser: None,
        guest_account: None,
        seller: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A sale succeeds exactly when the trip has room, and the seats left
    /// after it stay within `0..=capacity`.
    #[test]
    fn prop_capacity_is_never_exceeded(
        seats in 0u32..20,
        passengers in prop::collection::vec(arb_passenger(), 1..25),
    ) {
        let t = trip(seats, 20);
        let req = request(t.id, passengers);
        let result = ReservationPlanner::default().plan_sale(&req, &t, None, None, None, Utc::now());
        let count = u32::try_from(req.passengers.len()).unwrap();

        prop_assert_eq!(result.is_ok(), count <= seats);
        if result.is_ok() {
            let left = take_seats(seats, count).unwrap();
            prop_assert!(left <= t.capacity);
        }
    }

    /// The payable total is the sum of what each ticket pays, and no ticket
    /// pays more than its fare.
    #[test]
    fn prop_payable_is_sum_of_paid(
        passengers in prop::collection::vec(arb_passenger(), 1..10),
        credits in 0u32..12,
        multi in any::<bool>(),
    ) {
        let t = trip(50, 50);
        let owner = UserId::new();
        let mut wallet = Wallet {
            id: SubscriptionId::new(),
            owner_id: owner,
            status: SubscriptionStatus::Active,
            ends_at: Utc::now() + Duration::days(10),
            allow_multi_passenger: multi,
            balance: WalletBalance::Counted { remaining: credits },
        };
        let mut passengers = passengers;
        passengers[0].is_wallet_holder = true;
        let mut req = request(t.id, passengers);
        req.subscription_id = Some(wallet.id);

        let plan = ReservationPlanner::default()
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(owner), Utc::now())
            .unwrap();

        let paid: Decimal = plan.tickets.iter().map(|t| t.settlement.price_paid()).sum();
        prop_assert_eq!(plan.payable_total, paid);
        for ticket in &plan.tickets {
            prop_assert!(ticket.settlement.price_paid() <= ticket.fare_amount);
        }

        let covered = u32::try_from(plan.wallet_tickets().count()).unwrap();
        prop_assert_eq!(wallet.balance, WalletBalance::Counted { remaining: credits - covered });
        if !multi {
            prop_assert!(covered <= 1);
        }
    }

    /// Cancelling gives back exactly one seat per active ticket per leg,
    /// and restoring never exceeds capacity.
    #[test]
    fn prop_cancellation_restores_active_tickets(
        statuses in prop::collection::vec(
            prop_oneof![Just(TicketStatus::Issued), Just(TicketStatus::Cancelled), Just(TicketStatus::Boarded)],
            1..15,
        ),
        round_trip in any::<bool>(),
        available in 0u32..30,
    ) {
        let out = TripId::new();
        let back = TripId::new();
        let owner = UserId::new();
        let tickets: Vec<TicketSnapshot> = statuses
            .iter()
            .map(|status| TicketSnapshot {
                id: navette_shared::types::TicketId::new(),
                trip_id: out,
                return_trip_id: round_trip.then_some(back),
                status: *status,
                price_paid: Decimal::from(1000),
            })
            .collect();
        let active = u32::try_from(statuses.iter().filter(|s| s.is_active()).count()).unwrap();

        let booking = BookingSnapshot {
            id: navette_shared::types::BookingId::new(),
            reference: "NV-PROPTEST".to_string(),
            status: BookingStatus::Confirmed,
            owner_id: Some(owner),
            created_by: None,
            payment_method: PaymentMethod::Cash,
            trip_id: out,
            tickets,
        };
        let actor = CancellationActor { user_id: owner, role: UserRole::Customer };

        let plan = plan_cancellation(&booking, &actor, Utc::now() + Duration::hours(1), Utc::now())
            .unwrap();

        prop_assert_eq!(plan.seat_restores.get(&out).copied().unwrap_or(0), active);
        let expected_back = if round_trip { active } else { 0 };
        prop_assert_eq!(plan.seat_restores.get(&back).copied().unwrap_or(0), expected_back);

        let restored = restore_seats(available, 30, active);
        prop_assert!(restored.available <= 30);
    }
}
