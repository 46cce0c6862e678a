//! Sale validation and pricing.
//!
//! The planner turns a request plus the locked rows it touches (trips and an
//! optional wallet) into a [`SalePlan`]. It performs every check and every
//! computation of a sale; persisting the plan is left to the caller, inside
//! the same transaction that holds the locks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use navette_shared::types::{BookingId, TicketId, UserId};

use crate::pricing::{CategoryMatcher, KeywordMatcher, PricingResolver};
use crate::reservation::error::BookingError;
use crate::reservation::inventory::take_seats;
use crate::reservation::types::{
    PaymentMethod, SalePlan, SaleRequest, Settlement, TicketPlan, TripSnapshot,
};
use crate::wallet::{TripLegs, Wallet, WalletDrawdown, WalletError};

/// Default upper bound on passengers per booking.
pub const DEFAULT_MAX_PASSENGERS: usize = 50;

/// Which leg of a sale a trip is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Outbound.
    Outbound,
    /// Return.
    Return,
}

/// Plans sales against locked trip and wallet state.
#[derive(Debug, Clone)]
pub struct ReservationPlanner<M = KeywordMatcher> {
    resolver: PricingResolver<M>,
    max_passengers: usize,
}

impl Default for ReservationPlanner<KeywordMatcher> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSENGERS)
    }
}

impl ReservationPlanner<KeywordMatcher> {
    /// Creates a planner with the default fare resolver.
    #[must_use]
    pub const fn new(max_passengers: usize) -> Self {
        Self {
            resolver: PricingResolver::new(),
            max_passengers,
        }
    }
}

impl<M: CategoryMatcher> ReservationPlanner<M> {
    /// Creates a planner with a custom fare resolver.
    #[must_use]
    pub const fn with_resolver(resolver: PricingResolver<M>, max_passengers: usize) -> Self {
        Self {
            resolver,
            max_passengers,
        }
    }

    /// Returns the fare resolver.
    #[must_use]
    pub const fn resolver(&self) -> &PricingResolver<M> {
        &self.resolver
    }

    /// Checks the request shape. Runs before any row is locked.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Validation` describing the first problem.
    pub fn validate_request(&self, req: &SaleRequest) -> Result<(), BookingError> {
        let invalid = |msg: &str| Err(BookingError::Validation(msg.to_string()));

        if req.passengers.is_empty() {
            return invalid("at least one passenger is required");
        }
        if req.passengers.len() > self.max_passengers {
            return Err(BookingError::Validation(format!(
                "at most {} passengers per booking",
                self.max_passengers
            )));
        }
        if req.passengers.iter().any(|p| p.name.trim().is_empty()) {
            return invalid("passenger name cannot be empty");
        }
        if req.return_trip_id == Some(req.trip_id) {
            return invalid("return trip must differ from the outbound trip");
        }
        if req.passengers.iter().filter(|p| p.is_wallet_holder).count() > 1 {
            return invalid("at most one passenger can be the wallet holder");
        }
        if req.payment_method == PaymentMethod::Subscription && req.subscription_id.is_none() {
            return invalid("subscription payment requires a subscription");
        }
        if let Some(guest) = &req.guest_account {
            if req.purchaser.is_some() {
                return invalid("guest account cannot be requested while signed in");
            }
            guest
                .validate()
                .map_err(|e| BookingError::Validation(e.to_string()))?;
        }
        Ok(())
    }

    /// Checks that `trip` can take `seats` more passengers at `now`.
    ///
    /// # Errors
    ///
    /// Returns `TripNotBookable`, `PastDeparture`, or the capacity error for `leg`.
    pub fn check_trip(
        trip: &TripSnapshot,
        seats: u32,
        leg: Leg,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        if !trip.status.is_bookable() {
            return Err(BookingError::TripNotBookable {
                trip_id: trip.id,
                status: trip.status,
            });
        }
        if trip.departure_time <= now {
            return Err(BookingError::PastDeparture(trip.id));
        }
        if take_seats(trip.available_seats, seats).is_none() {
            return Err(match leg {
                Leg::Outbound => BookingError::InsufficientSeats {
                    trip_id: trip.id,
                    requested: seats,
                    available: trip.available_seats,
                },
                Leg::Return => BookingError::InsufficientSeatsReturn {
                    trip_id: trip.id,
                    requested: seats,
                    available: trip.available_seats,
                },
            });
        }
        Ok(())
    }

    /// Prices every passenger and settles each against the wallet or the
    /// request's payment method.
    ///
    /// `wallet` must be the subscription named by the request, read under
    /// lock; it is deducted in place. `owner` is the booking's owning user.
    ///
    /// # Errors
    ///
    /// Any trip, pricing or wallet failure. Nothing is partially applied to
    /// the caller's rows; on error the wallet should be discarded with the
    /// rolled-back transaction.
    pub fn plan_sale(
        &self,
        req: &SaleRequest,
        outbound: &TripSnapshot,
        return_trip: Option<&TripSnapshot>,
        wallet: Option<&mut Wallet>,
        owner: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<SalePlan, BookingError> {
        if outbound.id != req.trip_id || return_trip.map(|t| t.id) != req.return_trip_id {
            return Err(BookingError::Validation(
                "loaded trips do not match the request".to_string(),
            ));
        }

        let seats = u32::try_from(req.passengers.len())
            .map_err(|_| BookingError::Validation("too many passengers".to_string()))?;
        Self::check_trip(outbound, seats, Leg::Outbound, now)?;
        if let Some(ret) = return_trip {
            Self::check_trip(ret, seats, Leg::Return, now)?;
        }

        if let Some(id) = req.subscription_id
            && wallet.as_deref().is_none_or(|w| w.id != id)
        {
            return Err(BookingError::SubscriptionNotFound(id));
        }
        if let Some(w) = wallet.as_deref() {
            w.ensure_usable(now)?;
            w.ensure_owned_by(owner)?;
        }

        let legs = if return_trip.is_some() {
            TripLegs::RoundTrip
        } else {
            TripLegs::OneWay
        };
        let mut drawdown = wallet.map(WalletDrawdown::new);
        let mut tickets = Vec::with_capacity(req.passengers.len());

        for passenger in &req.passengers {
            let out = self.resolver.resolve_fare(
                outbound.fare_table.as_ref(),
                &outbound.pricing_rules,
                passenger.passenger_type,
                passenger.nationality_group,
            )?;
            let back = return_trip
                .map(|t| {
                    self.resolver.resolve_fare(
                        t.fare_table.as_ref(),
                        &t.pricing_rules,
                        passenger.passenger_type,
                        passenger.nationality_group,
                    )
                })
                .transpose()?;

            let fare_amount = out.amount + back.as_ref().map_or(Decimal::ZERO, |f| f.amount);

            let covered = drawdown.as_mut().and_then(|d| {
                let subscription_id = d.wallet().id;
                d.try_cover(passenger.is_wallet_holder, legs, fare_amount)
                    .map(|charge| Settlement::WalletCovered {
                        subscription_id,
                        charge,
                        amount: fare_amount,
                    })
            });

            let settlement = match covered {
                Some(s) => s,
                None if req.payment_method == PaymentMethod::Subscription
                    && fare_amount > Decimal::ZERO =>
                {
                    let id = drawdown
                        .as_ref()
                        .map(|d| d.wallet().id)
                        .or(req.subscription_id)
                        .ok_or_else(|| {
                            BookingError::Validation(
                                "subscription payment requires a subscription".to_string(),
                            )
                        })?;
                    return Err(WalletError::Insufficient(id).into());
                }
                None => Settlement::FullPrice {
                    method: req.payment_method,
                    amount: fare_amount,
                },
            };

            tickets.push(TicketPlan {
                id: TicketId::new(),
                passenger_name: passenger.name.trim().to_string(),
                passenger_type: passenger.passenger_type,
                nationality_group: passenger.nationality_group,
                trip_id: outbound.id,
                return_trip_id: return_trip.map(|t| t.id),
                fare_amount,
                settlement,
                outbound_source: out.source,
                return_source: back.map(|f| f.source),
            });
        }

        let payable_total: Decimal = tickets.iter().map(|t| t.settlement.price_paid()).sum();
        let wallet_covered_total: Decimal = tickets
            .iter()
            .filter(|t| t.settlement.is_wallet_covered())
            .map(|t| t.fare_amount)
            .sum();

        let payment_method = if payable_total > Decimal::ZERO || wallet_covered_total.is_zero() {
            req.payment_method
        } else {
            PaymentMethod::Subscription
        };

        Ok(SalePlan {
            booking_id: BookingId::new(),
            tickets,
            payable_total,
            wallet_covered_total,
            payment_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use navette_shared::types::{PricingRuleId, RouteId, SubscriptionId, TripId};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::auth::GuestAccountRequest;
    use crate::pricing::{FareCategory, NationalityGroup, PassengerType, PricingRule, TripFareTable};
    use crate::reservation::types::{PassengerInput, TripStatus};
    use crate::wallet::{SubscriptionStatus, WalletBalance, WalletCharge};

    fn trip(seats: u32, adult_fare: Decimal) -> TripSnapshot {
        let route_id = RouteId::new();
        TripSnapshot {
            id: TripId::new(),
            route_id,
            status: TripStatus::Scheduled,
            departure_time: Utc::now() + Duration::hours(6),
            available_seats: seats,
            capacity: 100,
            fare_table: None,
            pricing_rules: [NationalityGroup::National, NationalityGroup::HorsAfrique]
                .into_iter()
                .flat_map(|group| {
                    [
                        (PassengerType::Adult, adult_fare),
                        (PassengerType::Child, adult_fare / dec!(2)),
                    ]
                    .into_iter()
                    .map(move |(pt, price)| PricingRule {
                        id: PricingRuleId::new(),
                        route_id,
                        passenger_type: pt,
                        nationality_group: group,
                        base_price: price,
                        tax_amount: Decimal::ZERO,
                        is_active: true,
                    })
                })
                .collect(),
        }
    }

    fn passenger(name: &str, holder: bool) -> PassengerInput {
        PassengerInput {
            name: name.to_string(),
            passenger_type: PassengerType::Adult,
            nationality_group: NationalityGroup::National,
            is_wallet_holder: holder,
        }
    }

    fn request(outbound: &TripSnapshot, passengers: Vec<PassengerInput>) -> SaleRequest {
        SaleRequest {
            trip_id: outbound.id,
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

    fn counted_wallet(owner: UserId, remaining: u32, multi: bool) -> Wallet {
        Wallet {
            id: SubscriptionId::new(),
            owner_id: owner,
            status: SubscriptionStatus::Active,
            ends_at: Utc::now() + Duration::days(30),
            allow_multi_passenger: multi,
            balance: WalletBalance::Counted { remaining },
        }
    }

    #[test]
    fn test_validation_rules() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));

        assert!(planner.validate_request(&request(&t, vec![])).is_err());

        let mut too_many = request(&t, (0..51).map(|i| passenger(&format!("P{i}"), false)).collect());
        assert!(planner.validate_request(&too_many).is_err());
        too_many.passengers.truncate(50);
        assert!(planner.validate_request(&too_many).is_ok());

        assert!(planner.validate_request(&request(&t, vec![passenger("  ", false)])).is_err());

        let mut same_return = request(&t, vec![passenger("Awa", false)]);
        same_return.return_trip_id = Some(t.id);
        assert!(planner.validate_request(&same_return).is_err());

        let two_holders = request(&t, vec![passenger("Awa", true), passenger("Moussa", true)]);
        assert!(planner.validate_request(&two_holders).is_err());

        let mut sub_without_ref = request(&t, vec![passenger("Awa", true)]);
        sub_without_ref.payment_method = PaymentMethod::Subscription;
        assert!(planner.validate_request(&sub_without_ref).is_err());

        let mut guest_while_signed_in = request(&t, vec![passenger("Awa", false)]);
        guest_while_signed_in.purchaser = Some(UserId::new());
        guest_while_signed_in.guest_account = Some(GuestAccountRequest {
            email: "awa@example.sn".to_string(),
            full_name: "Awa Ndiaye".to_string(),
            phone: None,
            password: None,
        });
        assert!(planner.validate_request(&guest_while_signed_in).is_err());
        guest_while_signed_in.purchaser = None;
        assert!(planner.validate_request(&guest_while_signed_in).is_ok());
    }

    #[test]
    fn test_cash_sale_plan() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let req = request(&t, vec![passenger("Awa", false)]);

        let plan = planner.plan_sale(&req, &t, None, None, None, Utc::now()).unwrap();

        assert_eq!(plan.payable_total, dec!(3000));
        assert_eq!(plan.payment_method, PaymentMethod::Cash);
        assert_eq!(plan.tickets[0].fare_amount, dec!(3000));
        assert_eq!(plan.tickets[0].settlement.price_paid(), dec!(3000));
    }

    #[test]
    fn test_round_trip_sums_both_legs() {
        let planner = ReservationPlanner::default();
        let out = trip(10, dec!(3000));
        let mut back = trip(10, dec!(3500));
        back.fare_table = Some(TripFareTable {
            categories: vec![FareCategory {
                name: "Adulte National".to_string(),
                declared_type: "adult".to_string(),
                price: dec!(2500),
            }],
        });
        let mut req = request(&out, vec![passenger("Awa", false)]);
        req.return_trip_id = Some(back.id);

        let plan = planner
            .plan_sale(&req, &out, Some(&back), None, None, Utc::now())
            .unwrap();

        assert_eq!(plan.tickets[0].fare_amount, dec!(5500));
        assert_eq!(plan.tickets[0].return_trip_id, Some(back.id));
        assert_eq!(plan.payable_total, dec!(5500));
    }

    #[test]
    fn test_capacity_errors_per_leg() {
        let planner = ReservationPlanner::default();
        let out = trip(2, dec!(3000));
        let back = trip(1, dec!(3000));
        let mut req = request(&out, vec![passenger("Awa", false), passenger("Moussa", false)]);

        req.return_trip_id = Some(back.id);
        let err = planner
            .plan_sale(&req, &out, Some(&back), None, None, Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_SEATS_RETURN");

        req.passengers.push(passenger("Fatou", false));
        let err = planner
            .plan_sale(&req, &out, Some(&back), None, None, Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_SEATS");
    }

    #[test]
    fn test_departed_and_cancelled_trips() {
        let planner = ReservationPlanner::default();
        let mut t = trip(10, dec!(3000));
        t.departure_time = Utc::now() - Duration::minutes(1);
        let req = request(&t, vec![passenger("Awa", false)]);
        assert_eq!(
            planner.plan_sale(&req, &t, None, None, None, Utc::now()),
            Err(BookingError::PastDeparture(t.id))
        );

        t.departure_time = Utc::now() + Duration::hours(1);
        t.status = TripStatus::Cancelled;
        let err = planner.plan_sale(&req, &t, None, None, None, Utc::now()).unwrap_err();
        assert_eq!(err.error_code(), "TRIP_NOT_BOOKABLE");
    }

    #[test]
    fn test_holder_covered_companion_pays() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let owner = UserId::new();
        let mut wallet = counted_wallet(owner, 5, false);
        let mut req = request(&t, vec![passenger("Awa", true), passenger("Moussa", false)]);
        req.subscription_id = Some(wallet.id);

        let plan = planner
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(owner), Utc::now())
            .unwrap();

        assert!(plan.tickets[0].settlement.is_wallet_covered());
        assert_eq!(
            plan.tickets[1].settlement,
            Settlement::FullPrice {
                method: PaymentMethod::Cash,
                amount: dec!(3000)
            }
        );
        assert_eq!(plan.payable_total, dec!(3000));
        assert_eq!(plan.wallet_covered_total, dec!(3000));
        assert_eq!(plan.payment_method, PaymentMethod::Cash);
        assert_eq!(wallet.balance, WalletBalance::Counted { remaining: 4 });
    }

    #[test]
    fn test_round_trip_with_one_credit_pays_full_price() {
        let planner = ReservationPlanner::default();
        let out = trip(10, dec!(3000));
        let back = trip(10, dec!(3000));
        let owner = UserId::new();
        let mut wallet = counted_wallet(owner, 1, false);
        let mut req = request(&out, vec![passenger("Awa", true)]);
        req.return_trip_id = Some(back.id);
        req.subscription_id = Some(wallet.id);

        let plan = planner
            .plan_sale(&req, &out, Some(&back), Some(&mut wallet), Some(owner), Utc::now())
            .unwrap();

        assert_eq!(plan.payable_total, dec!(6000));
        assert!(!plan.tickets[0].settlement.is_wallet_covered());
        assert_eq!(wallet.balance, WalletBalance::Counted { remaining: 1 });
    }

    #[test]
    fn test_subscription_method_without_coverage_fails() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let owner = UserId::new();
        let mut wallet = counted_wallet(owner, 0, false);
        let mut req = request(&t, vec![passenger("Awa", true)]);
        req.subscription_id = Some(wallet.id);
        req.payment_method = PaymentMethod::Subscription;

        let err = planner
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(owner), Utc::now())
            .unwrap_err();
        assert_eq!(err, BookingError::Wallet(WalletError::Insufficient(wallet.id)));
    }

    #[test]
    fn test_fully_covered_sale_is_subscription_paid() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let owner = UserId::new();
        let mut wallet = counted_wallet(owner, 10, true);
        let mut req = request(&t, vec![passenger("Awa", false), passenger("Moussa", false)]);
        req.subscription_id = Some(wallet.id);
        req.payment_method = PaymentMethod::Subscription;

        let plan = planner
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(owner), Utc::now())
            .unwrap();

        assert_eq!(plan.payable_total, Decimal::ZERO);
        assert_eq!(plan.payment_method, PaymentMethod::Subscription);
        assert!(matches!(
            plan.tickets[1].settlement,
            Settlement::WalletCovered {
                charge: WalletCharge::Credits(1),
                ..
            }
        ));
    }

    #[test]
    fn test_foreign_wallet_is_unauthorized() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let mut wallet = counted_wallet(UserId::new(), 5, false);
        let mut req = request(&t, vec![passenger("Awa", true)]);
        req.subscription_id = Some(wallet.id);

        let err = planner
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(UserId::new()), Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED_WALLET");
        assert_eq!(err.http_status_code(), 403);
    }

    #[test]
    fn test_blocked_wallet_rejects_sale() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let owner = UserId::new();
        let mut wallet = counted_wallet(owner, 5, false);
        wallet.status = SubscriptionStatus::Blocked;
        let mut req = request(&t, vec![passenger("Awa", true)]);
        req.subscription_id = Some(wallet.id);

        let err = planner
            .plan_sale(&req, &t, None, Some(&mut wallet), Some(owner), Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "SUBSCRIPTION_INACTIVE");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_missing_fare_aborts() {
        let planner = ReservationPlanner::default();
        let t = trip(10, dec!(3000));
        let mut req = request(&t, vec![passenger("Awa", false)]);
        req.passengers[0].nationality_group = NationalityGroup::African;

        let err = planner.plan_sale(&req, &t, None, None, None, Utc::now()).unwrap_err();
        assert_eq!(err.error_code(), "PRICE_NOT_FOUND");
    }
}
