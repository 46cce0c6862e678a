//! Property-based tests for wallet coverage.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use navette_shared::types::{SubscriptionId, UserId};

use crate::wallet::ledger::WalletDrawdown;
use crate::wallet::types::{SubscriptionStatus, TripLegs, Wallet, WalletBalance, WalletCharge};

fn arb_legs() -> impl Strategy<Value = TripLegs> {
    prop_oneof![Just(TripLegs::OneWay), Just(TripLegs::RoundTrip)]
}

fn arb_fare() -> impl Strategy<Value = Decimal> {
    (0i64..20_000).prop_map(Decimal::from)
}

fn arb_balance() -> impl Strategy<Value = WalletBalance> {
    prop_oneof![
        Just(WalletBalance::Unlimited),
        (0u32..10).prop_map(|remaining| WalletBalance::Counted { remaining }),
        (0i64..50_000).prop_map(|b| WalletBalance::Legacy {
            balance: Decimal::from(b)
        }),
    ]
}

fn wallet(balance: WalletBalance, allow_multi_passenger: bool) -> Wallet {
    Wallet {
        id: SubscriptionId::new(),
        owner_id: UserId::new(),
        status: SubscriptionStatus::Active,
        ends_at: Utc::now() + Duration::days(30),
        allow_multi_passenger,
        balance,
    }
}

fn remaining_value(balance: WalletBalance) -> Option<Decimal> {
    match balance {
        WalletBalance::Unlimited => None,
        WalletBalance::Counted { remaining } => Some(Decimal::from(remaining)),
        WalletBalance::Legacy { balance } => Some(balance),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `deduct` succeeds exactly when `can_cover` says so, and never leaves
    /// a negative balance.
    #[test]
    fn prop_deduct_agrees_with_can_cover(
        balance in arb_balance(),
        legs in arb_legs(),
        fare in arb_fare(),
    ) {
        let mut w = wallet(balance, false);
        let coverable = w.can_cover(legs, fare);
        let before = w.balance;
        let result = w.deduct(legs, fare);

        prop_assert_eq!(result.is_ok(), coverable);
        if !coverable {
            prop_assert_eq!(w.balance, before);
        }
        if let Some(left) = remaining_value(w.balance) {
            prop_assert!(left >= Decimal::ZERO);
        }
    }

    /// The balance drops by exactly what the charge reports.
    #[test]
    fn prop_charge_matches_balance_change(
        balance in arb_balance(),
        legs in arb_legs(),
        fare in arb_fare(),
    ) {
        let mut w = wallet(balance, false);
        if let Ok(charge) = w.deduct(legs, fare) {
            match (balance, w.balance, charge) {
                (WalletBalance::Counted { remaining: a }, WalletBalance::Counted { remaining: b }, WalletCharge::Credits(n)) => {
                    prop_assert_eq!(a - b, n);
                    prop_assert_eq!(n, legs.count());
                }
                (WalletBalance::Legacy { balance: a }, WalletBalance::Legacy { balance: b }, WalletCharge::Amount(x)) => {
                    prop_assert_eq!(a - b, x);
                    prop_assert_eq!(x, fare);
                }
                (WalletBalance::Unlimited, WalletBalance::Unlimited, WalletCharge::Unlimited) => {}
                other => prop_assert!(false, "unexpected charge shape: {:?}", other),
            }
        }
    }

    /// Without multi-passenger coverage at most one passenger is covered,
    /// and only if flagged as the holder.
    #[test]
    fn prop_single_plan_covers_at_most_holder(
        balance in arb_balance(),
        holders in prop::collection::vec(any::<bool>(), 1..10),
        fare in 1i64..20_000,
    ) {
        let mut w = wallet(balance, false);
        let mut drawdown = WalletDrawdown::new(&mut w);
        let mut covered_non_holder = false;
        for is_holder in &holders {
            let covered = drawdown
                .try_cover(*is_holder, TripLegs::OneWay, Decimal::from(fare))
                .is_some();
            covered_non_holder |= covered && !is_holder;
        }
        prop_assert!(!covered_non_holder);
    }

    /// Under a multi-passenger counted plan, coverage is a prefix of the party.
    #[test]
    fn prop_multi_plan_covers_prefix(
        remaining in 0u32..10,
        party in 1usize..12,
    ) {
        let mut w = wallet(WalletBalance::Counted { remaining }, true);
        let mut drawdown = WalletDrawdown::new(&mut w);
        let covered: Vec<bool> = (0..party)
            .map(|_| drawdown.try_cover(false, TripLegs::OneWay, Decimal::from(3000)).is_some())
            .collect();

        let expected = party.min(remaining as usize);
        prop_assert_eq!(covered.iter().filter(|c| **c).count(), expected);
        prop_assert!(covered.windows(2).all(|w| w[0] || !w[1]));
    }
}
