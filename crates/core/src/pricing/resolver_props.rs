//! Property-based tests for `PricingResolver`.

use proptest::prelude::*;
use rust_decimal::Decimal;

use navette_shared::types::{PricingRuleId, RouteId};

use crate::pricing::error::PricingError;
use crate::pricing::resolver::PricingResolver;
use crate::pricing::types::{
    FareCategory, FareSource, NationalityGroup, PassengerType, PricingRule, TripFareTable,
};

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

/// Whole-franc prices up to 100 000.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(Decimal::from)
}

fn arb_category() -> impl Strategy<Value = FareCategory> {
    (
        prop_oneof![
            Just("Adulte National"),
            Just("Non Résident"),
            Just("International"),
            Just("Tarif Afrique"),
            Just("Promo"),
            Just("Hors Afrique"),
        ],
        prop_oneof![Just("adult"), Just("child"), Just("enfant"), Just("bébé")],
        arb_price(),
    )
        .prop_map(|(name, declared_type, price)| FareCategory {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            price,
        })
}

fn rule_for(
    passenger_type: PassengerType,
    nationality_group: NationalityGroup,
    base_price: Decimal,
) -> PricingRule {
    PricingRule {
        id: PricingRuleId::new(),
        route_id: RouteId::new(),
        passenger_type,
        nationality_group,
        base_price,
        tax_amount: Decimal::ZERO,
        is_active: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Without a trip table the route rule decides, or nothing does.
    #[test]
    fn prop_no_table_uses_exact_rule(
        pt in arb_passenger_type(),
        ng in arb_group(),
        price in arb_price(),
    ) {
        let rules = vec![rule_for(pt, ng, price)];
        let fare = PricingResolver::new().resolve_fare(None, &rules, pt, ng).unwrap();
        prop_assert_eq!(fare.amount, price);
        let is_route_rule = matches!(fare.source, FareSource::RouteRule { .. });
        prop_assert!(is_route_rule);

        let none = PricingResolver::new().resolve_fare(None, &[], pt, ng);
        let not_found = matches!(none, Err(PricingError::PriceNotFound { .. }));
        prop_assert!(not_found);
    }

    /// A table holding the passenger's fare class always wins over route rules,
    /// and the fare comes from a category of that class.
    #[test]
    fn prop_table_with_type_wins(
        categories in prop::collection::vec(arb_category(), 1..8),
        pt in arb_passenger_type(),
        ng in arb_group(),
        rule_price in arb_price(),
    ) {
        let table = TripFareTable { categories };
        let has_type = table
            .categories
            .iter()
            .any(|c| c.fare_class() == Some(pt.fare_class()));
        prop_assume!(has_type);

        let rules = vec![rule_for(pt, ng, rule_price)];
        let fare = PricingResolver::new()
            .resolve_fare(Some(&table), &rules, pt, ng)
            .unwrap();

        let is_trip_source = !matches!(fare.source, FareSource::RouteRule { .. });
        prop_assert!(is_trip_source);
        let from_class = table
            .categories
            .iter()
            .any(|c| c.fare_class() == Some(pt.fare_class()) && c.price == fare.amount);
        prop_assert!(from_class);
    }

    /// Resolution is deterministic.
    #[test]
    fn prop_resolution_is_deterministic(
        categories in prop::collection::vec(arb_category(), 0..8),
        pt in arb_passenger_type(),
        ng in arb_group(),
        rule_price in arb_price(),
    ) {
        let table = TripFareTable { categories };
        let rules = vec![rule_for(pt, ng, rule_price)];
        let resolver = PricingResolver::new();
        let a = resolver.resolve_fare(Some(&table), &rules, pt, ng);
        let b = resolver.resolve_fare(Some(&table), &rules, pt, ng);
        prop_assert_eq!(a, b);
    }

    /// Fares are never negative for well-formed inputs.
    #[test]
    fn prop_fare_never_negative(
        categories in prop::collection::vec(arb_category(), 0..8),
        pt in arb_passenger_type(),
        ng in arb_group(),
        rule_price in arb_price(),
    ) {
        let table = TripFareTable { categories };
        let rules = vec![rule_for(pt, ng, rule_price)];
        let fare = PricingResolver::new()
            .resolve_fare(Some(&table), &rules, pt, ng)
            .unwrap();
        prop_assert!(fare.amount >= Decimal::ZERO);
    }
}

#[test]
fn non_resident_trip_fare_beats_route_rule() {
    let table = TripFareTable {
        categories: vec![FareCategory {
            name: "Non Résident".to_string(),
            declared_type: "adult".to_string(),
            price: Decimal::from(6000),
        }],
    };
    let rules = vec![rule_for(
        PassengerType::Adult,
        NationalityGroup::HorsAfrique,
        Decimal::from(5000),
    )];

    let fare = PricingResolver::new()
        .resolve_fare(
            Some(&table),
            &rules,
            PassengerType::Adult,
            NationalityGroup::HorsAfrique,
        )
        .unwrap();

    assert_eq!(fare.amount, Decimal::from(6000));
}
