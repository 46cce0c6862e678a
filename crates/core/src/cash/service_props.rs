//! Property-based tests for the cash session state machine.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use navette_shared::types::{CashDeskId, UserId};

use crate::auth::UserRole;
use crate::cash::error::CashSessionError;
use crate::cash::service::CashSessionService;
use crate::cash::types::{CashDeskState, CashSessionState, DeskContext};

/// Amounts in centimes up to one million francs.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|c| Decimal::new(c, 2))
}

fn open(opening: Decimal) -> CashSessionState {
    let desk = CashDeskState {
        id: CashDeskId::new(),
        name: "Guichet".to_string(),
        is_active: true,
    };
    CashSessionService::open(&desk, UserId::new(), None, opening, Utc::now()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Expected amount is the float plus every accrued sale, and never shrinks.
    #[test]
    fn prop_expected_is_float_plus_sales(
        opening in arb_amount(),
        sales in prop::collection::vec(arb_amount(), 0..30),
    ) {
        let mut session = open(opening);
        let ctx = DeskContext::for_session(&session);
        let mut previous = session.expected_amount;

        for sale in &sales {
            CashSessionService::accrue(&mut session, &ctx, *sale).unwrap();
            prop_assert!(session.expected_amount >= previous);
            previous = session.expected_amount;
        }

        let total: Decimal = sales.iter().copied().sum();
        prop_assert_eq!(session.expected_amount, opening + total);
    }

    /// Discrepancy is always declared minus expected.
    #[test]
    fn prop_discrepancy_is_declared_minus_expected(
        opening in arb_amount(),
        sale in arb_amount(),
        declared in arb_amount(),
    ) {
        let mut session = open(opening);
        let ctx = DeskContext::for_session(&session);
        CashSessionService::accrue(&mut session, &ctx, sale).unwrap();

        let closure = CashSessionService::close(
            &session,
            session.cashier_id,
            declared,
            None,
            Utc::now(),
        )
        .unwrap();

        prop_assert_eq!(closure.discrepancy_amount, declared - (opening + sale));
    }

    /// No transition leaves a closed session.
    #[test]
    fn prop_closed_is_terminal(
        opening in arb_amount(),
        declared in arb_amount(),
        forced in any::<bool>(),
    ) {
        let mut session = open(opening);
        let ctx = DeskContext::for_session(&session);
        let closure = if forced {
            CashSessionService::force_close(&session, UserId::new(), UserRole::Admin, Utc::now())
        } else {
            CashSessionService::close(&session, session.cashier_id, declared, None, Utc::now())
        }
        .unwrap();
        closure.apply(&mut session);

        let id = session.id;
        prop_assert_eq!(
            CashSessionService::accrue(&mut session, &ctx, Decimal::ONE),
            Err(CashSessionError::AlreadyClosed(id))
        );
        prop_assert_eq!(
            CashSessionService::close(&session, session.cashier_id, declared, None, Utc::now()),
            Err(CashSessionError::AlreadyClosed(id))
        );
    }
}
