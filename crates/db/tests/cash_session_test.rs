//! Integration tests for cash desk shifts.

mod common;

use rust_decimal_macros::dec;

use navette_core::auth::UserRole;
use navette_core::cash::{CashSessionError, CashSessionStatus, DeskContext};
use navette_core::pricing::{NationalityGroup, PassengerType};
use navette_core::reservation::{PassengerInput, PaymentMethod, SaleRequest};
use navette_db::entities::sea_orm_active_enums as db_enums;
use navette_db::{BookingRepository, CashSessionRepository, CashSessionRepositoryError};
use navette_shared::types::{CashDeskId, CashSessionId, SubscriptionId, TripId, UserId};

use common::{connect, counted_subscription, desk, network, seats_left, trip, user};

#[tokio::test]
async fn test_shift_with_one_cash_sale_balances() {
    let db = connect().await;
    let net = network(&db, 10).await;
    let trip_id = trip(&db, &net, 10, None).await;
    let desk_id = CashDeskId::from_uuid(desk(&db).await);
    let cashier = UserId::from_uuid(user(&db, db_enums::UserRole::Cashier).await);
    let sessions = CashSessionRepository::new(db.clone());

    let opened = sessions
        .open(desk_id, cashier, dec!(10000))
        .await
        .expect("open should succeed");
    let session_id = CashSessionId::from_uuid(opened.id);

    let request = SaleRequest {
        trip_id: TripId::from_uuid(trip_id),
        return_trip_id: None,
        passengers: vec![PassengerInput {
            name: "Awa Diop".to_string(),
            passenger_type: PassengerType::Adult,
            nationality_group: NationalityGroup::National,
            is_wallet_holder: false,
        }],
        payment_method: PaymentMethod::Cash,
        subscription_id: None,
        desk: Some(DeskContext {
            session_id,
            desk_id,
            cashier_id: cashier,
        }),
        purchaser: None,
        guest_account: None,
        seller: Some(cashier),
    };
    BookingRepository::new(db.clone())
        .create_booking(request)
        .await
        .expect("sale should succeed");

    assert_eq!(seats_left(&db, trip_id).await, 9);
    let current = sessions
        .current(cashier)
        .await
        .expect("read")
        .expect("session is open");
    assert_eq!(current.expected_amount, dec!(13000));

    let closed = sessions
        .close(cashier, dec!(13000), None)
        .await
        .expect("close should succeed");
    assert_eq!(closed.discrepancy_amount, Some(dec!(0)));

    let summary = sessions.summary(session_id).await.expect("summary");
    assert_eq!(summary.confirmed_bookings, 1);
    assert_eq!(summary.ticket_count, 1);
    assert_eq!(summary.totals_by_method.get(&PaymentMethod::Cash), Some(&dec!(3000)));
    assert_eq!(summary.status, CashSessionStatus::Closed);
}

#[tokio::test]
async fn test_wallet_covered_desk_sale_adds_only_cash_to_drawer() {
    let db = connect().await;
    let net = network(&db, 10).await;
    let trip_id = trip(&db, &net, 10, None).await;
    let desk_id = CashDeskId::from_uuid(desk(&db).await);
    let cashier = UserId::from_uuid(user(&db, db_enums::UserRole::Cashier).await);
    let customer = user(&db, db_enums::UserRole::Customer).await;
    let sub = counted_subscription(&db, customer, 5).await;
    let sessions = CashSessionRepository::new(db.clone());

    let opened = sessions
        .open(desk_id, cashier, dec!(10000))
        .await
        .expect("open should succeed");
    let session_id = CashSessionId::from_uuid(opened.id);

    let passenger = |name: &str, is_wallet_holder: bool| PassengerInput {
        name: name.to_string(),
        passenger_type: PassengerType::Adult,
        nationality_group: NationalityGroup::National,
        is_wallet_holder,
    };
    let request = SaleRequest {
        trip_id: TripId::from_uuid(trip_id),
        return_trip_id: None,
        passengers: vec![passenger("Awa Diop", true), passenger("Moussa Fall", false)],
        payment_method: PaymentMethod::Cash,
        subscription_id: Some(SubscriptionId::from_uuid(sub)),
        desk: Some(DeskContext {
            session_id,
            desk_id,
            cashier_id: cashier,
        }),
        purchaser: Some(UserId::from_uuid(customer)),
        guest_account: None,
        seller: Some(cashier),
    };
    let created = BookingRepository::new(db.clone())
        .create_booking(request)
        .await
        .expect("sale should succeed");

    assert_eq!(created.details.booking.total_amount, dec!(3000));
    let lines = &created.details.transactions;
    assert_eq!(lines.len(), 2);
    let wallet_lines: Vec<_> = lines
        .iter()
        .filter(|t| t.payment_method == db_enums::PaymentMethod::Subscription)
        .collect();
    assert_eq!(wallet_lines.len(), 1);
    assert_eq!(wallet_lines[0].credits_used, 1);
    let cash_lines: Vec<_> = lines
        .iter()
        .filter(|t| t.payment_method == db_enums::PaymentMethod::Cash)
        .collect();
    assert_eq!(cash_lines.len(), 1);
    assert_eq!(cash_lines[0].amount, dec!(3000));

    assert_eq!(seats_left(&db, trip_id).await, 8);
    let current = sessions
        .current(cashier)
        .await
        .expect("read")
        .expect("session is open");
    assert_eq!(current.expected_amount, dec!(13000));
}

#[tokio::test]
async fn test_short_count_gives_negative_discrepancy() {
    let db = connect().await;
    let desk_id = CashDeskId::from_uuid(desk(&db).await);
    let cashier = UserId::from_uuid(user(&db, db_enums::UserRole::Cashier).await);
    let sessions = CashSessionRepository::new(db.clone());

    sessions.open(desk_id, cashier, dec!(50000)).await.expect("open");
    let closed = sessions
        .close(cashier, dec!(48000), Some("short".to_string()))
        .await
        .expect("close");

    assert_eq!(closed.discrepancy_amount, Some(dec!(-2000)));
    assert_eq!(closed.closing_amount_declared, Some(dec!(48000)));
    assert_eq!(closed.status, db_enums::CashSessionStatus::Closed);
}

#[tokio::test]
async fn test_second_open_and_stray_close_are_rejected() {
    let db = connect().await;
    let desk_id = CashDeskId::from_uuid(desk(&db).await);
    let cashier = UserId::from_uuid(user(&db, db_enums::UserRole::Cashier).await);
    let sessions = CashSessionRepository::new(db.clone());

    let first = sessions.open(desk_id, cashier, dec!(0)).await.expect("open");
    let second = sessions.open(desk_id, cashier, dec!(0)).await;
    assert!(matches!(
        second,
        Err(CashSessionRepositoryError::Session(CashSessionError::AlreadyOpen(id)))
            if id.into_inner() == first.id
    ));

    sessions.close(cashier, dec!(0), None).await.expect("close");
    let stray = sessions.close(cashier, dec!(0), None).await;
    assert!(matches!(
        stray,
        Err(CashSessionRepositoryError::Session(CashSessionError::NoOpenSession))
    ));
}

#[tokio::test]
async fn test_supervisor_force_close_zeroes_discrepancy() {
    let db = connect().await;
    let desk_id = CashDeskId::from_uuid(desk(&db).await);
    let cashier = UserId::from_uuid(user(&db, db_enums::UserRole::Cashier).await);
    let supervisor = UserId::from_uuid(user(&db, db_enums::UserRole::Supervisor).await);
    let sessions = CashSessionRepository::new(db.clone());

    let opened = sessions.open(desk_id, cashier, dec!(7500)).await.expect("open");
    let session_id = CashSessionId::from_uuid(opened.id);

    let denied = sessions
        .force_close(session_id, cashier, UserRole::Cashier)
        .await;
    assert!(denied.is_err());

    let closed = sessions
        .force_close(session_id, supervisor, UserRole::Supervisor)
        .await
        .expect("force close");
    assert_eq!(closed.status, db_enums::CashSessionStatus::ClosedAdmin);
    assert_eq!(closed.closing_amount_declared, Some(dec!(7500)));
    assert_eq!(closed.discrepancy_amount, Some(dec!(0)));
}
