//! Database seeder for Navette development and testing.
//!
//! Seeds the Dakar - Gorée crossing: ports, a ship, both route directions
//! with their fare grid, a week of departures, subscription plans, a cash
//! desk and one user per role.
//!
//! Usage: cargo run --bin seeder
//!
//! Every seeded row has a fixed ID, so running the seeder twice is harmless.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use navette_core::auth::hash_password;
use navette_db::entities::{
    cash_desks, ports, pricing_rules, routes, ships, subscription_plans, subscriptions, trips,
    sea_orm_active_enums::{
        CreditType, NationalityGroup, PassengerType, SubscriptionStatus, TripStatus, UserRole,
    },
    users,
};

const DAKAR_PORT_ID: Uuid = Uuid::from_u128(0x0001);
const GOREE_PORT_ID: Uuid = Uuid::from_u128(0x0002);
const SHIP_ID: Uuid = Uuid::from_u128(0x0010);
const OUTBOUND_ROUTE_ID: Uuid = Uuid::from_u128(0x0020);
const INBOUND_ROUTE_ID: Uuid = Uuid::from_u128(0x0021);
const DESK_ID: Uuid = Uuid::from_u128(0x0030);
const COUNTED_PLAN_ID: Uuid = Uuid::from_u128(0x0040);
const UNLIMITED_PLAN_ID: Uuid = Uuid::from_u128(0x0041);
const LEGACY_PLAN_ID: Uuid = Uuid::from_u128(0x0042);
const CUSTOMER_SUBSCRIPTION_ID: Uuid = Uuid::from_u128(0x0050);

/// Password shared by every seeded account.
const DEV_PASSWORD: &str = "navette-dev-password";

/// Seat capacity of the seeded ship.
const SHIP_CAPACITY: i32 = 350;

/// Daily departures from Dakar, UTC.
const DEPARTURES: [(u32, u32); 4] = [(7, 30), (10, 0), (14, 30), (18, 0)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("NAVETTE__DATABASE__URL"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    println!("Connecting to database...");
    let db = navette_db::connect(&database_url).await?;

    println!("Seeding users...");
    seed_users(&db).await?;

    println!("Seeding ports, ship and routes...");
    seed_network(&db).await?;

    println!("Seeding pricing rules...");
    seed_pricing_rules(&db).await?;

    println!("Seeding trips...");
    seed_trips(&db).await?;

    println!("Seeding subscription plans...");
    seed_subscriptions(&db).await?;

    println!("Seeding cash desk...");
    seed_cash_desk(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

fn user_id(role: UserRole) -> Uuid {
    match role {
        UserRole::Admin => Uuid::from_u128(0x0100),
        UserRole::Supervisor => Uuid::from_u128(0x0101),
        UserRole::Cashier => Uuid::from_u128(0x0102),
        UserRole::Customer => Uuid::from_u128(0x0103),
    }
}

/// Seeds one account per role.
async fn seed_users(db: &DatabaseConnection) -> anyhow::Result<()> {
    let password_hash = hash_password(DEV_PASSWORD)?;
    let accounts = [
        (UserRole::Admin, "admin@navette.dev", "Admin Navette"),
        (UserRole::Supervisor, "superviseur@navette.dev", "Aminata Sow"),
        (UserRole::Cashier, "caisse@navette.dev", "Ibrahima Fall"),
        (UserRole::Customer, "client@navette.dev", "Awa Ndiaye"),
    ];

    for (role, email, full_name) in accounts {
        let id = user_id(role);
        if users::Entity::find_by_id(id).one(db).await?.is_some() {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let now = Utc::now();
        users::ActiveModel {
            id: Set(id),
            email: Set(email.to_string()),
            full_name: Set(full_name.to_string()),
            phone: Set(None),
            password_hash: Set(Some(password_hash.clone())),
            role: Set(role),
            is_guest: Set(false),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        println!("  Created {role:?} account: {email}");
    }

    Ok(())
}

/// Seeds both ports, the ship and both directions of the crossing.
async fn seed_network(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    for (id, code, name) in [
        (DAKAR_PORT_ID, "DKR", "Dakar"),
        (GOREE_PORT_ID, "GOR", "Gorée"),
    ] {
        if ports::Entity::find_by_id(id).one(db).await?.is_none() {
            ports::ActiveModel {
                id: Set(id),
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                created_at: Set(now.into()),
            }
            .insert(db)
            .await?;
            println!("  Created port: {name}");
        }
    }

    if ships::Entity::find_by_id(SHIP_ID).one(db).await?.is_none() {
        ships::ActiveModel {
            id: Set(SHIP_ID),
            name: Set("Coumba Castel".to_string()),
            capacity_pax: Set(SHIP_CAPACITY),
            is_active: Set(true),
            created_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        println!("  Created ship: Coumba Castel ({SHIP_CAPACITY} seats)");
    }

    for (id, from, to) in [
        (OUTBOUND_ROUTE_ID, DAKAR_PORT_ID, GOREE_PORT_ID),
        (INBOUND_ROUTE_ID, GOREE_PORT_ID, DAKAR_PORT_ID),
    ] {
        if routes::Entity::find_by_id(id).one(db).await?.is_none() {
            routes::ActiveModel {
                id: Set(id),
                departure_port_id: Set(from),
                arrival_port_id: Set(to),
                duration_minutes: Set(20),
                is_active: Set(true),
                created_at: Set(now.into()),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

/// Seeds the standing fare grid, identical in both directions.
async fn seed_pricing_rules(db: &DatabaseConnection) -> anyhow::Result<()> {
    // (type, group, base price, tax) in FCFA
    let grid = [
        (PassengerType::Adult, NationalityGroup::National, 1500, 0),
        (PassengerType::Adult, NationalityGroup::Resident, 2500, 200),
        (PassengerType::Adult, NationalityGroup::African, 2500, 200),
        (PassengerType::Adult, NationalityGroup::HorsAfrique, 5000, 200),
        (PassengerType::Child, NationalityGroup::National, 500, 0),
        (PassengerType::Child, NationalityGroup::Resident, 1500, 100),
        (PassengerType::Child, NationalityGroup::African, 1500, 100),
        (PassengerType::Child, NationalityGroup::HorsAfrique, 2500, 100),
    ];

    let mut created = 0u32;
    for (route_index, route_id) in [OUTBOUND_ROUTE_ID, INBOUND_ROUTE_ID].into_iter().enumerate() {
        for (rule_index, (passenger_type, group, base, tax)) in grid.iter().enumerate() {
            let id = Uuid::from_u128(0x1000 + (route_index as u128) * 0x100 + rule_index as u128);
            if pricing_rules::Entity::find_by_id(id).one(db).await?.is_some() {
                continue;
            }

            let now = Utc::now();
            pricing_rules::ActiveModel {
                id: Set(id),
                route_id: Set(route_id),
                passenger_type: Set(*passenger_type),
                nationality_group: Set(*group),
                base_price: Set(Decimal::from(*base)),
                tax_amount: Set(Decimal::from(*tax)),
                is_active: Set(true),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(db)
            .await?;
            created += 1;
        }
    }

    println!("  Created {created} pricing rules");
    Ok(())
}

/// Seeds seven days of departures in both directions.
///
/// The last departure of each day carries an evening fare table to exercise
/// trip-level overrides.
async fn seed_trips(db: &DatabaseConnection) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let mut created = 0u32;

    for day in 0..7u32 {
        let date = today + Duration::days(i64::from(day));
        for (slot, (hour, minute)) in DEPARTURES.iter().enumerate() {
            let Some(time) = NaiveTime::from_hms_opt(*hour, *minute, 0) else {
                continue;
            };
            let outbound_departure: DateTime<Utc> = date.and_time(time).and_utc();
            let evening = slot + 1 == DEPARTURES.len();

            for (direction, route_id, departure) in [
                (0u128, OUTBOUND_ROUTE_ID, outbound_departure),
                (1u128, INBOUND_ROUTE_ID, outbound_departure + Duration::minutes(45)),
            ] {
                let id = Uuid::from_u128(
                    0x10_0000 + u128::from(day) * 0x100 + (slot as u128) * 0x10 + direction,
                );
                if trips::Entity::find_by_id(id).one(db).await?.is_some() {
                    continue;
                }

                let now = Utc::now();
                trips::ActiveModel {
                    id: Set(id),
                    route_id: Set(route_id),
                    ship_id: Set(SHIP_ID),
                    departure_time: Set(departure.into()),
                    arrival_time: Set((departure + Duration::minutes(20)).into()),
                    available_seats_pax: Set(SHIP_CAPACITY),
                    status: Set(TripStatus::Scheduled),
                    pricing_settings: Set(evening.then(evening_fare_table)),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(db)
                .await?;
                created += 1;
            }
        }
    }

    println!("  Created {created} trips");
    Ok(())
}

fn evening_fare_table() -> serde_json::Value {
    serde_json::json!({
        "categories": [
            {"name": "Adulte National", "type": "adult", "price": "1500"},
            {"name": "Adulte Résident", "type": "adult", "price": "3000"},
            {"name": "Adulte Afrique CEDEAO", "type": "adult", "price": "3000"},
            {"name": "Adulte Non Résident", "type": "adult", "price": "6000"},
            {"name": "Enfant National", "type": "enfant", "price": "500"},
            {"name": "Enfant Non Résident", "type": "enfant", "price": "3000"}
        ]
    })
}

/// Seeds the three plan kinds and a ten-voyage card for the customer.
async fn seed_subscriptions(db: &DatabaseConnection) -> anyhow::Result<()> {
    let plans = [
        (COUNTED_PLAN_ID, "Carte 10 traversées", CreditType::Counted, Some(10), false, 90, 12_000),
        (UNLIMITED_PLAN_ID, "Pass mensuel illimité", CreditType::Unlimited, None, false, 30, 25_000),
        (LEGACY_PLAN_ID, "Carte famille (crédit)", CreditType::Legacy, None, true, 365, 0),
    ];

    for (id, name, credit_type, credits, multi, validity_days, price) in plans {
        if subscription_plans::Entity::find_by_id(id).one(db).await?.is_some() {
            continue;
        }
        subscription_plans::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            credit_type: Set(credit_type),
            voyage_credits: Set(credits),
            allow_multi_passenger: Set(multi),
            validity_days: Set(validity_days),
            price: Set(Decimal::from(price)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
        println!("  Created plan: {name}");
    }

    if subscriptions::Entity::find_by_id(CUSTOMER_SUBSCRIPTION_ID)
        .one(db)
        .await?
        .is_none()
    {
        let now = Utc::now();
        subscriptions::ActiveModel {
            id: Set(CUSTOMER_SUBSCRIPTION_ID),
            user_id: Set(user_id(UserRole::Customer)),
            plan_id: Set(COUNTED_PLAN_ID),
            voyage_credits_remaining: Set(Some(10)),
            legacy_credit_fcfa: Set(None),
            status: Set(SubscriptionStatus::Active),
            starts_at: Set(now.into()),
            ends_at: Set((now + Duration::days(90)).into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        println!("  Created subscription {CUSTOMER_SUBSCRIPTION_ID} for client@navette.dev");
    }

    Ok(())
}

async fn seed_cash_desk(db: &DatabaseConnection) -> anyhow::Result<()> {
    if cash_desks::Entity::find_by_id(DESK_ID).one(db).await?.is_some() {
        println!("  Cash desk already exists, skipping...");
        return Ok(());
    }

    cash_desks::ActiveModel {
        id: Set(DESK_ID),
        name: Set("Guichet 1".to_string()),
        location: Set(Some("Gare maritime de Dakar".to_string())),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    println!("  Created cash desk {DESK_ID}");

    Ok(())
}
