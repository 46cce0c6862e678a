//! Initial database migration.
//!
//! Creates the reference tables (ports, ships, routes), the sellable inventory
//! (trips, pricing rules), wallets, cash desks and sessions, and the booking
//! ledger, together with the enums, constraints and triggers they rely on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: NETWORK (ports, ships, routes, trips)
        // ============================================================
        db.execute_unprepared(PORTS_SQL).await?;
        db.execute_unprepared(SHIPS_SQL).await?;
        db.execute_unprepared(ROUTES_SQL).await?;
        db.execute_unprepared(TRIPS_SQL).await?;
        db.execute_unprepared(PRICING_RULES_SQL).await?;

        // ============================================================
        // PART 4: SUBSCRIPTION WALLETS
        // ============================================================
        db.execute_unprepared(SUBSCRIPTION_PLANS_SQL).await?;
        db.execute_unprepared(SUBSCRIPTIONS_SQL).await?;

        // ============================================================
        // PART 5: CASH DESKS
        // ============================================================
        db.execute_unprepared(CASH_DESKS_SQL).await?;
        db.execute_unprepared(CASH_SESSIONS_SQL).await?;

        // ============================================================
        // PART 6: BOOKINGS & LEDGER
        // ============================================================
        db.execute_unprepared(BOOKINGS_SQL).await?;
        db.execute_unprepared(TICKETS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('customer', 'cashier', 'supervisor', 'admin');

CREATE TYPE trip_status AS ENUM ('scheduled', 'boarding', 'departed', 'arrived', 'cancelled');

CREATE TYPE passenger_type AS ENUM ('adult', 'child', 'baby');

CREATE TYPE nationality_group AS ENUM ('national', 'resident', 'african', 'hors_afrique');

CREATE TYPE booking_status AS ENUM ('confirmed', 'cancelled', 'pending');

CREATE TYPE ticket_status AS ENUM ('issued', 'boarded', 'cancelled', 'used');

CREATE TYPE payment_method AS ENUM ('cash', 'card', 'mobile_money', 'subscription');

CREATE TYPE transaction_status AS ENUM ('pending', 'completed', 'failed');

CREATE TYPE credit_type AS ENUM ('unlimited', 'counted', 'legacy');

CREATE TYPE subscription_status AS ENUM ('active', 'blocked', 'expired');

CREATE TYPE cash_session_status AS ENUM ('open', 'closed', 'closed_admin');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    phone VARCHAR(32),
    password_hash VARCHAR(255),
    role user_role NOT NULL DEFAULT 'customer',
    is_guest BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email) WHERE is_active = true;
";

const PORTS_SQL: &str = r"
CREATE TABLE ports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(16) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SHIPS_SQL: &str = r"
CREATE TABLE ships (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    capacity_pax INTEGER NOT NULL CHECK (capacity_pax > 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ROUTES_SQL: &str = r"
CREATE TABLE routes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    departure_port_id UUID NOT NULL REFERENCES ports(id),
    arrival_port_id UUID NOT NULL REFERENCES ports(id),
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_route_ports CHECK (departure_port_id <> arrival_port_id)
);
";

const TRIPS_SQL: &str = r"
CREATE TABLE trips (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    route_id UUID NOT NULL REFERENCES routes(id),
    ship_id UUID NOT NULL REFERENCES ships(id),
    departure_time TIMESTAMPTZ NOT NULL,
    arrival_time TIMESTAMPTZ NOT NULL,
    available_seats_pax INTEGER NOT NULL,
    status trip_status NOT NULL DEFAULT 'scheduled',
    pricing_settings JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_trip_seats_non_negative CHECK (available_seats_pax >= 0),
    CONSTRAINT chk_trip_times CHECK (arrival_time > departure_time)
);

CREATE INDEX idx_trips_route_departure ON trips(route_id, departure_time);
CREATE INDEX idx_trips_bookable ON trips(departure_time)
    WHERE status IN ('scheduled', 'boarding');
";

const PRICING_RULES_SQL: &str = r"
CREATE TABLE pricing_rules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    route_id UUID NOT NULL REFERENCES routes(id) ON DELETE CASCADE,
    passenger_type passenger_type NOT NULL,
    nationality_group nationality_group NOT NULL,
    base_price NUMERIC(14, 2) NOT NULL CHECK (base_price >= 0),
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (tax_amount >= 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    UNIQUE (route_id, passenger_type, nationality_group)
);
";

const SUBSCRIPTION_PLANS_SQL: &str = r"
CREATE TABLE subscription_plans (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    credit_type credit_type NOT NULL,
    voyage_credits INTEGER CHECK (voyage_credits >= 0),
    allow_multi_passenger BOOLEAN NOT NULL DEFAULT false,
    validity_days INTEGER NOT NULL CHECK (validity_days > 0),
    price NUMERIC(14, 2) NOT NULL CHECK (price >= 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SUBSCRIPTIONS_SQL: &str = r"
CREATE TABLE subscriptions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    plan_id UUID NOT NULL REFERENCES subscription_plans(id),
    voyage_credits_remaining INTEGER,
    legacy_credit_fcfa NUMERIC(14, 2),
    status subscription_status NOT NULL DEFAULT 'active',
    starts_at TIMESTAMPTZ NOT NULL,
    ends_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_credits_non_negative CHECK (voyage_credits_remaining IS NULL OR voyage_credits_remaining >= 0),
    CONSTRAINT chk_legacy_non_negative CHECK (legacy_credit_fcfa IS NULL OR legacy_credit_fcfa >= 0),
    CONSTRAINT chk_subscription_period CHECK (ends_at > starts_at)
);

CREATE INDEX idx_subscriptions_user ON subscriptions(user_id) WHERE status = 'active';
";

const CASH_DESKS_SQL: &str = r"
CREATE TABLE cash_desks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    location VARCHAR(255),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CASH_SESSIONS_SQL: &str = r"
CREATE TABLE cash_sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cash_desk_id UUID NOT NULL REFERENCES cash_desks(id),
    user_id UUID NOT NULL REFERENCES users(id),
    opening_amount NUMERIC(14, 2) NOT NULL CHECK (opening_amount >= 0),
    expected_amount NUMERIC(14, 2) NOT NULL,
    closing_amount_declared NUMERIC(14, 2),
    discrepancy_amount NUMERIC(14, 2),
    status cash_session_status NOT NULL DEFAULT 'open',
    opened_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    closed_at TIMESTAMPTZ,
    closed_by UUID REFERENCES users(id),
    notes TEXT,

    CONSTRAINT chk_expected_covers_opening CHECK (expected_amount >= opening_amount),
    CONSTRAINT chk_closed_fields CHECK (
        status = 'open'
        OR (closed_at IS NOT NULL AND closing_amount_declared IS NOT NULL AND discrepancy_amount IS NOT NULL)
    )
);

-- One open shift per cashier
CREATE UNIQUE INDEX idx_cash_sessions_one_open ON cash_sessions(user_id) WHERE status = 'open';
CREATE INDEX idx_cash_sessions_desk ON cash_sessions(cash_desk_id, opened_at DESC);
";

const BOOKINGS_SQL: &str = r"
CREATE TABLE bookings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_reference VARCHAR(32) NOT NULL UNIQUE,
    trip_id UUID NOT NULL REFERENCES trips(id),
    return_trip_id UUID REFERENCES trips(id),
    user_id UUID REFERENCES users(id),
    cash_desk_id UUID REFERENCES cash_desks(id),
    cash_session_id UUID REFERENCES cash_sessions(id),
    total_amount NUMERIC(14, 2) NOT NULL CHECK (total_amount >= 0),
    status booking_status NOT NULL DEFAULT 'confirmed',
    payment_method payment_method NOT NULL,
    created_by UUID REFERENCES users(id),
    cancelled_at TIMESTAMPTZ,
    cancelled_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_booking_return_differs CHECK (return_trip_id IS NULL OR return_trip_id <> trip_id)
);

CREATE INDEX idx_bookings_user ON bookings(user_id);
CREATE INDEX idx_bookings_session ON bookings(cash_session_id) WHERE cash_session_id IS NOT NULL;
";

const TICKETS_SQL: &str = r"
CREATE TABLE tickets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE RESTRICT,
    trip_id UUID NOT NULL REFERENCES trips(id),
    return_trip_id UUID REFERENCES trips(id),
    passenger_name VARCHAR(255) NOT NULL,
    passenger_type passenger_type NOT NULL,
    nationality_group nationality_group NOT NULL,
    fare_amount NUMERIC(14, 2) NOT NULL CHECK (fare_amount >= 0),
    price_paid NUMERIC(14, 2) NOT NULL CHECK (price_paid >= 0),
    subscription_id UUID REFERENCES subscriptions(id),
    status ticket_status NOT NULL DEFAULT 'issued',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_ticket_paid_within_fare CHECK (price_paid <= fare_amount)
);

CREATE INDEX idx_tickets_booking ON tickets(booking_id);
CREATE INDEX idx_tickets_trip ON tickets(trip_id) WHERE status <> 'cancelled';
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID NOT NULL REFERENCES bookings(id),
    amount NUMERIC(14, 2) NOT NULL,
    payment_method payment_method NOT NULL,
    status transaction_status NOT NULL,
    subscription_id UUID REFERENCES subscriptions(id),
    credits_used INTEGER NOT NULL DEFAULT 0 CHECK (credits_used >= 0),
    description TEXT,
    created_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transactions_booking ON transactions(booking_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_trip_capacity
-- Keeps available_seats_pax within the ship's capacity
-- ============================================================
CREATE OR REPLACE FUNCTION check_trip_capacity()
RETURNS TRIGGER AS $$
DECLARE
    ship_capacity INTEGER;
BEGIN
    SELECT capacity_pax INTO ship_capacity
    FROM ships
    WHERE id = NEW.ship_id;

    IF NEW.available_seats_pax > ship_capacity THEN
        RAISE EXCEPTION 'Trip % would hold % seats, ship capacity is %',
            NEW.id, NEW.available_seats_pax, ship_capacity;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_check_trip_capacity
BEFORE INSERT OR UPDATE OF available_seats_pax, ship_id ON trips
FOR EACH ROW
EXECUTE FUNCTION check_trip_capacity();

-- ============================================================
-- FUNCTION: prevent_ledger_modification
-- Transactions are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_ledger_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Ledger transactions are append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_ledger_mod
BEFORE UPDATE OR DELETE ON transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_ledger_modification();

-- ============================================================
-- FUNCTION: prevent_session_reopen
-- Closed sessions are terminal
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_session_reopen()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status <> 'open' THEN
        RAISE EXCEPTION 'Cash session % is already closed', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_session_reopen
BEFORE UPDATE ON cash_sessions
FOR EACH ROW
EXECUTE FUNCTION prevent_session_reopen();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_session_reopen ON cash_sessions;
DROP TRIGGER IF EXISTS trg_prevent_ledger_mod ON transactions;
DROP TRIGGER IF EXISTS trg_check_trip_capacity ON trips;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_session_reopen();
DROP FUNCTION IF EXISTS prevent_ledger_modification();
DROP FUNCTION IF EXISTS check_trip_capacity();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS tickets CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS cash_sessions CASCADE;
DROP TABLE IF EXISTS cash_desks CASCADE;
DROP TABLE IF EXISTS subscriptions CASCADE;
DROP TABLE IF EXISTS subscription_plans CASCADE;
DROP TABLE IF EXISTS pricing_rules CASCADE;
DROP TABLE IF EXISTS trips CASCADE;
DROP TABLE IF EXISTS routes CASCADE;
DROP TABLE IF EXISTS ships CASCADE;
DROP TABLE IF EXISTS ports CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS cash_session_status CASCADE;
DROP TYPE IF EXISTS subscription_status CASCADE;
DROP TYPE IF EXISTS credit_type CASCADE;
DROP TYPE IF EXISTS transaction_status CASCADE;
DROP TYPE IF EXISTS payment_method CASCADE;
DROP TYPE IF EXISTS ticket_status CASCADE;
DROP TYPE IF EXISTS booking_status CASCADE;
DROP TYPE IF EXISTS nationality_group CASCADE;
DROP TYPE IF EXISTS passenger_type CASCADE;
DROP TYPE IF EXISTS trip_status CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
