//! Roles and guest accounts.
//!
//! Roles decide who may sell at a desk, cancel after departure and
//! force-close a cashier's session. Guest accounts are created at checkout
//! for purchasers who are not signed in.

mod guest;
mod password;

pub use guest::{GuestAccountError, GuestAccountRequest};
pub use password::{PasswordError, hash_password};

use serde::{Deserialize, Serialize};

/// Platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Self-service traveller.
    Customer,
    /// Sells at a cash desk.
    Cashier,
    /// Oversees cashiers.
    Supervisor,
    /// Full access.
    Admin,
}

impl UserRole {
    /// Returns true if this role may record sales at a cash desk.
    #[must_use]
    pub const fn can_sell_at_desk(self) -> bool {
        matches!(self, Self::Cashier | Self::Supervisor | Self::Admin)
    }

    /// Returns true if this role is exempt from ownership and departure
    /// restrictions on bookings.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Supervisor | Self::Admin)
    }

    /// Returns true if this role may cancel a booking whose trip has left.
    #[must_use]
    pub const fn can_cancel_after_departure(self) -> bool {
        self.is_privileged()
    }

    /// Returns true if this role may close another cashier's session.
    #[must_use]
    pub const fn can_force_close_session(self) -> bool {
        self.is_privileged()
    }
}

string_enum!(UserRole, "role" {
    Customer => "customer",
    Cashier => "cashier",
    Supervisor => "supervisor",
    Admin => "admin",
});
