//! Coverage checks and deductions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use navette_shared::types::UserId;

use super::error::WalletError;
use super::types::{SubscriptionStatus, TripLegs, Wallet, WalletBalance, WalletCharge};

impl Wallet {
    /// Checks that the wallet may be used at `now`.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Inactive` for blocked or expired status, and
    /// `WalletError::Expired` once `ends_at` has passed.
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), WalletError> {
        if self.status != SubscriptionStatus::Active {
            return Err(WalletError::Inactive {
                id: self.id,
                status: self.status,
            });
        }
        if self.ends_at <= now {
            return Err(WalletError::Expired(self.id));
        }
        Ok(())
    }

    /// Checks that the wallet belongs to the booking's owning user.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NotOwner` on mismatch or when the booking has no owner.
    pub fn ensure_owned_by(&self, owner: Option<UserId>) -> Result<(), WalletError> {
        match owner {
            Some(user_id) if user_id == self.owner_id => Ok(()),
            _ => Err(WalletError::NotOwner(self.id)),
        }
    }

    /// Returns true if the wallet can pay a ticket of `legs` costing `fare`.
    #[must_use]
    pub fn can_cover(&self, legs: TripLegs, fare: Decimal) -> bool {
        match self.balance {
            WalletBalance::Unlimited => true,
            WalletBalance::Counted { remaining } => remaining >= legs.count(),
            WalletBalance::Legacy { balance } => balance >= fare,
        }
    }

    /// Deducts one ticket from the wallet.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Insufficient` if the balance would go negative;
    /// the wallet is left untouched.
    pub fn deduct(&mut self, legs: TripLegs, fare: Decimal) -> Result<WalletCharge, WalletError> {
        if !self.can_cover(legs, fare) {
            return Err(WalletError::Insufficient(self.id));
        }

        let charge = match &mut self.balance {
            WalletBalance::Unlimited => WalletCharge::Unlimited,
            WalletBalance::Counted { remaining } => {
                *remaining -= legs.count();
                WalletCharge::Credits(legs.count())
            }
            WalletBalance::Legacy { balance } => {
                *balance -= fare;
                WalletCharge::Amount(fare)
            }
        };

        Ok(charge)
    }
}

/// Applies the multi-passenger coverage policy across one sale.
///
/// Passengers are offered in listed order. Without multi-passenger coverage
/// only the flagged holder may draw; with it, everyone draws until the wallet
/// runs dry and the rest pay full price.
#[derive(Debug)]
pub struct WalletDrawdown<'a> {
    wallet: &'a mut Wallet,
    covered: usize,
}

impl<'a> WalletDrawdown<'a> {
    /// Starts a drawdown against a usable, owned wallet.
    #[must_use]
    pub const fn new(wallet: &'a mut Wallet) -> Self {
        Self { wallet, covered: 0 }
    }

    /// Tries to cover one passenger; `None` means the passenger pays full price.
    ///
    /// Zero fares are never covered so they consume no credit.
    pub fn try_cover(
        &mut self,
        is_holder: bool,
        legs: TripLegs,
        fare: Decimal,
    ) -> Option<WalletCharge> {
        if fare <= Decimal::ZERO {
            return None;
        }
        if !self.wallet.allow_multi_passenger && !is_holder {
            return None;
        }

        let charge = self.wallet.deduct(legs, fare).ok()?;
        self.covered += 1;
        Some(charge)
    }

    /// Number of passengers covered so far.
    #[must_use]
    pub const fn covered(&self) -> usize {
        self.covered
    }

    /// The wallet as it stands after the deductions.
    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &*self.wallet
    }
}
