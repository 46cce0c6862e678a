//! Subscription wallet persistence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set,
    Unchanged,
};

use navette_core::wallet::{CreditType, Wallet, WalletBalance};
use navette_shared::types::{SubscriptionId, UserId};

use super::trip::RowLock;
use crate::entities::{subscription_plans, subscriptions};

/// Error types for subscription operations.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// Subscription not found.
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    /// A stored balance does not fit the plan's credit type.
    #[error("Corrupt wallet {0}: {1}")]
    Corrupt(SubscriptionId, String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Reads a subscription and its plan as a [`Wallet`].
pub(crate) async fn load_wallet<C: ConnectionTrait>(
    conn: &C,
    id: SubscriptionId,
    lock: RowLock,
) -> Result<Option<Wallet>, SubscriptionError> {
    let mut query = subscriptions::Entity::find_by_id(id.into_inner());
    if lock == RowLock::ForUpdate {
        query = query.lock_exclusive();
    }
    let Some(subscription) = query.one(conn).await? else {
        return Ok(None);
    };

    let plan = subscription_plans::Entity::find_by_id(subscription.plan_id)
        .one(conn)
        .await?
        .ok_or_else(|| SubscriptionError::Corrupt(id, "plan is missing".to_string()))?;

    to_wallet(&subscription, &plan).map(Some)
}

fn to_wallet(
    subscription: &subscriptions::Model,
    plan: &subscription_plans::Model,
) -> Result<Wallet, SubscriptionError> {
    let id = SubscriptionId::from_uuid(subscription.id);

    let balance = match CreditType::from(plan.credit_type) {
        CreditType::Unlimited => WalletBalance::Unlimited,
        CreditType::Counted => {
            let remaining = subscription.voyage_credits_remaining.unwrap_or(0);
            WalletBalance::Counted {
                remaining: u32::try_from(remaining).map_err(|_| {
                    SubscriptionError::Corrupt(id, format!("{remaining} credits remaining"))
                })?,
            }
        }
        CreditType::Legacy => WalletBalance::Legacy {
            balance: subscription.legacy_credit_fcfa.unwrap_or(Decimal::ZERO),
        },
    };

    Ok(Wallet {
        id,
        owner_id: UserId::from_uuid(subscription.user_id),
        status: subscription.status.into(),
        ends_at: subscription.ends_at.with_timezone(&Utc),
        allow_multi_passenger: plan.allow_multi_passenger,
        balance,
    })
}

/// Writes a wallet's balance back to its locked row.
pub(crate) async fn save_balance<C: ConnectionTrait>(
    conn: &C,
    wallet: &Wallet,
    now: DateTime<Utc>,
) -> Result<(), SubscriptionError> {
    let mut model = subscriptions::ActiveModel {
        id: Unchanged(wallet.id.into_inner()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    match wallet.balance {
        WalletBalance::Unlimited => {}
        WalletBalance::Counted { remaining } => {
            let remaining = i32::try_from(remaining).map_err(|_| {
                SubscriptionError::Corrupt(wallet.id, format!("{remaining} credits overflow"))
            })?;
            model.voyage_credits_remaining = Set(Some(remaining));
        }
        WalletBalance::Legacy { balance } => {
            model.legacy_credit_fcfa = Set(Some(balance));
        }
    }

    model.update(conn).await?;
    Ok(())
}

/// Subscription repository for wallet reads.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    db: DatabaseConnection,
}

impl SubscriptionRepository {
    /// Creates a new subscription repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a wallet by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown subscription.
    pub async fn get_wallet(&self, id: SubscriptionId) -> Result<Wallet, SubscriptionError> {
        load_wallet(&self.db, id, RowLock::None)
            .await?
            .ok_or(SubscriptionError::NotFound(id))
    }
}
