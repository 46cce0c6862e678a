//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use navette_core::auth::{GuestAccountError, GuestAccountRequest, PasswordError, hash_password};

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Error types for account creation.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Account request is malformed.
    #[error(transparent)]
    Invalid(#[from] GuestAccountError),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Creates a guest customer inside the caller's transaction.
pub(crate) async fn insert_guest<C: ConnectionTrait>(
    conn: &C,
    request: &GuestAccountRequest,
) -> Result<users::Model, UserError> {
    request.validate()?;
    let email = request.normalized_email();

    let taken = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .count(conn)
        .await?
        > 0;
    if taken {
        return Err(UserError::EmailTaken(email));
    }

    let password_hash = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(hash_password)
        .transpose()?;

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(email),
        full_name: Set(request.full_name.trim().to_string()),
        phone: Set(request.phone.clone().filter(|p| !p.trim().is_empty())),
        password_hash: Set(password_hash),
        role: Set(UserRole::Customer),
        is_guest: Set(true),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(user.insert(conn).await?)
}

/// User repository for account lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a guest customer account on its own.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` or `EmailTaken` for a rejected request.
    pub async fn create_guest(
        &self,
        request: &GuestAccountRequest,
    ) -> Result<users::Model, UserError> {
        let txn = self.db.begin().await?;
        let user = insert_guest(&txn, request).await?;
        txn.commit().await?;
        Ok(user)
    }
}
