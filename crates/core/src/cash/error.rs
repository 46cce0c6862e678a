//! Cash session error types.

use thiserror::Error;

use navette_shared::types::{CashDeskId, CashSessionId};

/// Errors raised by the cash session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CashSessionError {
    /// The cashier already has an open session.
    #[error("Cashier already has open session {0}")]
    AlreadyOpen(CashSessionId),

    /// The cashier has no open session.
    #[error("No open cash session")]
    NoOpenSession,

    /// The session has already been closed.
    #[error("Cash session {0} is already closed")]
    AlreadyClosed(CashSessionId),

    /// The session does not belong to this cashier or desk.
    #[error("Cash session {0} does not match the seller or desk")]
    Mismatch(CashSessionId),

    /// Desk does not exist.
    #[error("Cash desk {0} not found")]
    DeskNotFound(CashDeskId),

    /// Desk is deactivated.
    #[error("Cash desk {0} is inactive")]
    DeskInactive(CashDeskId),

    /// Session does not exist.
    #[error("Cash session {0} not found")]
    SessionNotFound(CashSessionId),

    /// Amount is negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Actor lacks the role for this operation.
    #[error("Not allowed to {0}")]
    NotAllowed(&'static str),
}

impl CashSessionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyOpen(_) => "SESSION_ALREADY_OPEN",
            Self::NoOpenSession => "NO_OPEN_SESSION",
            Self::AlreadyClosed(_) => "SESSION_ALREADY_CLOSED",
            Self::Mismatch(_) => "SESSION_MISMATCH",
            Self::DeskNotFound(_) => "DESK_NOT_FOUND",
            Self::DeskInactive(_) => "DESK_INACTIVE",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::InvalidAmount(_) => "VALIDATION_ERROR",
            Self::NotAllowed(_) => "FORBIDDEN",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyOpen(_) | Self::NoOpenSession | Self::AlreadyClosed(_) | Self::Mismatch(_) => {
                409
            }
            Self::DeskNotFound(_) | Self::SessionNotFound(_) => 404,
            Self::DeskInactive(_) | Self::InvalidAmount(_) => 400,
            Self::NotAllowed(_) => 403,
        }
    }
}
