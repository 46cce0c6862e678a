//! Core business logic for Navette.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Everything here operates on rows the caller has already read and locked.
//!
//! # Modules
//!
//! - `pricing` - Layered fare resolution (trip fare table, then route rules)
//! - `wallet` - Subscription wallet coverage and deduction
//! - `reservation` - Sale planning, ledger lines, cancellation
//! - `cash` - Cash desk session state machine and shift summary
//! - `auth` - Roles, guest accounts, password hashing

#[macro_use]
mod macros;

pub mod auth;
pub mod cash;
pub mod pricing;
pub mod reservation;
pub mod wallet;
