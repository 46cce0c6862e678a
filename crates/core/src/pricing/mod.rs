//! Fare resolution.
//!
//! A fare comes from one of two layered sources:
//! - the trip's own override table (`pricing_settings`), matched by passenger
//!   type and a nationality keyword found in the category name
//! - the route's standing rule table, matched exactly on
//!   (passenger type, nationality group)
//!
//! The keyword heuristic lives behind [`CategoryMatcher`] so a structured
//! mapping can replace it without touching the reservation engine.

pub mod error;
pub mod matcher;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::PricingError;
pub use matcher::{CategoryMatcher, KeywordMatcher};
pub use resolver::PricingResolver;
pub use types::{
    FareCategory, FareSource, NationalityGroup, PassengerType, PricingRule, ResolvedFare,
    TripFareTable,
};
