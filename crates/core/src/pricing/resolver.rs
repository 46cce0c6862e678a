//! Layered fare resolution.

use super::error::PricingError;
use super::matcher::{CategoryMatcher, KeywordMatcher};
use super::types::{
    FareSource, NationalityGroup, PassengerType, PricingRule, ResolvedFare, TripFareTable,
};

/// Resolves a passenger's fare on a trip.
///
/// Precedence, most specific first:
/// 1. trip category of the passenger's fare class whose name matches the group,
/// 2. first trip category of the passenger's fare class,
/// 3. active route rule for the exact (type, group) pair.
#[derive(Debug, Clone, Default)]
pub struct PricingResolver<M = KeywordMatcher> {
    matcher: M,
}

impl PricingResolver<KeywordMatcher> {
    /// Creates a resolver using the default keyword heuristic.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            matcher: KeywordMatcher,
        }
    }
}

impl<M: CategoryMatcher> PricingResolver<M> {
    /// Creates a resolver with a custom category matcher.
    #[must_use]
    pub const fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// Resolves the fare for one passenger on one leg.
    ///
    /// `rules` are the route's pricing rules; inactive ones are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::PriceNotFound` when no source covers the pair.
    pub fn resolve_fare(
        &self,
        fare_table: Option<&TripFareTable>,
        rules: &[PricingRule],
        passenger_type: PassengerType,
        nationality_group: NationalityGroup,
    ) -> Result<ResolvedFare, PricingError> {
        if let Some(fare) = fare_table
            .filter(|t| !t.is_empty())
            .and_then(|t| self.from_trip_table(t, passenger_type, nationality_group))
        {
            return Ok(fare);
        }

        Self::from_route_rules(rules, passenger_type, nationality_group).ok_or(
            PricingError::PriceNotFound {
                passenger_type,
                nationality_group,
            },
        )
    }

    fn from_trip_table(
        &self,
        table: &TripFareTable,
        passenger_type: PassengerType,
        nationality_group: NationalityGroup,
    ) -> Option<ResolvedFare> {
        let wanted = passenger_type.fare_class();
        let mut of_type = table
            .categories
            .iter()
            .filter(|c| c.fare_class() == Some(wanted))
            .peekable();

        let first = of_type.peek().copied()?;

        if let Some(category) = of_type.find(|c| self.matcher.matches(&c.name, nationality_group)) {
            return Some(ResolvedFare {
                amount: category.price,
                source: FareSource::TripCategory {
                    name: category.name.clone(),
                },
            });
        }

        Some(ResolvedFare {
            amount: first.price,
            source: FareSource::TripTypeFallback {
                name: first.name.clone(),
            },
        })
    }

    fn from_route_rules(
        rules: &[PricingRule],
        passenger_type: PassengerType,
        nationality_group: NationalityGroup,
    ) -> Option<ResolvedFare> {
        let active_for_group = || {
            rules
                .iter()
                .filter(|r| r.is_active && r.nationality_group == nationality_group)
        };

        // An exact rule wins; a baby otherwise pays the child rule.
        let rule = active_for_group()
            .find(|r| r.passenger_type == passenger_type)
            .or_else(|| {
                active_for_group()
                    .find(|r| r.passenger_type.fare_class() == passenger_type.fare_class())
            })?;

        Some(ResolvedFare {
            amount: rule.fare(),
            source: FareSource::RouteRule { rule_id: rule.id },
        })
    }
}
