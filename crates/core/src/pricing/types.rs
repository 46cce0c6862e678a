//! Pricing domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use navette_shared::types::{PricingRuleId, RouteId};

use super::error::PricingError;

/// Passenger type as declared at sale time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    /// Adult passenger.
    Adult,
    /// Child passenger.
    Child,
    /// Infant; priced as a child.
    Baby,
}

impl PassengerType {
    /// Returns the type used to look up fares (`baby` is priced as `child`).
    #[must_use]
    pub const fn fare_class(self) -> Self {
        match self {
            Self::Baby => Self::Child,
            other => other,
        }
    }

    /// Parses the free-text type declared on a trip fare category.
    ///
    /// Fare tables are typed in by operators, so French labels are accepted too.
    #[must_use]
    pub fn parse_declared(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "adult" | "adulte" | "adults" | "adultes" => Some(Self::Adult),
            "child" | "enfant" | "children" | "enfants" => Some(Self::Child),
            "baby" | "bébé" | "bebe" | "infant" | "nourrisson" => Some(Self::Baby),
            _ => None,
        }
    }
}

string_enum!(PassengerType, "passenger type" {
    Adult => "adult",
    Child => "child",
    Baby => "baby",
});

/// Nationality group used for tiered fares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NationalityGroup {
    /// Citizen.
    National,
    /// Foreign resident.
    Resident,
    /// Citizen of another African country.
    African,
    /// Everyone else.
    HorsAfrique,
}

string_enum!(NationalityGroup, "nationality group" {
    National => "national",
    Resident => "resident",
    African => "african",
    HorsAfrique => "hors_afrique",
});

/// One category of a trip override fare table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareCategory {
    /// Free-text category name, e.g. "Adulte Non Résident".
    pub name: String,
    /// Declared passenger type, e.g. "adult" or "enfant".
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Fare for this category.
    pub price: Decimal,
}

impl FareCategory {
    /// Returns the fare class of the declared type, if it is recognised.
    #[must_use]
    pub fn fare_class(&self) -> Option<PassengerType> {
        PassengerType::parse_declared(&self.declared_type).map(PassengerType::fare_class)
    }
}

/// Override fare table scoped to a single trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripFareTable {
    /// Categories in operator-defined order.
    #[serde(default)]
    pub categories: Vec<FareCategory>,
}

impl TripFareTable {
    /// Parses a trip's `pricing_settings` JSON document.
    ///
    /// A `null` document yields `None`; an empty category list is kept as-is
    /// and treated by the resolver like an absent table.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidFareTable` if the document is malformed
    /// or carries a negative price.
    pub fn from_json(value: &serde_json::Value) -> Result<Option<Self>, PricingError> {
        if value.is_null() {
            return Ok(None);
        }

        let table: Self = serde_json::from_value(value.clone())
            .map_err(|e| PricingError::InvalidFareTable(e.to_string()))?;

        if let Some(category) = table.categories.iter().find(|c| c.price < Decimal::ZERO) {
            return Err(PricingError::InvalidFareTable(format!(
                "negative price for category '{}'",
                category.name
            )));
        }

        Ok(Some(table))
    }

    /// Returns true if the table has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Route-level standing fare for a (type, nationality group) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRule {
    /// Rule ID.
    pub id: PricingRuleId,
    /// Route the rule applies to.
    pub route_id: RouteId,
    /// Passenger type.
    pub passenger_type: PassengerType,
    /// Nationality group.
    pub nationality_group: NationalityGroup,
    /// Base price before tax.
    pub base_price: Decimal,
    /// Tax added on top of the base price.
    pub tax_amount: Decimal,
    /// Inactive rules are ignored.
    pub is_active: bool,
}

impl PricingRule {
    /// Returns the fare charged under this rule.
    #[must_use]
    pub fn fare(&self) -> Decimal {
        self.base_price + self.tax_amount
    }
}

/// Where a resolved fare came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FareSource {
    /// Trip category matched on type and nationality keyword.
    TripCategory {
        /// Category name.
        name: String,
    },
    /// First trip category of the right type, no keyword match.
    TripTypeFallback {
        /// Category name.
        name: String,
    },
    /// Route-level rule.
    RouteRule {
        /// Rule ID.
        rule_id: PricingRuleId,
    },
}

/// A fare together with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFare {
    /// Fare amount.
    pub amount: Decimal,
    /// Source of the fare.
    pub source: FareSource,
}
