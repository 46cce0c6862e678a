//! Category-name matching for trip fare tables.

use super::types::NationalityGroup;

/// Decides whether a free-text fare category fits a nationality group.
pub trait CategoryMatcher {
    /// Returns true if `category_name` is meant for `group`.
    fn matches(&self, category_name: &str, group: NationalityGroup) -> bool;
}

/// Keyword heuristic over French category labels.
///
/// The keyword lists are plain substring tests with one deliberate departure:
/// "Non Résident" and "International" contain the national/resident keywords
/// as substrings, so foreign keywords are checked first and win. Without that
/// guard a "Non Résident" category would also be sold as the resident fare.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

const FOREIGN_KEYWORDS: &[&str] = &[
    "non résident",
    "non resident",
    "non-résident",
    "non-resident",
    "international",
    "hors",
    "étranger",
    "etranger",
];

const NATIONAL_KEYWORDS: &[&str] = &["national", "résident", "resident", "local"];

const AFRICAN_KEYWORDS: &[&str] = &["afrique", "africain", "cedeao"];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

impl CategoryMatcher for KeywordMatcher {
    fn matches(&self, category_name: &str, group: NationalityGroup) -> bool {
        let name = category_name.to_lowercase();

        if contains_any(&name, FOREIGN_KEYWORDS) {
            return group == NationalityGroup::HorsAfrique;
        }

        match group {
            NationalityGroup::National | NationalityGroup::Resident => {
                contains_any(&name, NATIONAL_KEYWORDS)
            }
            NationalityGroup::African => contains_any(&name, AFRICAN_KEYWORDS),
            NationalityGroup::HorsAfrique => false,
        }
    }
}
