//! Listing filters shared by sales, purchases and payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter for document listings. Results are sorted newest first.
///
/// `from`/`to` bound the **creation timestamp**, not the business `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    /// Case-insensitive substring of the party name or document number.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub party_id: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn party(mut self, party_id: impl Into<String>) -> Self {
        self.party_id = Some(party_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when any of `fields` contains the search term (ignoring case).
    pub fn matches_search<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                fields
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }

    pub fn matches_party(&self, party_id: Option<&str>) -> bool {
        match &self.party_id {
            None => true,
            Some(wanted) => party_id == Some(wanted.as_str()),
        }
    }

    /// Inclusive on both ends.
    pub fn matches_created(&self, created_at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| created_at >= from)
            && self.to.map_or(true, |to| created_at <= to)
    }
}

/// Case-insensitive substring match used by party and item searches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = ListFilter::default().search("rAmEsh");
        assert!(filter.matches_search(["Ramesh Traders", "7"]));
        assert!(!filter.matches_search(["Suresh", "7"]));
        assert!(ListFilter::default().matches_search(["anything"]));
    }

    #[test]
    fn test_party_filter() {
        let filter = ListFilter::default().party("p1");
        assert!(filter.matches_party(Some("p1")));
        assert!(!filter.matches_party(Some("p2")));
        assert!(!filter.matches_party(None));
    }

    #[test]
    fn test_created_range() {
        let now = Utc::now();
        let filter = ListFilter {
            from: Some(now - Duration::days(1)),
            to: Some(now),
            ..Default::default()
        };
        assert!(filter.matches_created(now));
        assert!(!filter.matches_created(now - Duration::days(2)));
        assert!(!filter.matches_created(now + Duration::seconds(1)));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Basmati Rice", "rice"));
        assert!(contains_ignore_case("Basmati Rice", ""));
        assert!(!contains_ignore_case("Wheat", "rice"));
    }
}
