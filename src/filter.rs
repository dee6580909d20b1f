//! Record filters and the option lists a filter UI offers.

use crate::dedup::UniqueLanguages;
use crate::families::family_key;
use crate::record::LanguageRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Exact-match filter on status, region and family.
///
/// Values are compared after trimming. `None` or an empty value matches
/// anything, however the filter was built. Families are matched on the same key
/// the bar chart groups by, so blank families are selected with "Unclassified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub status: Option<String>,
    pub region: Option<String>,
    pub family: Option<String>,
}

impl RecordFilter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = non_blank(status.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_blank(region.into());
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = non_blank(family.into());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        selection(&self.status).is_none()
            && selection(&self.region).is_none()
            && selection(&self.family).is_none()
    }

    pub fn matches(&self, record: &LanguageRecord) -> bool {
        accepts(&self.status, &record.endangerment_status)
            && accepts(&self.region, &record.region)
            && accepts(&self.family, family_key(record))
    }

    /// Matching records, in their original order.
    pub fn apply(&self, languages: &UniqueLanguages) -> UniqueLanguages {
        if self.is_unrestricted() {
            return languages.clone();
        }
        languages.retain(|record| self.matches(record))
    }
}

// An empty selection means "All".
fn selection(wanted: &Option<String>) -> Option<&str> {
    wanted.as_deref().map(str::trim).filter(|wanted| !wanted.is_empty())
}

fn accepts(wanted: &Option<String>, actual: &str) -> bool {
    selection(wanted).map_or(true, |wanted| wanted == actual.trim())
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Distinct trimmed values for each filter, in order of first appearance.
///
/// Families use the bar chart's group key, so there is one option per bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub regions: Vec<String>,
    pub families: Vec<String>,
}

impl FilterOptions {
    pub fn from_languages(languages: &UniqueLanguages) -> Self {
        Self {
            statuses: distinct(languages, |r| r.endangerment_status.as_str()),
            regions: distinct(languages, |r| r.region.as_str()),
            families: distinct(languages, family_key),
        }
    }
}

fn distinct<F>(languages: &UniqueLanguages, field: F) -> Vec<String>
where
    F: Fn(&LanguageRecord) -> &str,
{
    let mut seen = HashSet::new();
    languages
        .iter()
        .map(|record| field(record).trim())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
