//! Name-keyed deduplication shared by every derived dataset.

use crate::record::LanguageRecord;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Records with at most one entry per `name`, in first-occurrence order.
///
/// Apart from the empty default, the only constructor is
/// [`UniqueLanguages::from_records`], so any non-empty value has passed through
/// the same first-wins policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UniqueLanguages {
    records: Vec<LanguageRecord>,
}

impl UniqueLanguages {
    /// Keep the first record seen for each name, with all of its fields.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LanguageRecord>,
    {
        let mut seen = HashSet::new();
        let mut dropped = 0usize;
        let records: Vec<LanguageRecord> = records
            .into_iter()
            .filter(|record| {
                let first = seen.insert(record.name.clone());
                if !first {
                    dropped += 1;
                }
                first
            })
            .collect();

        debug!(
            "Deduplicated to {} languages ({} duplicates dropped)",
            records.len(),
            dropped
        );
        Self { records }
    }

    /// Subset of this set. A subset of unique records is still unique.
    pub(crate) fn retain<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&LanguageRecord) -> bool,
    {
        Self {
            records: self
                .records
                .iter()
                .filter(|&record| predicate(record))
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&LanguageRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LanguageRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[LanguageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_inner(self) -> Vec<LanguageRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a UniqueLanguages {
    type Item = &'a LanguageRecord;
    type IntoIter = std::slice::Iter<'a, LanguageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, RawRow};
    use proptest::prelude::*;

    fn language(name: &str, country: &str) -> LanguageRecord {
        let row: RawRow = [
            ("Language Name", name),
            ("Country", country),
            ("Latitude", "0"),
            ("Longitude", "0"),
        ]
        .into_iter()
        .collect();
        normalize(&row)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let unique = UniqueLanguages::from_records(vec![language("A", "X"), language("A", "Y")]);

        assert_eq!(unique.len(), 1);
        assert_eq!(unique.get("A").unwrap().country, "X");
    }

    #[test]
    fn test_order_of_first_occurrence_is_preserved() {
        let unique = UniqueLanguages::from_records(vec![
            language("C", "1"),
            language("A", "2"),
            language("C", "3"),
            language("B", "4"),
            language("A", "5"),
        ]);

        let names: Vec<_> = unique.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(unique.get("A").unwrap().country, "2");
    }

    #[test]
    fn test_empty_input() {
        let unique = UniqueLanguages::from_records(Vec::new());
        assert!(unique.is_empty());
        assert_eq!(unique.len(), 0);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let unique = UniqueLanguages::from_records(vec![language("ainu", "X"), language("Ainu", "Y")]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_retain_keeps_order() {
        let unique = UniqueLanguages::from_records(vec![
            language("A", "Kenya"),
            language("B", "Peru"),
            language("C", "Kenya"),
        ]);
        let subset = unique.retain(|r| r.country == "Kenya");

        let names: Vec<_> = subset.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let unique = UniqueLanguages::from_records(vec![language("A", "X")]);
        let json = serde_json::to_value(&unique).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "A");
    }

    proptest! {
        #[test]
        fn prop_dedup_is_idempotent(names in prop::collection::vec("[a-d]{1,2}", 0..40)) {
            let records: Vec<_> = names.iter().map(|n| language(n, "X")).collect();
            let once = UniqueLanguages::from_records(records);
            let twice = UniqueLanguages::from_records(once.clone().into_inner());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_dedup_yields_distinct_names(names in prop::collection::vec("[a-d]{1,2}", 0..40)) {
            let records: Vec<_> = names.iter().map(|n| language(n, "X")).collect();
            let unique = UniqueLanguages::from_records(records);

            let distinct: HashSet<_> = names.iter().collect();
            prop_assert_eq!(unique.len(), distinct.len());
        }
    }
}
