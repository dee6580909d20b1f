//! Family/status grouping and cumulative stacking for the bar chart.
//!
//! Languages are grouped by family, counted per status, then stacked in the
//! registry's display order. Every family gets one segment per status in the
//! same order, including zero-height segments, so layers line up across bars.

use crate::dedup::UniqueLanguages;
use crate::record::LanguageRecord;
use crate::status::{EndangermentStatus, StatusRegistry};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::debug;

/// Group key for records with a blank family.
pub const UNCLASSIFIED_FAMILY: &str = "Unclassified";

/// Per-status member counts, indexed by display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts([usize; EndangermentStatus::COUNT]);

impl StatusCounts {
    pub fn get(&self, status: EndangermentStatus) -> usize {
        self.0[status.index()]
    }

    fn increment(&mut self, status: EndangermentStatus) {
        self.0[status.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

// Serialized as a label -> count map in display order.
impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EndangermentStatus::COUNT))?;
        for status in EndangermentStatus::ALL {
            map.serialize_entry(status.label(), &self.get(status))?;
        }
        map.end()
    }
}

/// Members of one language family with their per-status counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyStatusGroup {
    pub family: String,
    pub counts: StatusCounts,
    pub members: Vec<LanguageRecord>,
}

impl FamilyStatusGroup {
    pub fn count(&self, status: EndangermentStatus) -> usize {
        self.counts.get(status)
    }

    pub fn total(&self) -> usize {
        self.members.len()
    }

    /// Names of members in one status, in member order.
    pub fn members_with_status(&self, status: EndangermentStatus) -> Vec<&str> {
        self.members
            .iter()
            .filter(|record| record.status() == status)
            .map(|record| record.name.as_str())
            .collect()
    }
}

/// Trimmed family, or [`UNCLASSIFIED_FAMILY`] when blank.
pub(crate) fn family_key(record: &LanguageRecord) -> &str {
    let family = record.language_family.trim();
    if family.is_empty() {
        UNCLASSIFIED_FAMILY
    } else {
        family
    }
}

/// Group languages by family, in order of first appearance.
///
/// Unrecognized statuses count toward `Unknown`.
pub fn group_by_family(languages: &UniqueLanguages) -> Vec<FamilyStatusGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<FamilyStatusGroup> = Vec::new();

    for record in languages {
        let key = family_key(record);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(FamilyStatusGroup {
                family: key.to_string(),
                counts: StatusCounts::default(),
                members: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.counts.increment(record.status());
        group.members.push(record.clone());
    }

    debug!("Grouped {} languages into {} families", languages.len(), groups.len());
    groups
}

/// One layer of one bar: `[baseline, top)` on the count axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackedSegment {
    pub status: EndangermentStatus,
    pub status_index: usize,
    pub baseline: usize,
    pub top: usize,
}

impl StackedSegment {
    pub fn height(&self) -> usize {
        self.top - self.baseline
    }
}

/// All segments of one family's bar, in stacking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyStack {
    pub family: String,
    pub segments: Vec<StackedSegment>,
}

impl FamilyStack {
    /// Top of the last segment.
    pub fn total(&self) -> usize {
        self.segments.last().map(|segment| segment.top).unwrap_or(0)
    }

    pub fn segment(&self, status: EndangermentStatus) -> Option<&StackedSegment> {
        self.segments.iter().find(|segment| segment.status == status)
    }
}

/// Stack one group in the given order. Statuses missing from `order` are not
/// stacked, so pass the full registry order to keep the total invariant.
pub fn stack_group(group: &FamilyStatusGroup, order: &[EndangermentStatus]) -> FamilyStack {
    let mut running = 0;
    let segments = order
        .iter()
        .enumerate()
        .map(|(status_index, &status)| {
            let baseline = running;
            running += group.count(status);
            StackedSegment {
                status,
                status_index,
                baseline,
                top: running,
            }
        })
        .collect();

    FamilyStack {
        family: group.family.clone(),
        segments,
    }
}

/// The stacked-bar dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub status_order: Vec<EndangermentStatus>,
    pub groups: Vec<FamilyStatusGroup>,
    pub stacks: Vec<FamilyStack>,

    /// Tallest bar, the upper bound of the count axis
    pub max_total: usize,
}

impl StackedBarChart {
    /// Group, count and stack in the registry's display order.
    pub fn from_languages(languages: &UniqueLanguages) -> Self {
        Self::with_order(languages, StatusRegistry::get().display_order())
    }

    pub fn with_order(languages: &UniqueLanguages, status_order: Vec<EndangermentStatus>) -> Self {
        let groups = group_by_family(languages);
        let stacks: Vec<FamilyStack> = groups
            .iter()
            .map(|group| stack_group(group, &status_order))
            .collect();
        let max_total = stacks.iter().map(FamilyStack::total).max().unwrap_or(0);

        Self {
            status_order,
            groups,
            stacks,
            max_total,
        }
    }

    pub fn group(&self, family: &str) -> Option<&FamilyStatusGroup> {
        self.groups.iter().find(|group| group.family == family)
    }

    pub fn stack(&self, family: &str) -> Option<&FamilyStack> {
        self.stacks.iter().find(|stack| stack.family == family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, RawRow};

    fn language(name: &str, family: &str, status: &str) -> LanguageRecord {
        let row: RawRow = [
            ("Language Name", name),
            ("Language Family", family),
            ("Endangerment Status", status),
        ]
        .into_iter()
        .collect();
        normalize(&row)
    }

    fn unique(records: Vec<LanguageRecord>) -> UniqueLanguages {
        UniqueLanguages::from_records(records)
    }

    // ==================== group_by_family Tests ====================

    #[test]
    fn test_group_counts_per_status() {
        let groups = group_by_family(&unique(vec![
            language("A", "Bantu", "Endangered"),
            language("B", "Bantu", "Endangered"),
            language("C", "Bantu", "Vulnerable"),
            language("D", "Khoe", "Dormant"),
        ]));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].family, "Bantu");
        assert_eq!(groups[0].count(EndangermentStatus::Endangered), 2);
        assert_eq!(groups[0].count(EndangermentStatus::Vulnerable), 1);
        assert_eq!(groups[0].count(EndangermentStatus::Dormant), 0);
        assert_eq!(groups[0].total(), 3);
        assert_eq!(groups[1].family, "Khoe");
        assert_eq!(groups[1].total(), 1);
    }

    #[test]
    fn test_group_unrecognized_status_counts_as_unknown() {
        let groups = group_by_family(&unique(vec![
            language("A", "Bantu", "Extinct"),
            language("B", "Bantu", "Unknown"),
        ]));

        assert_eq!(groups[0].count(EndangermentStatus::Unknown), 2);
        assert_eq!(groups[0].counts.total(), 2);
    }

    #[test]
    fn test_group_blank_family_is_unclassified() {
        let groups = group_by_family(&unique(vec![
            language("A", "", "Endangered"),
            language("B", "  ", "Endangered"),
        ]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].family, UNCLASSIFIED_FAMILY);
    }

    #[test]
    fn test_members_with_status() {
        let groups = group_by_family(&unique(vec![
            language("A", "Bantu", "Endangered"),
            language("B", "Bantu", "Vulnerable"),
            language("C", "Bantu", "Endangered"),
        ]));

        assert_eq!(
            groups[0].members_with_status(EndangermentStatus::Endangered),
            vec!["A", "C"]
        );
        assert!(groups[0]
            .members_with_status(EndangermentStatus::Awakening)
            .is_empty());
    }

    // ==================== stack_group Tests ====================

    #[test]
    fn test_stack_example_in_fixed_order() {
        let groups = group_by_family(&unique(vec![
            language("A", "F", "Vulnerable"),
            language("B", "F", "Endangered"),
        ]));
        let order = vec![
            EndangermentStatus::Endangered,
            EndangermentStatus::Vulnerable,
            EndangermentStatus::Dormant,
        ];

        let stack = stack_group(&groups[0], &order);

        let endangered = stack.segment(EndangermentStatus::Endangered).unwrap();
        assert_eq!((endangered.baseline, endangered.top), (0, 1));
        let vulnerable = stack.segment(EndangermentStatus::Vulnerable).unwrap();
        assert_eq!((vulnerable.baseline, vulnerable.top), (1, 2));
        let dormant = stack.segment(EndangermentStatus::Dormant).unwrap();
        assert_eq!((dormant.baseline, dormant.top), (2, 2));
        assert_eq!(stack.total(), 2);
    }

    #[test]
    fn test_zero_segments_keep_baselines() {
        let groups = group_by_family(&unique(vec![
            language("A", "F", "Vulnerable"),
            language("B", "F", "Dormant"),
            language("C", "F", "Dormant"),
        ]));
        let stack = stack_group(&groups[0], &EndangermentStatus::ALL);

        assert_eq!(stack.segments.len(), EndangermentStatus::COUNT);
        // Vulnerable [0,1], Endangered [1,1], Critically Endangered [1,1], Dormant [1,3]
        assert_eq!((stack.segments[0].baseline, stack.segments[0].top), (0, 1));
        assert_eq!((stack.segments[1].baseline, stack.segments[1].top), (1, 1));
        assert_eq!((stack.segments[2].baseline, stack.segments[2].top), (1, 1));
        assert_eq!((stack.segments[3].baseline, stack.segments[3].top), (1, 3));
        assert_eq!(stack.segments[3].height(), 2);
        for window in stack.segments.windows(2) {
            assert_eq!(window[0].top, window[1].baseline);
        }
    }

    #[test]
    fn test_segment_indices_follow_order() {
        let groups = group_by_family(&unique(vec![language("A", "F", "Awakening")]));
        let stack = stack_group(&groups[0], &EndangermentStatus::ALL);

        for (i, segment) in stack.segments.iter().enumerate() {
            assert_eq!(segment.status_index, i);
            assert_eq!(segment.status, EndangermentStatus::ALL[i]);
        }
    }

    // ==================== StackedBarChart Tests ====================

    #[test]
    fn test_chart_total_invariant() {
        let chart = StackedBarChart::from_languages(&unique(vec![
            language("A", "Bantu", "Endangered"),
            language("B", "Bantu", "Extinct"),
            language("C", "Khoe", "At risk"),
            language("D", "Bantu", "Awakening"),
            language("E", "Isolate", ""),
        ]));

        for (group, stack) in chart.groups.iter().zip(&chart.stacks) {
            assert_eq!(group.family, stack.family);
            assert_eq!(stack.total(), group.total());
        }
        assert_eq!(chart.max_total, 3);
    }

    #[test]
    fn test_chart_layers_align_across_families() {
        let chart = StackedBarChart::from_languages(&unique(vec![
            language("A", "Bantu", "Endangered"),
            language("B", "Khoe", "Dormant"),
        ]));

        let bantu: Vec<_> = chart.stack("Bantu").unwrap().segments.iter().map(|s| s.status).collect();
        let khoe: Vec<_> = chart.stack("Khoe").unwrap().segments.iter().map(|s| s.status).collect();
        assert_eq!(bantu, khoe);
        assert_eq!(bantu, chart.status_order);
    }

    #[test]
    fn test_chart_empty() {
        let chart = StackedBarChart::from_languages(&UniqueLanguages::default());
        assert!(chart.groups.is_empty());
        assert!(chart.stacks.is_empty());
        assert_eq!(chart.max_total, 0);
    }

    #[test]
    fn test_chart_group_lookup() {
        let chart = StackedBarChart::from_languages(&unique(vec![language("A", "Bantu", "Endangered")]));
        assert!(chart.group("Bantu").is_some());
        assert!(chart.group("Khoe").is_none());
    }

    #[test]
    fn test_status_counts_serialize_in_display_order() {
        let groups = group_by_family(&unique(vec![language("A", "F", "Dormant")]));
        let json = serde_json::to_string(&groups[0].counts).unwrap();

        assert!(json.starts_with("{\"Vulnerable\":0,\"Endangered\":0"));
        assert!(json.contains("\"Dormant\":1"));
    }
}
