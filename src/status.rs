//! Status registry: single source of truth for endangerment statuses.
//!
//! Every consumer (globe colors, the legend, the stacked-bar layer order)
//! resolves statuses through [`StatusRegistry::get`]. The declaration order of
//! [`EndangermentStatus::ALL`] is the display order and the stacking order.

use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Endangerment status as understood by the registry.
///
/// Raw status text that matches none of the labels resolves to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum EndangermentStatus {
    #[serde(rename = "Vulnerable")]
    Vulnerable,
    #[serde(rename = "Endangered")]
    Endangered,
    #[serde(rename = "Critically Endangered")]
    CriticallyEndangered,
    #[serde(rename = "Dormant")]
    Dormant,
    #[serde(rename = "Threatened")]
    Threatened,
    #[serde(rename = "Severely Endangered")]
    SeverelyEndangered,
    #[serde(rename = "At risk")]
    AtRisk,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "Awakening")]
    Awakening,
}

impl EndangermentStatus {
    /// Number of statuses in the registry.
    pub const COUNT: usize = 9;

    /// All statuses in display order.
    pub const ALL: [EndangermentStatus; Self::COUNT] = [
        EndangermentStatus::Vulnerable,
        EndangermentStatus::Endangered,
        EndangermentStatus::CriticallyEndangered,
        EndangermentStatus::Dormant,
        EndangermentStatus::Threatened,
        EndangermentStatus::SeverelyEndangered,
        EndangermentStatus::AtRisk,
        EndangermentStatus::Unknown,
        EndangermentStatus::Awakening,
    ];

    /// Position of this status in the display order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label as it appears in the source table.
    pub fn label(self) -> &'static str {
        match self {
            EndangermentStatus::Vulnerable => "Vulnerable",
            EndangermentStatus::Endangered => "Endangered",
            EndangermentStatus::CriticallyEndangered => "Critically Endangered",
            EndangermentStatus::Dormant => "Dormant",
            EndangermentStatus::Threatened => "Threatened",
            EndangermentStatus::SeverelyEndangered => "Severely Endangered",
            EndangermentStatus::AtRisk => "At risk",
            EndangermentStatus::Unknown => "Unknown",
            EndangermentStatus::Awakening => "Awakening",
        }
    }

    /// Display color from the registry.
    pub fn color(self) -> &'static str {
        StatusRegistry::get().config(self).color
    }
}

impl fmt::Display for EndangermentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registry entry for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusConfig {
    pub status: EndangermentStatus,

    /// Label as it appears in the source table (e.g. "At risk")
    pub label: &'static str,

    /// Hex display color (e.g. "#FFCA28")
    pub color: &'static str,
}

/// One legend row, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

/// Global status registry singleton.
///
/// Initialized once on first access and immutable thereafter. Entries are
/// stored in display order, so `statuses[status.index()]` is always the
/// entry for `status`.
pub struct StatusRegistry {
    statuses: Vec<StatusConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<StatusRegistry> = OnceLock::new();

impl StatusRegistry {
    /// Get the global status registry instance.
    pub fn get() -> &'static StatusRegistry {
        REGISTRY.get_or_init(|| StatusRegistry {
            statuses: default_statuses(),
        })
    }

    /// Look up a registry entry by its exact label.
    ///
    /// Surrounding whitespace is ignored; case is not.
    pub fn get_by_label(&self, label: &str) -> Option<&StatusConfig> {
        let label = label.trim();
        self.statuses.iter().find(|config| config.label == label)
    }

    /// Resolve raw status text, falling back to `Unknown`.
    pub fn resolve(&self, raw: &str) -> EndangermentStatus {
        self.get_by_label(raw)
            .map(|config| config.status)
            .unwrap_or_default()
    }

    /// Whether raw status text names a registered status.
    pub fn is_recognized(&self, raw: &str) -> bool {
        self.get_by_label(raw).is_some()
    }

    /// Registry entry for a status.
    pub fn config(&self, status: EndangermentStatus) -> &StatusConfig {
        &self.statuses[status.index()]
    }

    /// Display color for raw status text (the `Unknown` color when unrecognized).
    pub fn color_for(&self, raw: &str) -> &'static str {
        self.config(self.resolve(raw)).color
    }

    /// Statuses in display order. This is the stacking order for bar layers.
    pub fn display_order(&self) -> Vec<EndangermentStatus> {
        self.statuses.iter().map(|config| config.status).collect()
    }

    /// Legend rows in display order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.statuses
            .iter()
            .map(|config| LegendEntry {
                label: config.label,
                color: config.color,
            })
            .collect()
    }
}

/// Default status table, in display order.
fn default_statuses() -> Vec<StatusConfig> {
    EndangermentStatus::ALL
        .iter()
        .map(|&status| StatusConfig {
            status,
            label: status.label(),
            color: default_color(status),
        })
        .collect()
}

fn default_color(status: EndangermentStatus) -> &'static str {
    match status {
        EndangermentStatus::Vulnerable => "#FFCA28",
        EndangermentStatus::Endangered => "#FF7043",
        EndangermentStatus::CriticallyEndangered => "#D84315",
        EndangermentStatus::Dormant => "#42A5F5",
        EndangermentStatus::Threatened => "#FFB74D",
        EndangermentStatus::SeverelyEndangered => "#8E24AA",
        EndangermentStatus::AtRisk => "#66BB6A",
        EndangermentStatus::Unknown => "#9E9E9E",
        EndangermentStatus::Awakening => "#00ACC1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = StatusRegistry::get();
        let registry2 = StatusRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_entries_are_indexed_by_status() {
        let registry = StatusRegistry::get();
        for status in EndangermentStatus::ALL {
            assert_eq!(registry.config(status).status, status);
        }
    }

    #[test]
    fn test_resolve_known_labels() {
        let registry = StatusRegistry::get();
        assert_eq!(registry.resolve("Vulnerable"), EndangermentStatus::Vulnerable);
        assert_eq!(
            registry.resolve("Critically Endangered"),
            EndangermentStatus::CriticallyEndangered
        );
        assert_eq!(registry.resolve("At risk"), EndangermentStatus::AtRisk);
        assert_eq!(registry.resolve("Awakening"), EndangermentStatus::Awakening);
    }

    #[test]
    fn test_resolve_ignores_surrounding_whitespace() {
        let registry = StatusRegistry::get();
        assert_eq!(registry.resolve("  Dormant \n"), EndangermentStatus::Dormant);
    }

    #[test]
    fn test_resolve_unrecognized_falls_back_to_unknown() {
        let registry = StatusRegistry::get();
        assert_eq!(registry.resolve("Extinct"), EndangermentStatus::Unknown);
        assert_eq!(registry.resolve(""), EndangermentStatus::Unknown);
        // Case differences are not normalized
        assert_eq!(registry.resolve("at risk"), EndangermentStatus::Unknown);
        assert!(!registry.is_recognized("Extinct"));
        assert!(registry.is_recognized("Unknown"));
    }

    #[test]
    fn test_color_for_unrecognized_uses_unknown_color() {
        let registry = StatusRegistry::get();
        assert_eq!(registry.color_for("Extinct"), "#9E9E9E");
        assert_eq!(registry.color_for("Endangered"), "#FF7043");
        assert_eq!(EndangermentStatus::Unknown.color(), "#9E9E9E");
    }

    #[test]
    fn test_display_order_matches_declaration() {
        let order = StatusRegistry::get().display_order();
        assert_eq!(order, EndangermentStatus::ALL.to_vec());
        assert_eq!(order[0], EndangermentStatus::Vulnerable);
        assert_eq!(order[7], EndangermentStatus::Unknown);
        assert_eq!(order[8], EndangermentStatus::Awakening);
    }

    #[test]
    fn test_colors_are_distinct() {
        let legend = StatusRegistry::get().legend();
        let mut colors: Vec<_> = legend.iter().map(|entry| entry.color).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), EndangermentStatus::COUNT);
    }

    #[test]
    fn test_legend_in_display_order() {
        let legend = StatusRegistry::get().legend();
        assert_eq!(legend.len(), EndangermentStatus::COUNT);
        assert_eq!(legend[0].label, "Vulnerable");
        assert_eq!(legend[6].label, "At risk");
    }

    #[test]
    fn test_status_serializes_as_label() {
        let json = serde_json::to_string(&EndangermentStatus::SeverelyEndangered).unwrap();
        assert_eq!(json, "\"Severely Endangered\"");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(EndangermentStatus::AtRisk.to_string(), "At risk");
        assert_eq!(EndangermentStatus::default(), EndangermentStatus::Unknown);
    }
}
