//! Full recomputation of every derived dataset from one input snapshot.
//!
//! [`derive`] is pure: it holds no state between calls, and the same rows and
//! options always produce the same [`AtlasSnapshot`]. Callers rerun it whenever
//! the rows or a filter change.

use crate::choropleth::{join_boundaries, BoundaryFeature, ChoroplethLayer, CountryAggregate};
use crate::config::Config;
use crate::dedup::UniqueLanguages;
use crate::families::StackedBarChart;
use crate::filter::{FilterOptions, RecordFilter};
use crate::globe::{build_globe_layer, GlobeLayer, DEFAULT_GLOBE_RADIUS};
use crate::record::{normalize_rows, LanguageRecord, RawRow, RecordIssue};
use crate::status::{LegendEntry, StatusRegistry};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub globe_radius: f64,

    /// Applied to the globe layer only
    pub globe_filter: RecordFilter,

    /// Applied to the stacked-bar dataset only
    pub bar_chart_filter: RecordFilter,

    /// Polygons left off the choropleth
    pub excluded_boundaries: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            globe_radius: DEFAULT_GLOBE_RADIUS,
            globe_filter: RecordFilter::all(),
            bar_chart_filter: RecordFilter::all(),
            excluded_boundaries: vec!["Antarctica".to_string()],
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            globe_radius: config.globe_radius,
            globe_filter: RecordFilter::all(),
            bar_chart_filter: RecordFilter::all().with_region(config.bar_chart_region.clone()),
            excluded_boundaries: config.excluded_boundaries.clone(),
        }
    }
}

/// Data-quality counts for one run.
///
/// `missing_names` counts source rows, since dedup collapses every blank name
/// into one record. The other per-record counts cover unique languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub rows: usize,
    pub unique_languages: usize,
    pub duplicates_dropped: usize,
    pub missing_names: usize,
    pub invalid_coordinates: usize,
    pub unrecognized_statuses: usize,
    pub unmatched_countries: Vec<String>,
}

/// Every derived dataset from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasSnapshot {
    pub globe: GlobeLayer,
    pub countries: CountryAggregate,
    pub choropleth: Option<ChoroplethLayer>,
    pub families: StackedBarChart,
    pub filter_options: FilterOptions,
    pub legend: Vec<LegendEntry>,
    pub diagnostics: Diagnostics,
}

/// Normalize and deduplicate rows.
pub fn unique_languages(rows: &[RawRow]) -> UniqueLanguages {
    UniqueLanguages::from_records(normalize_rows(rows))
}

/// Run normalize, dedup, and all three consumers.
///
/// The choropleth join runs only when `boundaries` is supplied; the country
/// aggregate is always computed over the unfiltered set.
pub fn derive(
    rows: &[RawRow],
    options: &PipelineOptions,
    boundaries: Option<&[BoundaryFeature]>,
) -> AtlasSnapshot {
    let records = normalize_rows(rows);
    let missing_names = records.iter().filter(|record| is_unnamed(record)).count();
    let languages = UniqueLanguages::from_records(records);

    let globe = build_globe_layer(&options.globe_filter.apply(&languages), options.globe_radius);
    let countries = CountryAggregate::from_languages(&languages);
    let choropleth = boundaries
        .map(|features| join_boundaries(&countries, features, &options.excluded_boundaries));
    let families = StackedBarChart::from_languages(&options.bar_chart_filter.apply(&languages));

    let diagnostics = diagnose(rows.len(), missing_names, &languages, choropleth.as_ref());
    report(&diagnostics);

    AtlasSnapshot {
        globe,
        countries,
        choropleth,
        families,
        filter_options: FilterOptions::from_languages(&languages),
        legend: StatusRegistry::get().legend(),
        diagnostics,
    }
}

fn is_unnamed(record: &LanguageRecord) -> bool {
    record.name.trim().is_empty()
}

fn diagnose(
    rows: usize,
    missing_names: usize,
    languages: &UniqueLanguages,
    choropleth: Option<&ChoroplethLayer>,
) -> Diagnostics {
    let mut diagnostics = Diagnostics {
        rows,
        unique_languages: languages.len(),
        duplicates_dropped: rows - languages.len(),
        missing_names,
        unmatched_countries: choropleth
            .map(|layer| layer.unmatched_countries.clone())
            .unwrap_or_default(),
        ..Diagnostics::default()
    };

    for issue in languages.iter().flat_map(|record| record.issues()) {
        match issue {
            RecordIssue::MissingName => {}
            RecordIssue::InvalidCoordinates(_) => diagnostics.invalid_coordinates += 1,
            RecordIssue::UnrecognizedStatus(_) => diagnostics.unrecognized_statuses += 1,
        }
    }
    diagnostics
}

fn report(diagnostics: &Diagnostics) {
    info!(
        "Derived datasets from {} rows ({} unique languages, {} duplicates dropped)",
        diagnostics.rows, diagnostics.unique_languages, diagnostics.duplicates_dropped
    );
    if diagnostics.missing_names > 0 {
        warn!("{} languages have no name", diagnostics.missing_names);
    }
    if diagnostics.invalid_coordinates > 0 {
        warn!(
            "{} languages have invalid coordinates and are left off the globe",
            diagnostics.invalid_coordinates
        );
    }
    if diagnostics.unrecognized_statuses > 0 {
        warn!(
            "{} languages have an unrecognized status and are shown as Unknown",
            diagnostics.unrecognized_statuses
        );
    }
    if !diagnostics.unmatched_countries.is_empty() {
        warn!(
            "{} countries match no boundary polygon: {}",
            diagnostics.unmatched_countries.len(),
            diagnostics.unmatched_countries.join(", ")
        );
    }
}
