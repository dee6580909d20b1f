//! Per-country language counts and their join against boundary polygons.

use crate::dedup::UniqueLanguages;
use crate::record::LanguageRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Number of distinct languages per trimmed country name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountryAggregate {
    counts: BTreeMap<String, usize>,
}

impl CountryAggregate {
    /// Count languages by trimmed country. Blank countries are skipped; no
    /// other normalization is applied, so "Congo" and "congo" are distinct.
    pub fn from_languages(languages: &UniqueLanguages) -> Self {
        let mut counts = BTreeMap::new();
        for country in languages.iter().filter_map(LanguageRecord::country_key) {
            *counts.entry(country.to_string()).or_insert(0) += 1;
        }

        debug!("Aggregated languages across {} countries", counts.len());
        Self { counts }
    }

    /// Count for a country name (0 when absent).
    pub fn count(&self, country: &str) -> usize {
        self.counts.get(country).copied().unwrap_or(0)
    }

    /// Largest count, or 1 when empty. Upper bound of the color scale.
    pub fn scale_max(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(1).max(1)
    }

    /// Total languages with a country.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(country, count)| (country.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Languages spoken in a country, matched on the trimmed country name.
pub fn languages_in_country<'a>(
    languages: &'a UniqueLanguages,
    country: &str,
) -> Vec<&'a LanguageRecord> {
    let country = country.trim();
    languages
        .iter()
        .filter(|record| record.country_key() == Some(country))
        .collect()
}

/// GeoJSON feature collection; only the `name` property is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundaryCollection {
    #[serde(default)]
    pub features: Vec<BoundaryFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoundaryFeature {
    #[serde(default)]
    pub properties: BoundaryProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoundaryProperties {
    #[serde(default)]
    pub name: String,
}

impl BoundaryFeature {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            properties: BoundaryProperties { name: name.into() },
        }
    }

    /// Trimmed feature name used as the join key.
    pub fn name(&self) -> &str {
        self.properties.name.trim()
    }
}

/// One polygon with its joined count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoroplethRegion {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoroplethLayer {
    pub regions: Vec<ChoroplethRegion>,

    /// Upper bound of the sequential color scale
    pub max_count: usize,

    /// Aggregate keys no polygon carries, sorted
    pub unmatched_countries: Vec<String>,
}

/// Join counts onto polygons by exact trimmed, case-sensitive name.
///
/// Polygons named in `excluded` are dropped first. Polygons without a count get
/// zero; countries without a polygon are reported in `unmatched_countries`.
pub fn join_boundaries(
    aggregate: &CountryAggregate,
    features: &[BoundaryFeature],
    excluded: &[String],
) -> ChoroplethLayer {
    let excluded: HashSet<&str> = excluded.iter().map(|name| name.trim()).collect();

    let regions: Vec<ChoroplethRegion> = features
        .iter()
        .filter(|feature| !excluded.contains(feature.name()))
        .map(|feature| ChoroplethRegion {
            name: feature.name().to_string(),
            count: aggregate.count(feature.name()),
        })
        .collect();

    let polygon_names: HashSet<&str> = regions.iter().map(|region| region.name.as_str()).collect();
    let unmatched_countries: Vec<String> = aggregate
        .iter()
        .filter(|(country, _)| !polygon_names.contains(country))
        .map(|(country, _)| country.to_string())
        .collect();

    debug!(
        "Joined {} polygons, {} countries unmatched",
        regions.len(),
        unmatched_countries.len()
    );

    ChoroplethLayer {
        regions,
        max_count: aggregate.scale_max(),
        unmatched_countries,
    }
}
