//! Canonical language records and the row normalizer.

use crate::status::{EndangermentStatus, StatusRegistry};
use serde::Serialize;
use std::collections::HashMap;

/// Exact header names of the source table.
pub mod columns {
    pub const ID: &str = "ID";
    pub const CODE: &str = "Code";
    pub const LANGUAGE_NAME: &str = "Language Name";
    pub const ALTERNATE_NAMES: &str = "Alternate Names";
    pub const ENDANGERMENT_STATUS: &str = "Endangerment Status";
    pub const ESTIMATED_SPEAKERS: &str = "Estimated Speakers";
    pub const LANGUAGE_FAMILY: &str = "Language Family";
    pub const REGION: &str = "Region";
    pub const COUNTRY: &str = "Country";
    pub const VARIANTS: &str = "Dialects/Variants";
    pub const ADDITIONAL_INFORMATION: &str = "Additional Information";
    pub const NOTES: &str = "Notes";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
}

/// Placeholder the source uses for "no value" in free-text columns.
const NONE_PLACEHOLDER: &str = "None";

/// Value of `info` when neither free-text column has content.
pub const INFO_PLACEHOLDER: &str = "-";

/// One tokenized source row, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(HashMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell value for a column, `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Canonical per-language datum.
///
/// Text columns hold the raw cell text (empty when absent). Coordinates hold
/// `f64::NAN` when the cell could not be parsed; use [`LanguageRecord::coordinates`]
/// rather than reading them directly.
///
/// Equality treats two `NaN` coordinates as equal, so a record that cannot be
/// plotted still equals its own clone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRecord {
    pub id: String,
    pub code: String,
    pub name: String,
    pub alternate_names: String,
    pub endangerment_status: String,
    pub estimated_speakers: Option<u64>,
    pub language_family: String,
    pub region: String,
    pub country: String,
    pub variants: String,
    pub info: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PartialEq for LanguageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.code == other.code
            && self.name == other.name
            && self.alternate_names == other.alternate_names
            && self.endangerment_status == other.endangerment_status
            && self.estimated_speakers == other.estimated_speakers
            && self.language_family == other.language_family
            && self.region == other.region
            && self.country == other.country
            && self.variants == other.variants
            && self.info == other.info
            && same_coordinate(self.latitude, other.latitude)
            && same_coordinate(self.longitude, other.longitude)
    }
}

// The unparseable-cell sentinel equals itself.
fn same_coordinate(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why a record cannot be placed on the globe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("{axis} is not a number")]
    NotANumber { axis: &'static str },

    #[error("{axis} {value} is outside [-{limit}, {limit}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        limit: f64,
    },
}

/// Data-quality marks carried by a record. None of them drop the record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordIssue {
    MissingName,
    InvalidCoordinates(CoordinateError),
    UnrecognizedStatus(String),
}

impl LanguageRecord {
    /// Status resolved through the registry (`Unknown` when unrecognized).
    pub fn status(&self) -> EndangermentStatus {
        StatusRegistry::get().resolve(&self.endangerment_status)
    }

    /// Trimmed country, `None` when blank.
    pub fn country_key(&self) -> Option<&str> {
        Some(self.country.trim()).filter(|country| !country.is_empty())
    }

    /// Validated coordinates for projection.
    pub fn coordinates(&self) -> Result<GeoCoordinate, CoordinateError> {
        let latitude = check_axis("latitude", self.latitude, 90.0)?;
        let longitude = check_axis("longitude", self.longitude, 180.0)?;
        Ok(GeoCoordinate {
            latitude,
            longitude,
        })
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates().is_ok()
    }

    /// Data-quality marks for this record.
    pub fn issues(&self) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(RecordIssue::MissingName);
        }
        if let Err(e) = self.coordinates() {
            issues.push(RecordIssue::InvalidCoordinates(e));
        }
        if !StatusRegistry::get().is_recognized(&self.endangerment_status) {
            issues.push(RecordIssue::UnrecognizedStatus(
                self.endangerment_status.clone(),
            ));
        }
        issues
    }
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<f64, CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NotANumber { axis });
    }
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { axis, value, limit });
    }
    Ok(value)
}

/// Normalize one source row. Never fails: bad cells become marked fields.
pub fn normalize(row: &RawRow) -> LanguageRecord {
    let text = |column: &str| row.get(column).unwrap_or_default().to_string();

    LanguageRecord {
        id: text(columns::ID),
        code: text(columns::CODE),
        name: text(columns::LANGUAGE_NAME),
        alternate_names: text(columns::ALTERNATE_NAMES),
        endangerment_status: text(columns::ENDANGERMENT_STATUS),
        estimated_speakers: parse_speakers(row.get(columns::ESTIMATED_SPEAKERS)),
        language_family: text(columns::LANGUAGE_FAMILY),
        region: text(columns::REGION),
        country: text(columns::COUNTRY),
        variants: text(columns::VARIANTS),
        info: build_info(
            row.get(columns::ADDITIONAL_INFORMATION),
            row.get(columns::NOTES),
        ),
        latitude: parse_coordinate(row.get(columns::LATITUDE)),
        longitude: parse_coordinate(row.get(columns::LONGITUDE)),
    }
}

/// Normalize a batch of rows, preserving order.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<LanguageRecord> {
    rows.iter().map(normalize).collect()
}

/// Parse a coordinate cell; unparseable or missing cells become `NaN`.
pub fn parse_coordinate(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parse a speaker count. Accepts "1,200", "1200" and "1200.0".
pub fn parse_speakers(raw: Option<&str>) -> Option<u64> {
    let cleaned: String = raw?
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(count) = cleaned.parse::<u64>() {
        return Some(count);
    }
    let value = cleaned.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// Additional information first, then notes, newline separated.
pub fn build_info(additional: Option<&str>, notes: Option<&str>) -> String {
    let mut info = String::new();
    if let Some(text) = meaningful(additional) {
        info.push_str(text);
        info.push('\n');
    }
    if let Some(text) = meaningful(notes) {
        info.push_str(text);
    }

    let trimmed = info.trim();
    if trimmed.is_empty() {
        INFO_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn meaningful(cell: Option<&str>) -> Option<&str> {
    cell.filter(|text| {
        let text = text.trim();
        !text.is_empty() && text != NONE_PLACEHOLDER
    })
}
