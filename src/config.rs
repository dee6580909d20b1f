use crate::globe::DEFAULT_GLOBE_RADIUS;
use crate::source::SourceLocation;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Sources
    pub dataset_source: SourceLocation,
    pub boundaries_source: Option<SourceLocation>,
    pub fetch_timeout: Duration,

    // Globe
    pub globe_radius: f64,

    // Stacked bars (empty = all regions)
    pub bar_chart_region: String,

    // Choropleth
    pub excluded_boundaries: Vec<String>,

    // Output
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let globe_radius = match std::env::var("GLOBE_RADIUS") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("GLOBE_RADIUS is not a number: {}", raw))?,
            Err(_) => DEFAULT_GLOBE_RADIUS,
        };
        if !globe_radius.is_finite() || globe_radius <= 0.0 {
            bail!("GLOBE_RADIUS must be a positive number, got {}", globe_radius);
        }

        Ok(Self {
            // Sources
            dataset_source: std::env::var("DATASET_SOURCE")
                .map(|raw| SourceLocation::parse(&raw))
                .context("DATASET_SOURCE not set")?,
            boundaries_source: std::env::var("BOUNDARIES_SOURCE")
                .ok()
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| SourceLocation::parse(&raw)),
            fetch_timeout: Duration::from_secs(
                std::env::var("FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),

            // Globe
            globe_radius,

            // Stacked bars
            bar_chart_region: std::env::var("BAR_CHART_REGION")
                .unwrap_or_else(|_| "Africa".to_string()),

            // Choropleth
            excluded_boundaries: std::env::var("EXCLUDED_BOUNDARIES")
                .map(|raw| parse_list(&raw))
                .unwrap_or_else(|_| vec!["Antarctica".to_string()]),

            // Output
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        })
    }
}

/// Split a comma separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
