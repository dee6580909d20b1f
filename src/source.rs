//! Loading the source table and boundary polygons.
//!
//! This is the only asynchronous part of the crate. A load either returns every
//! row or a [`SourceError`]; partial results are never handed to the pipeline.

use crate::choropleth::{BoundaryCollection, BoundaryFeature};
use crate::record::{columns, RawRow};
use crate::retry::{with_retry_if, RetryConfig};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("source table has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("malformed GeoJSON: {0}")]
    GeoJson(#[from] serde_json::Error),
}

impl SourceError {
    /// Transient failures: network errors, server errors and rate limiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport { .. } => true,
            SourceError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Where a dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Path(PathBuf),
    Url(String),
}

impl SourceLocation {
    /// `http://` and `https://` values are URLs, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceLocation::Url(raw.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Path(path) => write!(f, "{}", path.display()),
            SourceLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Read the raw bytes of a dataset. Remote fetches retry transient failures.
pub async fn fetch_bytes(
    location: &SourceLocation,
    timeout: Duration,
) -> Result<Vec<u8>, SourceError> {
    match location {
        SourceLocation::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })
        }
        SourceLocation::Url(url) => {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|source| SourceError::Transport {
                    url: url.clone(),
                    source,
                })?;

            with_retry_if(
                &RetryConfig::remote_source(),
                &format!("GET {}", url),
                || fetch_url(&client, url),
                SourceError::is_retryable,
            )
            .await
        }
    }
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SourceError> {
    let transport = |source| SourceError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    Ok(body.to_vec())
}

/// Tokenize a CSV table into rows keyed by header name.
///
/// Short rows are accepted; their missing cells are simply absent from the row.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == columns::LANGUAGE_NAME) {
        return Err(SourceError::MissingColumn(columns::LANGUAGE_NAME));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(headers.iter().zip(record.iter()).collect::<RawRow>());
    }
    Ok(rows)
}

/// Parse a GeoJSON feature collection.
pub fn parse_boundaries(bytes: &[u8]) -> Result<Vec<BoundaryFeature>, SourceError> {
    let collection: BoundaryCollection = serde_json::from_slice(bytes)?;
    Ok(collection.features)
}

/// Load and tokenize the source table.
pub async fn load_rows(
    location: &SourceLocation,
    timeout: Duration,
) -> Result<Vec<RawRow>, SourceError> {
    info!("Loading language table from {}", location);
    let bytes = fetch_bytes(location, timeout).await?;
    let rows = parse_rows(&bytes)?;
    info!("Loaded {} rows", rows.len());
    Ok(rows)
}

/// Load the boundary polygons.
pub async fn load_boundaries(
    location: &SourceLocation,
    timeout: Duration,
) -> Result<Vec<BoundaryFeature>, SourceError> {
    info!("Loading boundary polygons from {}", location);
    let bytes = fetch_bytes(location, timeout).await?;
    let features = parse_boundaries(&bytes)?;
    info!("Loaded {} boundary features", features.len());
    Ok(features)
}
