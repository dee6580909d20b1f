//! Writing a snapshot to disk as one JSON file per consumer.

use crate::pipeline::AtlasSnapshot;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// File envelope carrying the generation time.
#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    data: &'a T,
}

/// Write every dataset in `snapshot` under `dir`, returning the paths written.
///
/// `choropleth.json` is written only when the snapshot has a boundary join.
pub async fn write_snapshot(dir: &Path, snapshot: &AtlasSnapshot) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let generated_at = Utc::now();
    let mut written = Vec::new();

    written.push(write_json(dir, "globe.json", generated_at, &snapshot.globe).await?);
    written.push(write_json(dir, "countries.json", generated_at, &snapshot.countries).await?);
    if let Some(choropleth) = &snapshot.choropleth {
        written.push(write_json(dir, "choropleth.json", generated_at, choropleth).await?);
    }
    written.push(write_json(dir, "families.json", generated_at, &snapshot.families).await?);
    written.push(write_json(dir, "filters.json", generated_at, &snapshot.filter_options).await?);
    written.push(write_json(dir, "legend.json", generated_at, &snapshot.legend).await?);
    written.push(write_json(dir, "diagnostics.json", generated_at, &snapshot.diagnostics).await?);

    info!("✓ Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

async fn write_json<T: Serialize>(
    dir: &Path,
    file_name: &str,
    generated_at: DateTime<Utc>,
    data: &T,
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let body = serde_json::to_vec_pretty(&Envelope { generated_at, data })
        .with_context(|| format!("Failed to serialize {}", file_name))?;

    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choropleth::BoundaryFeature;
    use crate::pipeline::{derive, PipelineOptions};
    use crate::record::RawRow;

    fn rows() -> Vec<RawRow> {
        vec![[
            ("Language Name", "Ainu"),
            ("Endangerment Status", "Critically Endangered"),
            ("Country", "Japan"),
            ("Latitude", "43.0"),
            ("Longitude", "141.3"),
        ]
        .into_iter()
        .collect()]
    }

    #[tokio::test]
    async fn test_write_snapshot_without_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = derive(&rows(), &PipelineOptions::default(), None);

        let written = write_snapshot(dir.path(), &snapshot).await.unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "globe.json",
                "countries.json",
                "families.json",
                "filters.json",
                "legend.json",
                "diagnostics.json"
            ]
        );
    }

    #[tokio::test]
    async fn test_written_files_carry_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let boundaries = vec![BoundaryFeature::named("Japan")];
        let snapshot = derive(&rows(), &PipelineOptions::default(), Some(boundaries.as_slice()));

        write_snapshot(dir.path(), &snapshot).await.unwrap();

        let body = std::fs::read_to_string(dir.path().join("countries.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["generated_at"].is_string());
        assert_eq!(json["data"]["Japan"], 1);

        let body = std::fs::read_to_string(dir.path().join("choropleth.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["regions"][0]["name"], "Japan");
        assert_eq!(json["data"]["regions"][0]["count"], 1);
    }

    #[tokio::test]
    async fn test_write_snapshot_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let snapshot = derive(&[], &PipelineOptions::default(), None);

        write_snapshot(&nested, &snapshot).await.unwrap();

        assert!(nested.join("legend.json").exists());
    }
}
