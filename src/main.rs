use anyhow::{Context, Result};
use language_atlas::{config, export, pipeline, source};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("language_atlas=info".parse()?),
        )
        .init();

    info!("Starting language atlas build");

    // Load configuration from environment
    let config = config::Config::from_env()?;

    // Step 1: Load the source table (and boundaries, when configured)
    let rows = source::load_rows(&config.dataset_source, config.fetch_timeout)
        .await
        .context("Failed to load language table")?;

    let boundaries = match &config.boundaries_source {
        Some(location) => Some(
            source::load_boundaries(location, config.fetch_timeout)
                .await
                .context("Failed to load boundary polygons")?,
        ),
        None => {
            info!("BOUNDARIES_SOURCE not set, skipping choropleth join");
            None
        }
    };

    // Step 2: Derive every dataset
    let options = pipeline::PipelineOptions::from_config(&config);
    let snapshot = pipeline::derive(&rows, &options, boundaries.as_deref());

    info!(
        "Globe: {} points | Countries: {} | Families: {}",
        snapshot.globe.points.len(),
        snapshot.countries.len(),
        snapshot.families.stacks.len()
    );

    // Step 3: Write datasets for the renderers
    export::write_snapshot(&config.output_dir, &snapshot).await?;

    info!("Atlas build complete!");
    Ok(())
}
