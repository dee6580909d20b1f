//! Preview binary - prints the stacked-bar segments and top countries without writing files
//!
//! Usage:
//!   cargo run --bin preview                 # Region from BAR_CHART_REGION (defaults to Africa)
//!   cargo run --bin preview -- Asia         # Stack families for Asia
//!   cargo run --bin preview -- ""           # Stack families for all regions
//!
//! Required environment variables:
//! - DATASET_SOURCE
//!
//! Optional:
//! - FETCH_TIMEOUT_SECS (defaults to 30)

use anyhow::{Context, Result};
use language_atlas::{config, families::FamilyStack, pipeline, source, RecordFilter};
use tracing::info;

/// Number of countries listed in the preview
const TOP_COUNTRIES: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("preview=info".parse()?)
                .add_directive("language_atlas=warn".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;
    let region = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.bar_chart_region.clone());

    info!("Previewing families for region '{}'", region);

    let rows = source::load_rows(&config.dataset_source, config.fetch_timeout)
        .await
        .context("Failed to load language table")?;

    let options = pipeline::PipelineOptions {
        bar_chart_filter: RecordFilter::all().with_region(region.clone()),
        ..pipeline::PipelineOptions::from_config(&config)
    };
    let snapshot = pipeline::derive(&rows, &options, None);

    let title = if region.is_empty() { "all regions" } else { region.as_str() };
    println!("\n========================================");
    println!("  FAMILIES IN {}", title.to_uppercase());
    println!("========================================");
    if snapshot.families.stacks.is_empty() {
        println!("  (no languages)");
    }
    for stack in &snapshot.families.stacks {
        print_stack(stack);
    }

    let mut countries: Vec<_> = snapshot.countries.iter().collect();
    countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!("\n========================================");
    println!("  TOP {} COUNTRIES", TOP_COUNTRIES);
    println!("========================================");
    for (country, count) in countries.into_iter().take(TOP_COUNTRIES) {
        println!("  {:<32} {:>5}", country, count);
    }

    let diagnostics = &snapshot.diagnostics;
    println!("\n  Unique languages: {}", diagnostics.unique_languages);
    println!("  Duplicates dropped: {}", diagnostics.duplicates_dropped);
    println!("  Off the globe (bad coordinates): {}", diagnostics.invalid_coordinates);
    println!("========================================\n");

    Ok(())
}

fn print_stack(stack: &FamilyStack) {
    println!("\n  {} ({} languages)", stack.family, stack.total());
    for segment in stack.segments.iter().filter(|s| s.height() > 0) {
        println!(
            "    {:<24} [{:>3}, {:>3}]",
            segment.status.label(),
            segment.baseline,
            segment.top
        );
    }
}
