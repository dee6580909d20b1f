//! Derives the datasets behind an endangered-languages atlas.
//!
//! A flat table of language rows is normalized ([`record`]), deduplicated by
//! name ([`dedup`]), and turned into three independent datasets: a globe point
//! layer ([`globe`]), per-country counts joined onto boundary polygons
//! ([`choropleth`]), and family/status stacked bars ([`families`]). Colors and
//! stacking order come from one shared [`status`] registry.
//!
//! Everything except [`source`] and [`export`] is synchronous and pure;
//! [`pipeline::derive`] recomputes all datasets from a row snapshot.

pub mod choropleth;
pub mod config;
pub mod dedup;
pub mod export;
pub mod families;
pub mod filter;
pub mod globe;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod source;
pub mod status;

pub use choropleth::{BoundaryFeature, ChoroplethLayer, CountryAggregate};
pub use dedup::UniqueLanguages;
pub use families::{FamilyStack, FamilyStatusGroup, StackedBarChart, StackedSegment};
pub use filter::{FilterOptions, RecordFilter};
pub use globe::{project, CartesianPoint, GlobeLayer, GlobePoint};
pub use pipeline::{derive, AtlasSnapshot, PipelineOptions};
pub use record::{normalize, LanguageRecord, RawRow};
pub use source::{SourceError, SourceLocation};
pub use status::{EndangermentStatus, StatusRegistry};
