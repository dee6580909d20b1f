//! Globe point layer: geodetic projection of languages onto a sphere.

use crate::dedup::UniqueLanguages;
use crate::record::LanguageRecord;
use crate::status::{EndangermentStatus, StatusRegistry};
use serde::Serialize;
use tracing::debug;

/// Radius of the globe mesh the point layer is placed on.
pub const DEFAULT_GLOBE_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartesianPoint {
    /// Euclidean distance from the origin.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Project latitude/longitude (degrees) onto a sphere of the given radius.
///
/// Y points at the north pole. Longitude is negated so that east maps onto
/// -Z, matching the globe texture's orientation.
pub fn project(latitude: f64, longitude: f64, radius: f64) -> CartesianPoint {
    let lat = latitude.to_radians();
    let lon = -longitude.to_radians();

    CartesianPoint {
        x: radius * lat.cos() * lon.cos(),
        y: radius * lat.sin(),
        z: radius * lat.cos() * lon.sin(),
    }
}

/// A plottable language with its position and marker color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobePoint {
    pub record: LanguageRecord,
    pub position: CartesianPoint,
    pub status: EndangermentStatus,
    pub color: &'static str,
}

/// A language left off the globe, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobeLayer {
    pub radius: f64,
    pub points: Vec<GlobePoint>,
    pub skipped: Vec<SkippedRecord>,
}

/// Build the point layer. Records without valid coordinates go to `skipped`
/// and are never projected.
pub fn build_globe_layer(languages: &UniqueLanguages, radius: f64) -> GlobeLayer {
    let registry = StatusRegistry::get();
    let mut points = Vec::with_capacity(languages.len());
    let mut skipped = Vec::new();

    for record in languages {
        match record.coordinates() {
            Ok(coordinates) => {
                let status = record.status();
                points.push(GlobePoint {
                    record: record.clone(),
                    position: project(coordinates.latitude, coordinates.longitude, radius),
                    status,
                    color: registry.config(status).color,
                });
            }
            Err(e) => skipped.push(SkippedRecord {
                name: record.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    debug!(
        "Globe layer: {} points, {} skipped",
        points.len(),
        skipped.len()
    );

    GlobeLayer {
        radius,
        points,
        skipped,
    }
}
