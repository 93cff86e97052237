//! Region boundaries for the choropleth map.

use geojson::{FeatureCollection, GeoJson};
use std::path::Path;
use tracing::{info, warn};

use crate::error::AppError;

/// A named region with its outer boundary rings as (longitude, latitude).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

pub fn load_regions(path: &Path, name_property: &str) -> Result<Vec<Region>, AppError> {
    info!("Loading region boundaries from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_regions(&text, name_property)
}

/// Parses a feature collection. Features without the name property or
/// without a (multi)polygon geometry are skipped.
pub fn parse_regions(text: &str, name_property: &str) -> Result<Vec<Region>, AppError> {
    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;

    let mut regions = Vec::new();
    for feature in collection.features {
        let Some(name) = feature
            .property(name_property)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .map(String::from)
        else {
            warn!("Skipping feature without '{name_property}' property");
            continue;
        };
        let rings = match feature.geometry.map(|g| g.value) {
            Some(geojson::Value::Polygon(polygon)) => outer_ring(&polygon).into_iter().collect(),
            Some(geojson::Value::MultiPolygon(polygons)) => {
                polygons.iter().filter_map(|p| outer_ring(p)).collect()
            }
            _ => {
                warn!("Skipping region '{name}' without polygon geometry");
                continue;
            }
        };
        regions.push(Region { name, rings });
    }

    if regions.is_empty() {
        return Err(AppError::geo("no regions with polygon geometry"));
    }
    Ok(regions)
}

fn outer_ring(polygon: &[Vec<Vec<f64>>]) -> Option<Vec<(f64, f64)>> {
    polygon.first().map(|ring| {
        ring.iter()
            .filter(|p| p.len() >= 2)
            .map(|p| (p[0], p[1]))
            .collect()
    })
}

impl Region {
    /// Bounding box as (min_lon, min_lat, max_lon, max_lat).
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.rings.iter().flatten();
        let first = points.next()?;
        Some(points.fold(
            (first.0, first.1, first.0, first.1),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        ))
    }
}
