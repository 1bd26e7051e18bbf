//! State boundary polygons read from a `GeoJSON` `FeatureCollection`.

use geojson::{Feature, GeoJson, Geometry, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Failed to read boundary file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("Boundary file is not a FeatureCollection")]
    NotFeatureCollection,
}

/// Axis-aligned extent in longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn point(p: [f64; 2]) -> Self {
        Self {
            min_x: p[0],
            min_y: p[1],
            max_x: p[0],
            max_y: p[1],
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Extent of a set of rings, `None` when there are no points.
    pub fn of_rings<'a>(rings: impl IntoIterator<Item = &'a Vec<[f64; 2]>>) -> Option<Bounds> {
        rings
            .into_iter()
            .flatten()
            .map(|p| Bounds::point(*p))
            .reduce(Bounds::union)
    }
}

/// Outer rings of one state's polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBoundary {
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl StateBoundary {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_rings(&self.rings)
    }
}

/// All state boundaries from one file.
#[derive(Debug, Clone, Default)]
pub struct StateBoundaries {
    states: Vec<StateBoundary>,
}

impl StateBoundaries {
    pub fn load(path: &Path, name_property: &str) -> Result<Self, BoundaryError> {
        let text = std::fs::read_to_string(path).map_err(|source| BoundaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let boundaries = Self::parse(&text, name_property)?;
        log::info!(
            "Loaded {} state boundaries from {}",
            boundaries.len(),
            path.display()
        );
        Ok(boundaries)
    }

    /// Parse a `FeatureCollection`, skipping features without a name or
    /// polygon geometry.
    pub fn parse(text: &str, name_property: &str) -> Result<Self, BoundaryError> {
        let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
            return Err(BoundaryError::NotFeatureCollection);
        };

        let states = collection
            .features
            .iter()
            .filter_map(|feature| boundary_from_feature(feature, name_property))
            .collect();

        Ok(Self { states })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateBoundary> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

fn boundary_from_feature(feature: &Feature, name_property: &str) -> Option<StateBoundary> {
    let name = feature
        .property(name_property)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let mut rings = Vec::new();
    if let Some(geometry) = &feature.geometry {
        collect_outer_rings(geometry, &mut rings);
    }

    if rings.is_empty() {
        log::debug!("Skipping boundary '{}' without polygon geometry", name);
        return None;
    }

    Some(StateBoundary { name, rings })
}

fn collect_outer_rings(geometry: &Geometry, rings: &mut Vec<Vec<[f64; 2]>>) {
    match &geometry.value {
        Value::Polygon(polygon) => rings.extend(polygon.first().map(|ring| to_points(ring))),
        Value::MultiPolygon(polygons) => rings.extend(
            polygons
                .iter()
                .filter_map(|polygon| polygon.first())
                .map(|ring| to_points(ring)),
        ),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_outer_rings(geometry, rings);
            }
        }
        _ => {}
    }
}

fn to_points(ring: &[Vec<f64>]) -> Vec<[f64; 2]> {
    ring.iter()
        .filter_map(|position| match position.as_slice() {
            [x, y, ..] => Some([*x, *y]),
            _ => None,
        })
        .collect()
}
