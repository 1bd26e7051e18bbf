//! Geo module - state boundaries and the choropleth join

mod boundaries;
mod choropleth;

pub use boundaries::{BoundaryError, Bounds, StateBoundaries, StateBoundary};
pub use choropleth::{normalize_region_name, ChoroplethLayer, NameMatcher, ShadedRegion};
