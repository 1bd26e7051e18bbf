//! Joins per-state totals onto boundary polygons for the map view.

use crate::data::StateTotal;
use crate::geo::{Bounds, StateBoundaries};
use std::collections::{BTreeMap, HashMap};

/// Canonical join key for a region name: upper-case, `&` spelled `AND`,
/// punctuation dropped, whitespace collapsed.
pub fn normalize_region_name(name: &str) -> String {
    name.to_uppercase()
        .replace('&', " AND ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps data state names onto boundary feature names.
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    aliases: HashMap<String, String>,
}

impl NameMatcher {
    pub fn new(aliases: &BTreeMap<String, String>) -> Self {
        Self {
            aliases: aliases
                .iter()
                .map(|(from, to)| (normalize_region_name(from), normalize_region_name(to)))
                .collect(),
        }
    }

    /// Join key for a state name as it appears in the crime data.
    pub fn key(&self, data_name: &str) -> String {
        let key = normalize_region_name(data_name);
        self.aliases.get(&key).cloned().unwrap_or(key)
    }
}

/// One boundary with its joined count.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadedRegion {
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
    /// `None` when no data row matched this boundary.
    pub count: Option<i64>,
    /// `count / max_count`, in `0.0..=1.0`.
    pub intensity: Option<f64>,
}

/// Boundaries shaded by state totals, ready for drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoroplethLayer {
    pub regions: Vec<ShadedRegion>,
    /// Data states with no matching boundary.
    pub unmatched: Vec<String>,
    pub max_count: i64,
}

impl ChoroplethLayer {
    /// Join `totals` onto `boundaries`. States mapping to the same boundary
    /// (e.g. two union territories merged later) are summed.
    pub fn join(
        boundaries: &StateBoundaries,
        totals: &[StateTotal],
        matcher: &NameMatcher,
    ) -> Self {
        let boundary_keys: HashMap<String, &str> = boundaries
            .iter()
            .map(|b| (normalize_region_name(&b.name), b.name.as_str()))
            .collect();

        let mut counts: HashMap<&str, i64> = HashMap::new();
        let mut unmatched = Vec::new();
        for total in totals {
            match boundary_keys.get(&matcher.key(&total.state)) {
                Some(name) => *counts.entry(*name).or_insert(0) += total.count,
                None => unmatched.push(total.state.clone()),
            }
        }

        if !unmatched.is_empty() {
            log::warn!("No boundary for states: {}", unmatched.join(", "));
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        let regions = boundaries
            .iter()
            .map(|b| {
                let count = counts.get(b.name.as_str()).copied();
                ShadedRegion {
                    name: b.name.clone(),
                    rings: b.rings.clone(),
                    count,
                    intensity: count.map(|c| intensity(c, max_count)),
                }
            })
            .collect();

        Self {
            regions,
            unmatched,
            max_count,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of_rings(self.regions.iter().flat_map(|r| &r.rings))
    }

    pub fn matched_count(&self) -> usize {
        self.regions.iter().filter(|r| r.count.is_some()).count()
    }
}

fn intensity(count: i64, max_count: i64) -> f64 {
    if max_count <= 0 {
        0.0
    } else {
        (count as f64 / max_count as f64).clamp(0.0, 1.0)
    }
}
