//! Lookup from free-text region names to the fixed set of display regions.
//!
//! The analysis model names the region in free text. Only exact matches
//! against [`REGION_LOOKUP`] highlight anything; everything else leaves the
//! map unhighlighted.

use serde::{Deserialize, Serialize};

/// A highlightable region on the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapRegion {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
}

impl MapRegion {
    pub const ALL: [MapRegion; 6] = [
        MapRegion::NorthAmerica,
        MapRegion::SouthAmerica,
        MapRegion::Europe,
        MapRegion::Africa,
        MapRegion::Asia,
        MapRegion::Oceania,
    ];

    /// Stable identifier of the map entity.
    pub fn id(self) -> &'static str {
        match self {
            MapRegion::NorthAmerica => "north-america",
            MapRegion::SouthAmerica => "south-america",
            MapRegion::Europe => "europe",
            MapRegion::Africa => "africa",
            MapRegion::Asia => "asia",
            MapRegion::Oceania => "oceania",
        }
    }
}

/// Region names the model may return, and the map entity each lights up.
pub const REGION_LOOKUP: [(&str, MapRegion); 8] = [
    ("North America", MapRegion::NorthAmerica),
    ("South America", MapRegion::SouthAmerica),
    ("Europe", MapRegion::Europe),
    ("Africa", MapRegion::Africa),
    ("West Africa", MapRegion::Africa),
    ("Asia", MapRegion::Asia),
    ("Southeast Asia", MapRegion::Asia),
    ("Oceania", MapRegion::Oceania),
];

/// Resolve a region name to its map entity. Unknown names yield `None`.
pub fn highlight_for(region: &str) -> Option<MapRegion> {
    REGION_LOOKUP
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, map_region)| *map_region)
}

/// Every map entity paired with whether it is highlighted for `region`.
pub fn map_highlights(region: &str) -> Vec<(MapRegion, bool)> {
    let target = highlight_for(region);
    MapRegion::ALL
        .iter()
        .map(|r| (*r, Some(*r) == target))
        .collect()
}
