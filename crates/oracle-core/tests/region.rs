use oracle_core::region::{MapRegion, highlight_for, map_highlights};

#[test]
fn known_regions_resolve() {
    assert_eq!(highlight_for("West Africa"), Some(MapRegion::Africa));
    assert_eq!(highlight_for("Southeast Asia"), Some(MapRegion::Asia));
    assert_eq!(highlight_for("North America"), Some(MapRegion::NorthAmerica));
    assert_eq!(MapRegion::SouthAmerica.id(), "south-america");
}

#[test]
fn unknown_region_highlights_nothing() {
    for region in ["Antarctica", "", "west africa", "Central Europe"] {
        assert_eq!(highlight_for(region), None);
        assert!(map_highlights(region).iter().all(|(_, lit)| !lit));
    }
}

#[test]
fn exactly_one_entity_highlighted_for_known_region() {
    let lit: Vec<MapRegion> = map_highlights("Europe")
        .into_iter()
        .filter(|(_, lit)| *lit)
        .map(|(r, _)| r)
        .collect();
    assert_eq!(lit, vec![MapRegion::Europe]);
    assert_eq!(map_highlights("Europe").len(), MapRegion::ALL.len());
}
