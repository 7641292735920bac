use super::*;
use crate::store::fixtures::island;

#[test]
fn tab_ids_round_trip() {
    for mode in [FilterMode::Single, FilterMode::Multi] {
        assert_eq!(FilterMode::from_tab_id(mode.tab_id()), Some(mode));
    }
    assert_eq!(FilterMode::from_tab_id("map-tab"), None);
}

#[test]
fn initial_state_is_single_tab_with_nothing_selected() {
    let model = SelectionModel::default();
    assert_eq!(model.mode, FilterMode::Single);
    assert!(model.single.is_empty());
    assert!(!model.multi.has_selection());
    assert!(model.clustering);
}

#[test]
fn changing_county_clears_district() {
    let mut single = SingleFilter::default();
    single.set_county(Some("Taipei"));
    single.set_district(Some("Daan")).expect("county is set");

    single.set_county(Some("Taipei"));
    assert_eq!(single.district(), Some("Daan"), "same county keeps district");

    single.set_county(Some("Keelung"));
    assert_eq!(single.county(), Some("Keelung"));
    assert_eq!(single.district(), None);
}

#[test]
fn blank_county_clears_selection() {
    let mut single = SingleFilter::default();
    single.set_county(Some("Taipei"));
    single.set_county(Some("  "));
    assert_eq!(single.county(), None);
}

#[test]
fn district_without_county_is_rejected() {
    let mut single = SingleFilter::default();
    let err = single.set_district(Some("Daan")).unwrap_err();
    assert_eq!(
        err,
        CoreError::DistrictWithoutCounty {
            district: "Daan".to_string()
        }
    );
}

#[test]
fn store_types_are_folded_and_blank_entries_dropped() {
    let mut single = SingleFilter::default();
    single.set_store_types(["PXMart", "", " Carrefour "]);
    assert_eq!(
        single.store_types().iter().collect::<Vec<_>>(),
        ["carrefour", "pxmart"]
    );
}

#[test]
fn toggle_region_flips_county_and_district_independently() {
    let mut multi = MultiFilter::default();
    assert!(multi.toggle_region("Taipei", &RegionTarget::AllDistricts));
    assert!(multi.toggle_region("Taipei", &RegionTarget::District("Daan".into())));
    assert!(multi.is_county_checked("Taipei"));
    assert!(multi.is_district_checked("Taipei", "Daan"));

    assert!(!multi.toggle_region("Taipei", &RegionTarget::AllDistricts));
    assert!(!multi.is_county_checked("Taipei"));
    assert!(multi.is_district_checked("Taipei", "Daan"));

    assert!(!multi.toggle_region("Taipei", &RegionTarget::District("Daan".into())));
    assert!(!multi.has_selection(), "empty county entries are pruned");
}

#[test]
fn direction_flag_is_derived_from_county_checkboxes() {
    let catalog = island();
    let index = RegionIndex::build(&catalog, &BTreeSet::new());
    let mut multi = MultiFilter::default();

    multi.set_county_checked("Taipei", true);
    assert!(!multi.is_direction_fully_selected("North", &index));
    multi.set_county_checked("Keelung", true);
    assert!(multi.is_direction_fully_selected("North", &index));
    multi.set_county_checked("Keelung", false);
    assert!(!multi.is_direction_fully_selected("North", &index));
}

#[test]
fn toggle_direction_all_checks_then_unchecks() {
    let index = RegionIndex::build(&island(), &BTreeSet::new());
    let mut multi = MultiFilter::default();

    assert!(multi.toggle_direction_all("North", &index));
    assert!(multi.is_county_checked("Taipei"));
    assert!(multi.is_county_checked("Keelung"));
    assert!(!multi.is_county_checked("Taichung"));

    assert!(!multi.toggle_direction_all("North", &index));
    assert!(!multi.has_selection());
}

#[test]
fn toggle_direction_all_keeps_explicit_districts() {
    let index = RegionIndex::build(&island(), &BTreeSet::new());
    let mut multi = MultiFilter::default();
    multi.set_district_checked("Taipei", "Daan", true);
    multi.toggle_direction_all("North", &index);
    multi.toggle_direction_all("North", &index);
    assert!(multi.is_district_checked("Taipei", "Daan"));
    assert!(!multi.is_county_checked("Taipei"));
}

#[test]
fn unknown_direction_is_never_fully_selected() {
    let index = RegionIndex::build(&island(), &BTreeSet::new());
    let mut multi = MultiFilter::default();
    assert!(!multi.is_direction_fully_selected("East", &index));
    assert!(!multi.toggle_direction_all("East", &index));
}

#[test]
fn region_keys_parse_and_display() {
    let county: RegionKey = "Taipei|*".parse().expect("county key");
    assert_eq!(county, RegionKey::County("Taipei".into()));
    assert_eq!(county.to_string(), "Taipei|*");

    let district: RegionKey = "Taipei|Daan".parse().expect("district key");
    assert_eq!(district.to_string(), "Taipei|Daan");

    for bad in ["Taipei", "|Daan", "Taipei|", "a|b|c", ""] {
        assert!(bad.parse::<RegionKey>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn region_keys_reapply_to_identical_filter() {
    let mut multi = MultiFilter::default();
    multi.set_county_checked("Taipei", true);
    multi.set_district_checked("Taipei", "Daan", true);
    multi.set_district_checked("Taichung", "Xitun", true);

    let mut restored = MultiFilter::default();
    for key in multi.region_keys() {
        restored.apply_region_key(&key);
    }
    assert_eq!(restored, multi);
    assert_eq!(
        multi
            .region_keys()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        ["Taichung|Xitun", "Taipei|*", "Taipei|Daan"]
    );
}

#[test]
fn reserved_characters_in_names_are_escaped() {
    let star = RegionKey::District {
        county: "Taipei".into(),
        district: "*".into(),
    };
    assert_eq!(star.to_string(), "Taipei|%2A");
    assert_eq!(star.to_string().parse::<RegionKey>(), Ok(star));

    let piped = RegionKey::County("A|B".into());
    assert_eq!(piped.to_string(), "A%7CB|*");
    assert_eq!(piped.to_string().parse::<RegionKey>(), Ok(piped));

    let percent = RegionKey::District {
        county: "100%".into(),
        district: "%2A".into(),
    };
    assert_eq!(percent.to_string().parse::<RegionKey>(), Ok(percent));
}

#[test]
fn odd_region_names_survive_reapply() {
    let mut multi = MultiFilter::default();
    multi.set_district_checked("Taipei", "*", true);
    multi.set_county_checked("A|B", true);
    multi.set_district_checked("A|B", "x*y", true);

    let mut restored = MultiFilter::default();
    for key in multi.region_keys() {
        let raw = key.to_string();
        restored.apply_region_key(&raw.parse().expect("escaped key parses"));
    }
    assert_eq!(restored, multi);
    assert!(!restored.is_county_checked("Taipei"));
    assert!(restored.is_district_checked("Taipei", "*"));
}

#[test]
fn type_change_prunes_regions_without_matching_stores() {
    let catalog = island();
    let mut model = SelectionModel {
        mode: FilterMode::Multi,
        ..SelectionModel::default()
    };
    model.multi.set_county_checked("Keelung", true);
    model.multi.set_district_checked("Taipei", "Wanhua", true);
    model.multi.set_district_checked("Taipei", "Daan", true);

    let index = model.set_store_types(["pxmart"], &catalog);

    assert!(!index.contains_county("Keelung"));
    assert!(!model.multi.is_county_checked("Keelung"));
    assert!(!model.multi.is_district_checked("Taipei", "Wanhua"));
    assert!(model.multi.is_district_checked("Taipei", "Daan"));
}

#[test]
fn single_type_change_drops_missing_county() {
    let catalog = island();
    let mut model = SelectionModel::default();
    model.single.set_county(Some("Keelung"));
    model.set_store_types(["rt-mart"], &catalog);
    assert_eq!(model.single.county(), None);

    model.set_store_types(["pxmart"], &catalog);
    model.single.set_county(Some("Taipei"));
    model.single.set_district(Some("Xinyi")).expect("county set");
    model.set_store_types(["carrefour"], &catalog);
    assert_eq!(model.single.county(), Some("Taipei"));
    assert_eq!(model.single.district(), None);
}

#[test]
fn reset_clears_only_one_tab() {
    let mut model = SelectionModel::default();
    model.single.set_county(Some("Taipei"));
    model.multi.set_county_checked("Taipei", true);

    model.reset(FilterMode::Multi);
    assert!(!model.multi.has_selection());
    assert_eq!(model.single.county(), Some("Taipei"));
}

#[test]
fn switching_tabs_keeps_both_selections() {
    let mut model = SelectionModel::default();
    model.single.set_county(Some("Taipei"));
    model.mode = FilterMode::Multi;
    model.multi.set_county_checked("Keelung", true);
    model.mode = FilterMode::Single;
    assert_eq!(model.single.county(), Some("Taipei"));
    assert!(model.multi.is_county_checked("Keelung"));
}
