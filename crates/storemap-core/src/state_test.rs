use super::*;

fn sample_model() -> SelectionModel {
    let mut model = SelectionModel {
        mode: FilterMode::Multi,
        clustering: false,
        viewport: Viewport::new(25.033_964, 121.564_468, 13),
        ..SelectionModel::default()
    };
    model.single.set_store_types(["pxmart"]);
    model.single.set_county(Some("Taipei"));
    model.single.set_district(Some("Daan")).expect("county set");
    model.multi.set_store_types(["carrefour", "hipp"]);
    model.multi.set_county_checked("Taipei", true);
    model.multi.set_district_checked("Taipei", "Daan", true);
    model.multi.set_district_checked("Tainan", "East", true);
    model
}

#[test]
fn round_trip_reproduces_model() {
    let model = sample_model();
    let raw = encode(&model).expect("encode");
    assert_eq!(decode(&raw).expect("decode"), model);
}

#[test]
fn region_names_with_key_syntax_round_trip() {
    let mut model = SelectionModel {
        mode: FilterMode::Multi,
        ..SelectionModel::default()
    };
    model.multi.set_district_checked("Taipei", "*", true);
    model.multi.set_county_checked("A|B", true);

    let raw = encode(&model).expect("encode");
    assert_eq!(decode(&raw).expect("decode"), model);
}

#[test]
fn default_model_round_trips() {
    let model = SelectionModel::default();
    let raw = encode(&model).expect("encode");
    assert_eq!(decode(&raw).expect("decode"), model);
}

#[test]
fn viewport_reproduced_to_six_digits() {
    let model = SelectionModel {
        viewport: Viewport::new(23.123_456, 121.123_456, 12),
        ..SelectionModel::default()
    };
    let raw = encode(&model).expect("encode");
    let restored = decode(&raw).expect("decode");
    assert_eq!(format!("{:.6}", restored.viewport.lat()), "23.123456");
    assert_eq!(format!("{:.6}", restored.viewport.lng()), "121.123456");
    assert_eq!(restored.viewport.zoom(), 12);
}

#[test]
fn blob_uses_compact_keys() {
    let raw = encode(&sample_model()).expect("encode");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["ver"], 1);
    assert_eq!(json["t"], "multi-filter-tab");
    assert_eq!(json["c"], false);
    assert_eq!(json["s"], serde_json::json!(["pxmart"]));
    assert_eq!(json["sc"], "Taipei");
    assert_eq!(json["sd"], "Daan");
    assert_eq!(json["m"], serde_json::json!(["carrefour", "hipp"]));
    assert_eq!(
        json["f"],
        serde_json::json!(["Tainan|East", "Taipei|*", "Taipei|Daan"])
    );
    assert_eq!(json["v"]["z"], 13);
}

#[test]
fn string_coordinates_are_accepted() {
    let raw = r#"{"ver":1,"t":"filter-tab","c":true,"v":{"lat":"23.123456","lng":"121.123456","z":12}}"#;
    let model = decode(raw).expect("decode");
    assert_eq!(model.viewport, Viewport::new(23.123_456, 121.123_456, 12));
    assert!(model.single.is_empty());
}

#[test]
fn garbage_is_rejected() {
    assert!(matches!(decode("not json"), Err(StateError::Json(_))));
    assert!(matches!(decode("[]"), Err(StateError::Json(_))));
    assert!(matches!(decode("{}"), Err(StateError::Json(_))));
}

#[test]
fn blob_without_version_is_rejected() {
    let raw = r#"{"t":"filter-tab","c":true,"s":[],"m":[],"f":[],"v":{"lat":"23.5","lng":"121","z":8}}"#;
    assert!(matches!(decode(raw), Err(StateError::Json(_))));
}

#[test]
fn other_version_is_rejected() {
    let raw = r#"{"ver":2,"t":"filter-tab","c":true,"v":{"lat":23.5,"lng":121,"z":8}}"#;
    assert!(matches!(
        decode(raw),
        Err(StateError::VersionMismatch {
            found: 2,
            expected: 1
        })
    ));
}

#[test]
fn unknown_tab_is_rejected() {
    let raw = r#"{"ver":1,"t":"map-tab","c":true,"v":{"lat":23.5,"lng":121,"z":8}}"#;
    assert!(matches!(decode(raw), Err(StateError::UnknownTab(ref t)) if t == "map-tab"));
}

#[test]
fn malformed_region_is_rejected() {
    let raw = r#"{"ver":1,"t":"filter-tab","c":true,"f":["Taipei"],"v":{"lat":23.5,"lng":121,"z":8}}"#;
    assert!(matches!(decode(raw), Err(StateError::Selection(_))));
}

#[test]
fn district_without_county_is_rejected() {
    let raw = r#"{"ver":1,"t":"filter-tab","c":true,"sd":"Daan","v":{"lat":23.5,"lng":121,"z":8}}"#;
    assert!(matches!(decode(raw), Err(StateError::Selection(_))));
}

#[test]
fn out_of_range_viewport_is_rejected() {
    let raw = r#"{"ver":1,"t":"filter-tab","c":true,"v":{"lat":123.5,"lng":121,"z":8}}"#;
    assert!(matches!(
        decode(raw),
        Err(StateError::ViewportOutOfRange { .. })
    ));
    let raw = r#"{"ver":1,"t":"filter-tab","c":true,"v":{"lat":23.5,"lng":121,"z":40}}"#;
    assert!(matches!(
        decode(raw),
        Err(StateError::ViewportOutOfRange { .. })
    ));
}
