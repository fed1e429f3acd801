//! Preset catalog loading from disk.

use std::fs;

use rollpress_core::{
    config::load_config, presets::PresetCatalog, ConfigError, MaterialKind, PresetError, PresetRegistry,
};
use tempfile::TempDir;

const SHOP_CATALOG: &str = r#"{
    "engineMinVersion": "1.0.0",
    "rolls": [
        {
            "id": "24in-100ft",
            "name": "24\" x 100' roll",
            "physicalWidthIn": 24.0,
            "usableWidthIn": 23.25,
            "rollLengthFt": 100.0,
            "spacingIn": 0.125,
            "maxSectionLengthIn": 36.0
        }
    ],
    "materials": [
        { "id": "holo-vinyl", "name": "Holographic vinyl", "kind": "substrate", "costPerRoll": 310.0 }
    ]
}"#;

#[test]
fn loads_catalog_files_on_top_of_builtin() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shop.json"), SHOP_CATALOG).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

    let registry = PresetRegistry::load_from_dir(dir.path()).unwrap();

    let roll = registry.roll("24in-100ft").unwrap();
    assert!((roll.roll_spec().roll_length_ft - 100.0).abs() < f64::EPSILON);
    assert_eq!(registry.material("holo-vinyl").unwrap().kind, MaterialKind::Substrate);
    assert!(registry.roll("54in-150ft").is_some());
}

#[test]
fn skips_bad_files_but_keeps_good_ones() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a-broken.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("b-future.json"),
        r#"{ "engineMinVersion": "99.0.0", "rolls": [], "materials": [] }"#,
    )
    .unwrap();
    fs::write(dir.path().join("c-shop.json"), SHOP_CATALOG).unwrap();

    let mut registry = PresetRegistry::new();
    let loaded = registry.load_dir(dir.path()).unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(registry.list_rolls().len(), 1);
}

#[test]
fn strict_file_loading_reports_the_reason() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"rolls\": 7 }").unwrap();
    assert!(matches!(PresetCatalog::load_file(&broken), Err(PresetError::ParseError { .. })));

    let future = dir.path().join("future.json");
    fs::write(&future, r#"{ "engineMinVersion": "99.0.0" }"#).unwrap();
    assert!(matches!(
        PresetCatalog::load_file(&future),
        Err(PresetError::EngineVersionMismatch { .. })
    ));

    let missing = dir.path().join("missing.json");
    assert!(matches!(PresetCatalog::load_file(&missing), Err(PresetError::ReadError { .. })));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = PresetRegistry::load_from_dir(&dir.path().join("nope"));
    assert!(matches!(result, Err(PresetError::ReadError { .. })));
}

#[test]
fn config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "defaultRoll": "30in-150ft", "press": { "secondsPerSection": 240 } }"#).unwrap();

    let cfg = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.default_roll.as_deref(), Some("30in-150ft"));
    assert_eq!(cfg.press.seconds_per_section, 240);

    let missing = dir.path().join("absent.json");
    assert!(matches!(load_config(Some(&missing)), Err(ConfigError::NotFound { .. })));
}
