// Preset persistence tests

use super::*;
use crate::types::{FieldMode, LocatorStrategy};
use pretty_assertions::assert_eq;

fn sample_presets() -> Vec<FormPreset> {
    vec![
        FormPreset {
            item: "floor".to_string(),
            mode: FieldMode::Select,
            locator_type: LocatorStrategy::Id,
            locator_value: "floor".to_string(),
        },
        FormPreset {
            item: "area".to_string(),
            mode: FieldMode::Normal,
            locator_type: LocatorStrategy::Name,
            locator_value: "unit_area".to_string(),
        },
    ]
}

#[test]
fn test_absent_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path().join("presets.json"));

    assert!(!store.exists());
    let presets = store.load().unwrap();
    assert!(presets.is_empty());
}

#[test]
fn test_save_and_load_roundtrip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path().join("presets.json"));

    let presets = sample_presets();
    store.save(&presets).unwrap();

    assert!(store.exists());
    let loaded = store.load().unwrap();
    assert_eq!(loaded, presets);
}

#[test]
fn test_save_creates_missing_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path().join("nested/deeper/presets.json"));

    store.save(&sample_presets()).unwrap();
    assert!(store.exists());
}

#[test]
fn test_save_rejects_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path().join("presets.json"));

    assert!(store.save(&[]).is_err());
    assert!(!store.exists());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    std::fs::write(&path, "{ not json ]").unwrap();

    let store = PresetStore::new(path);
    let err = store.load().unwrap_err();
    assert!(err.to_string().contains("Malformed preset file"));
}

#[test]
fn test_default_path_ends_with_app_dir() {
    let path = PresetStore::default_path();
    assert!(path.ends_with("webfill/presets.json"));
}
