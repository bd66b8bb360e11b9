use screen_pets::settings::{PetMode, PetSettings, PetType, MAX_SPEED, MIN_SCALE};
use screen_pets::settings_store::{
    load_from_path, load_or_default, save_to_path, settings_path_from_exe_path,
    SETTINGS_FILE_NAME,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn settings_file_lives_next_to_the_executable() {
    let path = settings_path_from_exe_path(Path::new("/opt/pets/screen_pets")).unwrap();
    assert_eq!(path, Path::new("/opt/pets").join(SETTINGS_FILE_NAME));
}

#[test]
fn saved_settings_load_back_sanitized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
    let settings = PetSettings {
        pet_type: PetType::Ghost,
        mode: PetMode::SecondaryOnly,
        speed: 40.0,
        scale: 0.1,
        ..PetSettings::default()
    };

    save_to_path(&path, &settings).unwrap();
    let loaded = load_from_path(&path).unwrap().unwrap();

    assert_eq!(loaded.pet_type, PetType::Ghost);
    assert_eq!(loaded.mode, PetMode::SecondaryOnly);
    assert_eq!(loaded.speed, MAX_SPEED);
    assert_eq!(loaded.scale, MIN_SCALE);
}

#[test]
fn hand_edited_file_with_unknown_values_still_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(
        &path,
        r#"{ "enabled": false, "pet_type": "nyan_cat", "mode": "diagonal", "extra": 1 }"#,
    )
    .unwrap();

    let loaded = load_or_default(&path).unwrap();
    assert!(!loaded.enabled);
    assert_eq!(loaded.pet_type, PetType::NyanCat);
    assert_eq!(loaded.mode, PetMode::CrossScreen);
    assert_eq!(loaded.speed, 3.0);
}

#[test]
fn missing_and_empty_files_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    assert!(load_from_path(&path).unwrap().is_none());
    assert_eq!(load_or_default(&path).unwrap(), PetSettings::default());

    fs::write(&path, "  \n").unwrap();
    assert_eq!(load_from_path(&path).unwrap(), Some(PetSettings::default()));
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, "{ not json").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains(SETTINGS_FILE_NAME));
}
