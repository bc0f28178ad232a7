use georisk_models::{GeoRiskError, ImageSpec};
use georisk_packaging::context::stage;
use std::fs;
use std::path::Path;

fn scaffold(root: &Path) {
    fs::write(root.join("Cargo.toml"), "[workspace]\nmembers = []\n").unwrap();
    fs::create_dir_all(root.join("crates/app/src")).unwrap();
    fs::write(root.join("crates/app/src/lib.rs"), "pub fn app() {}\n").unwrap();
    fs::create_dir_all(root.join("src/bin")).unwrap();
    fs::write(root.join("src/bin/georisk-server.rs"), "fn main() {}\n").unwrap();
    fs::create_dir_all(root.join("configs")).unwrap();
    fs::write(root.join("configs/default.toml"), "[server]\n").unwrap();
    fs::create_dir_all(root.join("data/soil_map")).unwrap();
    fs::write(root.join("data/soil_map/hays.bin"), [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
}

#[test]
fn staging_copies_data_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    let context = stage(&ImageSpec::for_workspace(dir.path())).unwrap();
    let staged = fs::read(context.path().join("data/soil_map/hays.bin")).unwrap();
    assert_eq!(staged, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(context.path().join("Cargo.toml").exists());
    assert!(context.path().join("crates/app/src/lib.rs").exists());
}

#[test]
fn unchanged_inputs_stage_to_the_same_digest() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());
    let spec = ImageSpec::for_workspace(dir.path());

    let first = stage(&spec).unwrap();
    let second = stage(&spec).unwrap();
    assert_eq!(first.digest(), second.digest());
}

#[test]
fn touching_the_data_changes_the_digest() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());
    let spec = ImageSpec::for_workspace(dir.path());

    let before = stage(&spec).unwrap().digest().to_string();
    fs::write(dir.path().join("data/soil_map/hays.bin"), [0xCA, 0xFE]).unwrap();
    let after = stage(&spec).unwrap().digest().to_string();
    assert_ne!(before, after);
}

#[test]
fn missing_data_directory_aborts_the_build() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());
    fs::remove_dir_all(dir.path().join("data")).unwrap();

    let err = stage(&ImageSpec::for_workspace(dir.path())).unwrap_err();
    match err {
        GeoRiskError::BuildInputMissing { path } => assert!(path.ends_with("data")),
        other => panic!("expected BuildInputMissing, got {other}"),
    }
}

#[test]
fn declared_lockfile_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    scaffold(dir.path());

    let mut spec = ImageSpec::for_workspace(dir.path());
    spec.lockfile = Some("Cargo.lock".into());
    assert!(matches!(
        stage(&spec),
        Err(GeoRiskError::BuildInputMissing { .. })
    ));
}
