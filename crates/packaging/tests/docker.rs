//! End-to-end packaging checks against a live container engine.
//! Run with `cargo test -p georisk-packaging --features docker_tests`.
#![cfg(feature = "docker_tests")]

use georisk_models::ImageSpec;
use georisk_packaging::{verify_missing_port_fails, verify_port_binding, PackagingService};
use std::path::PathBuf;
use std::time::Duration;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap()
}

#[tokio::test]
async fn built_image_honors_the_startup_contract() {
    let root = workspace_root();
    let spec = ImageSpec::for_workspace(&root);
    let cache_dir = root.join("target/image-cache");

    let mut service = PackagingService::new(cache_dir).unwrap();
    let outcome = service.assemble(&spec, "georisk:contract-test").await.unwrap();
    let image_ref = outcome.image_ref().to_string();

    verify_port_binding(&image_ref, 8080, Duration::from_secs(60))
        .await
        .unwrap();
    verify_missing_port_fails(&image_ref, Duration::from_secs(60))
        .await
        .unwrap();
}

#[tokio::test]
async fn rebuilding_unchanged_inputs_hits_the_cache() {
    let root = workspace_root();
    let spec = ImageSpec::for_workspace(&root);
    let cache_dir = root.join("target/image-cache");

    let mut service = PackagingService::new(cache_dir).unwrap();
    service
        .assemble(&spec, "georisk:contract-test")
        .await
        .unwrap();
    let second = service
        .assemble(&spec, "georisk:contract-test-2")
        .await
        .unwrap();
    assert!(matches!(
        second,
        georisk_packaging::AssembleOutcome::Cached { .. }
    ));
}
