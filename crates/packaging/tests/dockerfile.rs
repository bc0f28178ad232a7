use georisk_models::ImageSpec;
use georisk_packaging::dockerfile::render;
use std::fs;

fn spec() -> ImageSpec {
    // Context path does not need to exist for rendering.
    ImageSpec::for_workspace("/nonexistent")
}

#[test]
fn recipe_has_a_builder_stage_and_a_runtime_stage() {
    let recipe = render(&spec());
    let stages: Vec<_> = recipe
        .lines()
        .filter(|line| line.starts_with("FROM "))
        .collect();
    assert_eq!(stages.len(), 2);
    assert!(stages[0].contains("rust:1.79-slim"));
    assert!(stages[0].ends_with("AS builder"));
    assert!(stages[1].contains("debian:bookworm-slim"));
}

#[test]
fn runtime_stage_carries_no_build_tooling() {
    let recipe = render(&spec());
    let runtime_stage = recipe.split("FROM debian:bookworm-slim").nth(1).unwrap();
    assert!(!runtime_stage.contains("cargo"));
    assert!(!runtime_stage.contains("rustc"));
    assert!(runtime_stage
        .contains("COPY --from=builder /build/target/release/georisk-server /usr/local/bin/"));
}

#[test]
fn port_is_injected_at_run_time_not_baked_in() {
    let recipe = render(&spec());
    assert!(!recipe.contains("ENV PORT"));
    assert!(!recipe.contains("EXPOSE"));
    assert!(recipe.contains("CMD [\"georisk-server\"]"));
}

#[test]
fn worker_topology_is_registered_as_environment() {
    let recipe = render(&spec());
    assert!(recipe.contains("ENV GEORISK_SERVER__BIND=0.0.0.0"));
    assert!(recipe.contains("ENV GEORISK_SERVER__WORKER_THREADS=8"));
    // Timeout stays disabled: no override is registered.
    assert!(!recipe.contains("REQUEST_TIMEOUT"));
}

#[test]
fn data_directory_transfers_after_the_binary() {
    let recipe = render(&spec());
    let binary_at = recipe.find("COPY --from=builder").unwrap();
    let data_at = recipe.find("COPY data ./data").unwrap();
    assert!(data_at > binary_at);
}

#[test]
fn manifest_copies_before_source_in_the_builder_stage() {
    let recipe = render(&spec());
    let manifest_at = recipe.find("COPY Cargo.toml").unwrap();
    let source_at = recipe.find("COPY crates ./crates").unwrap();
    let fetch_at = recipe.find("RUN cargo fetch").unwrap();
    let build_at = recipe.find("RUN cargo build --release").unwrap();
    assert!(manifest_at < source_at);
    assert!(fetch_at < build_at);
}

#[test]
fn a_lockfile_pins_the_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Cargo.lock"), "# lock\n").unwrap();
    let recipe = render(&ImageSpec::for_workspace(dir.path()));
    assert!(recipe.contains("COPY Cargo.toml Cargo.lock ./"));
    assert!(recipe.contains("cargo build --release --locked"));
}

#[test]
fn runtime_packages_render_a_single_apt_layer() {
    let mut spec = spec();
    spec.runtime_packages = vec!["ca-certificates".into(), "libexpat1".into()];
    let recipe = render(&spec);
    assert_eq!(recipe.matches("apt-get install").count(), 1);
    assert!(recipe.contains("ca-certificates libexpat1"));
    assert!(recipe.contains("rm -rf /var/lib/apt/lists/*"));

    spec.runtime_packages.clear();
    assert!(!render(&spec).contains("apt-get"));
}

#[test]
fn timeout_override_is_rendered_only_when_set() {
    let mut spec = spec();
    spec.contract.request_timeout_ms = Some(30_000);
    let recipe = render(&spec);
    assert!(recipe.contains("ENV GEORISK_SERVER__REQUEST_TIMEOUT_MS=30000"));
}
