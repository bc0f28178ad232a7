use georisk_models::ImageSpec;

/// Render the two-stage build recipe.
///
/// The builder stage carries the full toolchain and is discarded; the
/// runtime stage receives only the compiled binary, configuration, the
/// data directory, and whatever native packages the spec declares. The
/// listening port is never written here — the binary reads it from the
/// environment variable named by the contract when the container starts.
pub fn render(spec: &ImageSpec) -> String {
    let manifest = spec.manifest.display();
    let manifest_copy = match &spec.lockfile {
        Some(lock) => format!("COPY {manifest} {} ./", lock.display()),
        None => format!("COPY {manifest} ./"),
    };
    let locked = if spec.lockfile.is_some() {
        " --locked"
    } else {
        ""
    };

    let source_copies = spec
        .source_dirs
        .iter()
        .map(|dir| format!("COPY {0} ./{0}", dir.display()))
        .collect::<Vec<_>>()
        .join("\n");

    let runtime_packages = if spec.runtime_packages.is_empty() {
        String::new()
    } else {
        format!(
            "RUN apt-get update \\\n    && apt-get install -y --no-install-recommends {} \\\n    && rm -rf /var/lib/apt/lists/*\n",
            spec.runtime_packages.join(" ")
        )
    };

    let config_copy = match &spec.config_dir {
        Some(dir) => format!("COPY {0} ./{0}\n", dir.display()),
        None => String::new(),
    };

    let timeout_env = match spec.contract.request_timeout_ms {
        Some(ms) => format!("ENV GEORISK_SERVER__REQUEST_TIMEOUT_MS={ms}\n"),
        None => String::new(),
    };

    let binary = &spec.binary;
    let data_dir = spec.data_dir.display();

    format!(
        r#"# Build stage: full toolchain, discarded once artifacts are copied out.
FROM {builder} AS builder
WORKDIR /build
{manifest_copy}
{source_copies}
RUN cargo fetch{locked}
RUN cargo build --release{locked} --bin {binary}

# Runtime stage: language runtime base plus only what the service
# executes and reads. No build tooling crosses this line.
FROM {runtime}
{runtime_packages}WORKDIR /app
COPY --from=builder /build/target/release/{binary} /usr/local/bin/{binary}
{config_copy}COPY {data_dir} ./{data_dir}
ENV GEORISK_SERVER__BIND={bind}
ENV GEORISK_SERVER__WORKER_THREADS={threads}
{timeout_env}USER 1000:1000
CMD ["{binary}"]
"#,
        builder = spec.builder_image,
        runtime = spec.runtime_image,
        bind = spec.contract.bind,
        threads = spec.contract.worker_threads,
    )
}
