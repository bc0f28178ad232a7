use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Startup contract registered in the runtime image. The port itself is
/// deliberately absent: it is injected through [`crate::PORT_ENV`] when
/// the container starts, never baked into the image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeContract {
    pub port_env: String,
    pub bind: String,
    pub workers: u32,
    pub worker_threads: u32,
    /// `None` disables the request deadline at this layer; the hosting
    /// platform enforces the outer timeout.
    pub request_timeout_ms: Option<u64>,
}

impl Default for RuntimeContract {
    fn default() -> Self {
        Self {
            port_env: crate::PORT_ENV.to_string(),
            bind: "0.0.0.0".to_string(),
            workers: 1,
            worker_threads: 8,
            request_timeout_ms: None,
        }
    }
}

/// Inputs to the runtime image assembler: where the build context lives,
/// which files must exist in it, and what the two build stages look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub name: String,
    /// Directory the manifest, source, and data paths below are relative to.
    pub context_dir: PathBuf,
    pub manifest: PathBuf,
    pub lockfile: Option<PathBuf>,
    pub source_dirs: Vec<PathBuf>,
    pub config_dir: Option<PathBuf>,
    /// Opaque directory copied verbatim into the image.
    pub data_dir: PathBuf,
    /// Name of the binary the builder stage produces and the image runs.
    pub binary: String,
    pub builder_image: String,
    pub runtime_image: String,
    /// Native packages the service needs at run time. Build tooling never
    /// belongs here.
    pub runtime_packages: Vec<String>,
    pub contract: RuntimeContract,
}

impl ImageSpec {
    /// Spec for building this workspace's own server image.
    pub fn for_workspace(context_dir: impl Into<PathBuf>) -> Self {
        let context_dir = context_dir.into();
        let lockfile = context_dir
            .join("Cargo.lock")
            .exists()
            .then(|| PathBuf::from("Cargo.lock"));
        Self {
            name: "georisk".to_string(),
            context_dir,
            manifest: PathBuf::from("Cargo.toml"),
            lockfile,
            source_dirs: vec![PathBuf::from("crates"), PathBuf::from("src")],
            config_dir: Some(PathBuf::from("configs")),
            data_dir: PathBuf::from("data"),
            binary: "georisk-server".to_string(),
            builder_image: "rust:1.79-slim".to_string(),
            runtime_image: "debian:bookworm-slim".to_string(),
            runtime_packages: vec!["ca-certificates".to_string()],
            contract: RuntimeContract::default(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.context_dir.join(&self.manifest)
    }

    pub fn data_dir_path(&self) -> PathBuf {
        self.context_dir.join(&self.data_dir)
    }

    /// Every context-relative path the assembler will transfer. Missing
    /// entries are fatal before any build work starts.
    pub fn required_paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.manifest.as_path()];
        if let Some(lock) = &self.lockfile {
            paths.push(lock.as_path());
        }
        paths.extend(self.source_dirs.iter().map(PathBuf::as_path));
        if let Some(configs) = &self.config_dir {
            paths.push(configs.as_path());
        }
        paths.push(self.data_dir.as_path());
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contract_matches_the_deployed_topology() {
        let contract = RuntimeContract::default();
        assert_eq!(contract.port_env, "PORT");
        assert_eq!(contract.bind, "0.0.0.0");
        assert_eq!(contract.workers, 1);
        assert_eq!(contract.worker_threads, 8);
        assert!(contract.request_timeout_ms.is_none());
    }

    #[test]
    fn required_paths_cover_manifest_source_and_data() {
        let spec = ImageSpec::for_workspace("/tmp/nowhere");
        let paths = spec.required_paths();
        assert!(paths.contains(&Path::new("Cargo.toml")));
        assert!(paths.contains(&Path::new("crates")));
        assert!(paths.contains(&Path::new("data")));
    }
}
