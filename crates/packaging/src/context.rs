use georisk_models::{GeoRiskError, ImageSpec};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::instrument;

/// A staged, discardable build context. The staging directory is deleted
/// when this value drops.
#[derive(Debug)]
pub struct BuildContext {
    root: TempDir,
    digest: String,
}

impl BuildContext {
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Content digest over every staged file, in sorted path order.
    /// Unchanged inputs stage to the same digest, which is what makes
    /// rebuilds idempotent.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Collect the manifest, source, configs, and the opaque data directory
/// into a fresh staging directory. Every referenced path must exist; a
/// missing one aborts the build before any work happens.
#[instrument(skip(spec), fields(name = %spec.name))]
pub fn stage(spec: &ImageSpec) -> Result<BuildContext, GeoRiskError> {
    for rel in spec.required_paths() {
        let absolute = spec.context_dir.join(rel);
        if !absolute.exists() {
            return Err(GeoRiskError::BuildInputMissing {
                path: absolute.display().to_string(),
            });
        }
    }

    let root = tempfile::tempdir().map_err(internal)?;

    // Manifest first, then source, then configs, then data. The order
    // mirrors the transfer order registered in the rendered recipe.
    copy_into(&spec.context_dir, root.path(), &spec.manifest)?;
    if let Some(lock) = &spec.lockfile {
        copy_into(&spec.context_dir, root.path(), lock)?;
    }
    for dir in &spec.source_dirs {
        copy_into(&spec.context_dir, root.path(), dir)?;
    }
    if let Some(configs) = &spec.config_dir {
        copy_into(&spec.context_dir, root.path(), configs)?;
    }
    copy_into(&spec.context_dir, root.path(), &spec.data_dir)?;

    let digest = digest_dir(root.path())?;
    Ok(BuildContext { root, digest })
}

fn copy_into(context: &Path, staging: &Path, rel: &Path) -> Result<(), GeoRiskError> {
    let src = context.join(rel);
    let dst = staging.join(rel);
    if src.is_dir() {
        copy_dir_all(&src, &dst).map_err(internal)
    } else {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(internal)?;
        }
        fs::copy(&src, &dst).map(|_| ()).map_err(internal)
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            copy_dir_all(&path, &dst.join(entry.file_name()))?;
        } else {
            fs::copy(&path, dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

fn digest_dir(root: &Path) -> Result<String, GeoRiskError> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files).map_err(internal)?;
    files.sort();

    let mut hasher = Sha256::new();
    for rel in &files {
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        let content = fs::read(root.join(rel)).map_err(internal)?;
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

fn internal(e: std::io::Error) -> GeoRiskError {
    GeoRiskError::InternalError {
        reason: e.to_string(),
    }
}
