use crate::context::BuildContext;
use georisk_models::GeoRiskError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info, instrument};

pub struct ImageBuilder;

impl ImageBuilder {
    /// Write the recipe into the staged context and hand it to the
    /// container engine. A non-zero exit aborts image production; the
    /// engine's stderr is the reason.
    #[instrument(skip(context, dockerfile))]
    pub async fn build(
        context: &BuildContext,
        dockerfile: &str,
        image_ref: &str,
    ) -> Result<(), GeoRiskError> {
        let dockerfile_path = context.path().join("Dockerfile");
        std::fs::write(&dockerfile_path, dockerfile).map_err(|e| GeoRiskError::InternalError {
            reason: e.to_string(),
        })?;

        info!("Building runtime image: {}", image_ref);
        info!("Build context: {:?}", context.path());

        let build_result = Command::new("docker")
            .arg("build")
            .arg("-t")
            .arg(image_ref)
            .arg("-f")
            .arg(&dockerfile_path)
            .arg(context.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GeoRiskError::DockerError {
                message: e.to_string(),
            })?;

        if !build_result.status.success() {
            let stdout = String::from_utf8_lossy(&build_result.stdout);
            let stderr = String::from_utf8_lossy(&build_result.stderr);
            error!("Image build failed - stdout: {}", stdout);
            error!("Image build failed - stderr: {}", stderr);
            return Err(GeoRiskError::BuildFailed {
                reason: stderr.trim().to_string(),
            });
        }

        info!("Built runtime image: {}", image_ref);
        Ok(())
    }
}
