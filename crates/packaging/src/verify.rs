use georisk_models::GeoRiskError;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::{sleep, timeout, Instant};

/// Start the image with `PORT` set and require a listening socket on the
/// published host port within the window.
pub async fn verify_port_binding(
    image_ref: &str,
    port: u16,
    window: Duration,
) -> Result<(), GeoRiskError> {
    let host_port = free_host_port()?;
    let container = container_name("bind");

    run_docker(&[
        "run",
        "-d",
        "--rm",
        "--name",
        &container,
        "-e",
        &format!("PORT={port}"),
        "-p",
        &format!("127.0.0.1:{host_port}:{port}"),
        image_ref,
    ])
    .await?;

    let deadline = Instant::now() + window;
    let result = loop {
        match TcpStream::connect(("127.0.0.1", host_port)).await {
            Ok(_) => break Ok(()),
            Err(e) => {
                if Instant::now() >= deadline {
                    break Err(GeoRiskError::ContractViolation {
                        reason: format!(
                            "no listener on port {host_port} within {window:?}: {e}"
                        ),
                    });
                }
                sleep(Duration::from_millis(100)).await;
            }
        }
    };

    let _ = run_docker(&["rm", "-f", &container]).await;
    result
}

/// Start the image with no `PORT` at all and require a prompt non-zero
/// exit. A container that keeps running, or exits cleanly, has silently
/// defaulted the port and broken the startup contract.
pub async fn verify_missing_port_fails(
    image_ref: &str,
    window: Duration,
) -> Result<(), GeoRiskError> {
    let container = container_name("noport");

    let mut run = Command::new("docker");
    run.args(["run", "--name", &container, image_ref])
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let result = match timeout(window, run.status()).await {
        Err(_) => Err(GeoRiskError::ContractViolation {
            reason: format!("container kept running without PORT for {window:?}"),
        }),
        Ok(Err(e)) => Err(GeoRiskError::DockerError {
            message: e.to_string(),
        }),
        Ok(Ok(status)) if status.success() => Err(GeoRiskError::ContractViolation {
            reason: "container exited successfully without PORT".to_string(),
        }),
        Ok(Ok(_)) => Ok(()),
    };

    let _ = run_docker(&["rm", "-f", &container]).await;
    result
}

async fn run_docker(args: &[&str]) -> Result<String, GeoRiskError> {
    let output = Command::new("docker")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| GeoRiskError::DockerError {
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(GeoRiskError::DockerError {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn container_name(suffix: &str) -> String {
    format!("georisk-verify-{}-{suffix}", std::process::id())
}

fn free_host_port() -> Result<u16, GeoRiskError> {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").map_err(|e| GeoRiskError::InternalError {
            reason: e.to_string(),
        })?;
    let port = listener
        .local_addr()
        .map_err(|e| GeoRiskError::InternalError {
            reason: e.to_string(),
        })?
        .port();
    Ok(port)
}
