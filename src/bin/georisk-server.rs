use anyhow::Result;
use georisk_api::{start_server, AppState};
use georisk_geo::GeoService;
use georisk_models::{port_from_env, Config};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::load(None).unwrap_or_else(|e| {
        warn!("Failed to load config file: {}, using defaults", e);
        Config::default()
    });

    // The hosting platform injects PORT. Guessing a port here would hide
    // a broken deployment, so absence is fatal.
    let port = match port_from_env() {
        Ok(port) => port,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    // One process, a fixed number of request-serving threads: the same
    // topology the production image registers.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.worker_threads)
        .enable_all()
        .build()?;
    runtime.block_on(run(config, port))
}

async fn run(config: Config, port: u16) -> Result<()> {
    info!("Starting GeoRisk server");

    let engine = Arc::new(GeoService::load(&config.data));
    let bind = config.server.bind.clone();
    let state = AppState::new(config, engine);

    tokio::select! {
        result = start_server(bind, port, state) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(anyhow::anyhow!(e));
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("GeoRisk server shutdown complete");
    Ok(())
}
