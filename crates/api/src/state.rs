use georisk_geo::GeoService;
use georisk_models::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<GeoService>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<GeoService>) -> Self {
        Self { config, engine }
    }
}
