use crate::model::{Prediction, RiskModel};
use crate::slope::SlopeRaster;
use crate::soil::SoilMap;
use georisk_models::{DataConfig, GeoDataResponse, GeoRiskError, HealthResponse, PredictRequest};
use tracing::{error, info};

/// Everything the HTTP layer queries, loaded once at startup. A dataset
/// that fails to load leaves its endpoint degraded rather than keeping
/// the listener from coming up; the failure is in the log and in
/// `/healthz`.
pub struct GeoService {
    soil: Option<SoilMap>,
    slope: Option<SlopeRaster>,
    model: Option<RiskModel>,
}

impl GeoService {
    pub fn load(data: &DataConfig) -> Self {
        let soil = match SoilMap::load(&data.soil_map_path()) {
            Ok(map) => {
                info!(features = map.len(), "soil map loaded");
                Some(map)
            }
            Err(e) => {
                error!("failed to load soil map: {e}");
                None
            }
        };

        let slope = match SlopeRaster::load(&data.slope_map_path()) {
            Ok(raster) => {
                let (width, height) = raster.dimensions();
                info!(width, height, epsg = raster.crs().epsg(), "slope raster loaded");
                Some(raster)
            }
            Err(e) => {
                error!("failed to load slope raster: {e}");
                None
            }
        };

        let model = match RiskModel::load(&data.risk_model_path()) {
            Ok(model) => {
                info!("risk model loaded");
                Some(model)
            }
            Err(e) => {
                error!("failed to load risk model: {e}");
                None
            }
        };

        Self { soil, slope, model }
    }

    pub fn from_parts(
        soil: Option<SoilMap>,
        slope: Option<SlopeRaster>,
        model: Option<RiskModel>,
    ) -> Self {
        Self { soil, slope, model }
    }

    /// Slope and soil unit at a WGS84 coordinate. A missing dataset or a
    /// point outside its coverage yields `null` for that field; a loaded
    /// soil map that simply has no polygon there reports `"Unknown"`.
    pub fn geo_data(&self, lon: f64, lat: f64) -> GeoDataResponse {
        GeoDataResponse {
            slope: self.slope.as_ref().and_then(|raster| raster.sample(lon, lat)),
            soil_type: self
                .soil
                .as_ref()
                .map(|map| map.lookup(lon, lat).unwrap_or("Unknown").to_string()),
        }
    }

    pub fn predict(&self, request: &PredictRequest) -> Result<Prediction, GeoRiskError> {
        let model = self.model.as_ref().ok_or(GeoRiskError::ModelUnavailable)?;
        model.predict(&request.features())
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            soil_map_loaded: self.soil.is_some(),
            slope_map_loaded: self.slope.is_some(),
            risk_model_loaded: self.model.is_some(),
        }
    }
}
