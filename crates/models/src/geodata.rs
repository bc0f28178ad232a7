use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoDataResponse {
    pub slope: Option<f64>,
    pub soil_type: Option<String>,
}

/// Number of inputs the risk classifier was trained on.
pub const FEATURE_COUNT: usize = 15;

/// Prediction input. Field names are the wire contract the frontend has
/// always sent, hyphens and the odd `rain-intensity-6hr` spelling
/// included; absent fields fall back to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub soil_type: i64,
    #[serde(default)]
    pub slope: f64,
    #[serde(default)]
    pub soil_moisture: f64,
    #[serde(default, rename = "rainfall-3-hr")]
    pub rainfall_3_hr: f64,
    #[serde(default, rename = "rainfall-6-hr")]
    pub rainfall_6_hr: f64,
    #[serde(default, rename = "rainfall-12-hr")]
    pub rainfall_12_hr: f64,
    #[serde(default, rename = "rain-intensity-3-hr")]
    pub rain_intensity_3_hr: f64,
    #[serde(default, rename = "rain-intensity-6hr")]
    pub rain_intensity_6_hr: f64,
    #[serde(default, rename = "rain-intensity-12-hr")]
    pub rain_intensity_12_hr: f64,
    #[serde(default, rename = "rainfall-1-day")]
    pub rainfall_1_day: f64,
    #[serde(default, rename = "rainfall-3-day")]
    pub rainfall_3_day: f64,
    #[serde(default, rename = "rainfall-5-day")]
    pub rainfall_5_day: f64,
    #[serde(default, rename = "rain-intensity-1-day")]
    pub rain_intensity_1_day: f64,
    #[serde(default, rename = "rain-intensity-3-day")]
    pub rain_intensity_3_day: f64,
    #[serde(default, rename = "rain-intensity-5-day")]
    pub rain_intensity_5_day: f64,
}

impl PredictRequest {
    /// Feature vector in training order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.soil_type as f64,
            self.slope,
            self.soil_moisture,
            self.rainfall_3_hr,
            self.rainfall_6_hr,
            self.rainfall_12_hr,
            self.rain_intensity_3_hr,
            self.rain_intensity_6_hr,
            self.rain_intensity_12_hr,
            self.rainfall_1_day,
            self.rainfall_3_day,
            self.rainfall_5_day,
            self.rain_intensity_1_day,
            self.rain_intensity_3_day,
            self.rain_intensity_5_day,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthResponse {
    pub status: String,
    pub soil_map_loaded: bool,
    pub slope_map_loaded: bool,
    pub risk_model_loaded: bool,
}
