use crate::error::GeoRiskError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable the hosting platform uses to hand the service its
/// TCP port. Required at startup; there is no default.
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub worker_threads: usize,
    pub max_request_body_size_mb: u64,
    /// Unset disables the request deadline at this layer; the hosting
    /// platform enforces the outer timeout.
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub dir: String,
    pub soil_map: String,
    pub slope_map: String,
    pub risk_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                worker_threads: 8,
                max_request_body_size_mb: 10,
                request_timeout_ms: None,
            },
            data: DataConfig {
                dir: "data".to_string(),
                soil_map: "soil_map/hays.shp".to_string(),
                slope_map: "slope_map/slope.tif".to_string(),
                risk_model: "models/landslide.json".to_string(),
            },
        }
    }
}

impl DataConfig {
    pub fn soil_map_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.soil_map)
    }

    pub fn slope_map_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.slope_map)
    }

    pub fn risk_model_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.risk_model)
    }
}

impl Config {
    /// Layered load: built-in defaults, then the TOML file, then
    /// `GEORISK_*` environment overrides (`GEORISK_SERVER__BIND`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self, GeoRiskError> {
        let file = path.unwrap_or_else(|| Path::new("configs/default.toml"));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("GEORISK_").split("__"))
            .extract()
            .map_err(|e| GeoRiskError::ConfigError {
                reason: e.to_string(),
            })
    }
}

/// Resolve the listening port from the `PORT` environment variable.
/// Absence or garbage is fatal; the platform injects this value and a
/// silent fallback would mask a misconfigured deployment.
pub fn port_from_env() -> Result<u16, GeoRiskError> {
    parse_port(std::env::var(PORT_ENV).ok().as_deref())
}

pub fn parse_port(value: Option<&str>) -> Result<u16, GeoRiskError> {
    match value {
        None => Err(GeoRiskError::PortMissing),
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| GeoRiskError::PortInvalid {
                value: raw.to_string(),
            }),
    }
}
