use georisk_models::GeoRiskError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Context-digest → image-ref map, persisted as JSON. A digest hit means
/// the inputs are unchanged and the previous image is already the one an
/// identical rebuild would produce.
pub struct ImageCache {
    cache_dir: PathBuf,
    images: HashMap<String, String>,
}

impl ImageCache {
    pub fn open(cache_dir: PathBuf) -> Result<Self, GeoRiskError> {
        fs::create_dir_all(&cache_dir).map_err(|e| GeoRiskError::InternalError {
            reason: e.to_string(),
        })?;

        let mut cache = Self {
            cache_dir,
            images: HashMap::new(),
        };
        cache.load()?;
        Ok(cache)
    }

    pub fn get(&self, digest: &str) -> Option<&str> {
        self.images.get(digest).map(String::as_str)
    }

    #[instrument(skip(self))]
    pub fn insert(&mut self, digest: String, image_ref: String) {
        info!("Caching image {} for digest {}", image_ref, digest);
        self.images.insert(digest, image_ref);
    }

    fn cache_file(&self) -> PathBuf {
        self.cache_dir.join("image_cache.json")
    }

    fn load(&mut self) -> Result<(), GeoRiskError> {
        let cache_file = self.cache_file();
        if cache_file.exists() {
            let cache_data =
                fs::read_to_string(&cache_file).map_err(|e| GeoRiskError::InternalError {
                    reason: e.to_string(),
                })?;
            self.images =
                serde_json::from_str(&cache_data).map_err(|e| GeoRiskError::InternalError {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), GeoRiskError> {
        let cache_data = serde_json::to_string_pretty(&self.images).map_err(|e| {
            GeoRiskError::InternalError {
                reason: e.to_string(),
            }
        })?;
        fs::write(self.cache_file(), cache_data).map_err(|e| GeoRiskError::InternalError {
            reason: e.to_string(),
        })
    }
}
