use georisk_models::{GeoRiskError, FEATURE_COUNT};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const LANDSLIDE: &str = "Landslide";
pub const NO_LANDSLIDE: &str = "No Landslide";

/// Landslide classifier: a standardizing scaler followed by a binary
/// logistic model, both exported from training as plain JSON parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskModel {
    pub scaler: Scaler,
    pub classifier: Classifier,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classifier {
    pub weights: Vec<f64>,
    pub bias: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: &'static str,
    /// Probability of the winning class.
    pub probability: f64,
}

impl Prediction {
    pub fn confidence(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

impl RiskModel {
    pub fn load(path: &Path) -> Result<Self, GeoRiskError> {
        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let model: RiskModel =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| load_error(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), GeoRiskError> {
        if self.scaler.mean.len() != FEATURE_COUNT
            || self.scaler.scale.len() != FEATURE_COUNT
            || self.classifier.weights.len() != FEATURE_COUNT
        {
            return Err(load_error(format!(
                "parameter vectors must have {FEATURE_COUNT} entries"
            )));
        }
        if self
            .scaler
            .scale
            .iter()
            .any(|s| *s == 0.0 || !s.is_finite())
        {
            return Err(load_error("scaler scale entries must be nonzero".to_string()));
        }
        Ok(())
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<Prediction, GeoRiskError> {
        let mut z = self.classifier.bias;
        for (i, feature) in features.iter().enumerate() {
            if !feature.is_finite() {
                return Err(GeoRiskError::PredictionFailed {
                    reason: format!("feature {i} is not a finite number"),
                });
            }
            z += self.classifier.weights[i] * (feature - self.scaler.mean[i]) / self.scaler.scale[i];
        }

        let p_landslide = 1.0 / (1.0 + (-z).exp());
        let prediction = if p_landslide >= 0.5 {
            Prediction {
                label: LANDSLIDE,
                probability: p_landslide,
            }
        } else {
            Prediction {
                label: NO_LANDSLIDE,
                probability: 1.0 - p_landslide,
            }
        };
        Ok(prediction)
    }
}

fn load_error(reason: String) -> GeoRiskError {
    GeoRiskError::DataLoad {
        source_name: "risk model".to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_model(weights: [f64; FEATURE_COUNT], bias: f64) -> RiskModel {
        RiskModel {
            scaler: Scaler {
                mean: vec![0.0; FEATURE_COUNT],
                scale: vec![1.0; FEATURE_COUNT],
            },
            classifier: Classifier {
                weights: weights.to_vec(),
                bias,
            },
        }
    }

    #[test]
    fn strong_positive_signal_predicts_landslide() {
        let mut weights = [0.0; FEATURE_COUNT];
        weights[1] = 1.0; // slope
        let model = identity_model(weights, 0.0);

        let mut features = [0.0; FEATURE_COUNT];
        features[1] = 10.0;
        let prediction = model.predict(&features).unwrap();
        assert_eq!(prediction.label, LANDSLIDE);
        assert!(prediction.probability > 0.99);
    }

    #[test]
    fn zero_signal_with_negative_bias_predicts_no_landslide() {
        let model = identity_model([0.0; FEATURE_COUNT], -2.0);
        let prediction = model.predict(&[0.0; FEATURE_COUNT]).unwrap();
        assert_eq!(prediction.label, NO_LANDSLIDE);
        assert!(prediction.probability > 0.8);
    }

    #[test]
    fn confidence_is_percent_formatted() {
        let prediction = Prediction {
            label: LANDSLIDE,
            probability: 0.87654,
        };
        assert_eq!(prediction.confidence(), "87.65%");
    }

    #[test]
    fn non_finite_features_are_rejected() {
        let model = identity_model([0.0; FEATURE_COUNT], 0.0);
        let mut features = [0.0; FEATURE_COUNT];
        features[3] = f64::NAN;
        assert!(matches!(
            model.predict(&features),
            Err(GeoRiskError::PredictionFailed { .. })
        ));
    }

    #[test]
    fn mismatched_parameter_lengths_fail_validation() {
        let model = RiskModel {
            scaler: Scaler {
                mean: vec![0.0; 3],
                scale: vec![1.0; 3],
            },
            classifier: Classifier {
                weights: vec![0.0; 3],
                bias: 0.0,
            },
        };
        assert!(model.validate().is_err());
    }
}
