use serde::{Deserialize, Serialize};

use crate::types::FraudLabel;

use super::features::FEATURE_COUNT;
use super::ArtifactError;

/// Fitted logistic-regression classifier — loaded from JSON at startup
/// and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudModel {
    pub model_id: String,
    pub model_version: String,
    /// Weight vector (length = FEATURE_COUNT), applied to scaled features.
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Decision threshold: P(fraud) >= threshold -> fraudulent.
    pub threshold: f64,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

impl FraudModel {
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let model: Self = serde_json::from_str(json).map_err(ArtifactError::ParseJson)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(ArtifactError::Io)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ArtifactError::DimensionMismatch {
                field: "weights",
                expected: FEATURE_COUNT,
                got: self.weights.len(),
            });
        }
        for (i, &weight) in self.weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(ArtifactError::NonFinite {
                    field: "weights",
                    index: i,
                    value: weight,
                });
            }
        }
        if !self.bias.is_finite() {
            return Err(ArtifactError::NonFinite {
                field: "bias",
                index: 0,
                value: self.bias,
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ArtifactError::InvalidThreshold(self.threshold));
        }
        super::check_feature_names(&self.feature_names)
    }

    /// Class probabilities for one scaled row: `[P(legitimate), P(fraud)]`.
    pub fn predict_probability(&self, scaled: &[f64; FEATURE_COUNT]) -> [f64; 2] {
        let z = dot(&self.weights, scaled) + self.bias;
        let fraud = sigmoid(z);
        [1.0 - fraud, fraud]
    }

    /// Binary label for one scaled row. Derived from the same probability
    /// `predict_probability` reports, so the two operations cannot disagree.
    pub fn predict(&self, scaled: &[f64; FEATURE_COUNT]) -> FraudLabel {
        let [_, fraud] = self.predict_probability(scaled);
        if fraud >= self.threshold {
            FraudLabel::Fraudulent
        } else {
            FraudLabel::Legitimate
        }
    }
}

fn dot(weights: &[f64], values: &[f64; FEATURE_COUNT]) -> f64 {
    weights.iter().zip(values.iter()).map(|(w, x)| w * x).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}
