use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;
use super::ArtifactError;

/// Fitted standardization transform — loaded from JSON at startup and
/// immutable afterwards. Maps `x[i]` to `(x[i] - mean[i]) / scale[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

impl FeatureScaler {
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let scaler: Self = serde_json::from_str(json).map_err(ArtifactError::ParseJson)?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(ArtifactError::Io)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != FEATURE_COUNT {
            return Err(ArtifactError::DimensionMismatch {
                field: "mean",
                expected: FEATURE_COUNT,
                got: self.mean.len(),
            });
        }
        if self.scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::DimensionMismatch {
                field: "scale",
                expected: FEATURE_COUNT,
                got: self.scale.len(),
            });
        }
        for (i, &value) in self.mean.iter().enumerate() {
            if !value.is_finite() {
                return Err(ArtifactError::NonFinite {
                    field: "mean",
                    index: i,
                    value,
                });
            }
        }
        for (i, &value) in self.scale.iter().enumerate() {
            if !value.is_finite() {
                return Err(ArtifactError::NonFinite {
                    field: "scale",
                    index: i,
                    value,
                });
            }
            if value == 0.0 {
                return Err(ArtifactError::ZeroScale { index: i });
            }
        }
        super::check_feature_names(&self.feature_names)
    }

    pub fn transform(&self, values: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0f64; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            scaled[i] = (values[i] - self.mean[i]) / self.scale[i];
        }
        scaled
    }

    /// Pass-through scaler (zero mean, unit scale).
    #[cfg(test)]
    pub(crate) fn identity() -> Self {
        Self {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
            feature_names: super::features::FEATURE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_scaler_passes_values_through() {
        let scaler = FeatureScaler::identity();
        scaler.validate().unwrap();
        let values = [10.0, 5.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(scaler.transform(&values), values);
    }

    #[test]
    fn transform_centers_and_scales_each_slot() {
        let mut scaler = FeatureScaler::identity();
        scaler.mean[0] = 4.0;
        scaler.scale[0] = 2.0;
        scaler.mean[2] = 1.0;
        scaler.scale[2] = 0.5;

        let values = [10.0, 5.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let scaled = scaler.transform(&values);
        assert_eq!(scaled[0], 3.0);
        assert_eq!(scaled[1], 5.0);
        assert_eq!(scaled[2], 2.0);
    }

    #[test]
    fn rejects_wrong_length() {
        let mut scaler = FeatureScaler::identity();
        scaler.mean.pop();
        assert!(matches!(
            scaler.validate(),
            Err(ArtifactError::DimensionMismatch { field: "mean", .. })
        ));
    }

    #[test]
    fn rejects_zero_scale_factor() {
        let mut scaler = FeatureScaler::identity();
        scaler.scale[4] = 0.0;
        assert!(matches!(
            scaler.validate(),
            Err(ArtifactError::ZeroScale { index: 4 })
        ));
    }

    #[test]
    fn rejects_non_finite_mean() {
        let mut scaler = FeatureScaler::identity();
        scaler.mean[1] = f64::NAN;
        assert!(matches!(
            scaler.validate(),
            Err(ArtifactError::NonFinite { field: "mean", index: 1, .. })
        ));
    }

    #[test]
    fn rejects_renamed_padding_slot() {
        let mut scaler = FeatureScaler::identity();
        scaler.feature_names[8] = "merchant_risk".to_string();
        assert!(matches!(
            scaler.validate(),
            Err(ArtifactError::FeatureNameMismatch { index: 8, .. })
        ));
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "mean":  [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        }"#;
        let scaler = FeatureScaler::from_json(json).unwrap();
        assert!(scaler.feature_names.is_empty());
    }
}
