pub mod features;
pub mod model;
pub mod scaler;

use std::path::Path;

use crate::types::{FraudAssessment, FraudLabel, TransactionInput};

use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use model::FraudModel;
use scaler::FeatureScaler;

#[derive(Debug)]
pub enum ArtifactError {
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    NonFinite {
        field: &'static str,
        index: usize,
        value: f64,
    },
    ZeroScale {
        index: usize,
    },
    InvalidThreshold(f64),
    FeatureNameMismatch {
        index: usize,
        expected: String,
        got: String,
    },
    ParseJson(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch {
                field,
                expected,
                got,
            } => write!(f, "{field} length mismatch: expected {expected}, got {got}"),
            Self::NonFinite {
                field,
                index,
                value,
            } => write!(f, "non-finite {field} value at index {index}: {value}"),
            Self::ZeroScale { index } => {
                write!(f, "scale factor at index {index} is zero")
            }
            Self::InvalidThreshold(t) => write!(f, "threshold {t} not in [0, 1]"),
            Self::FeatureNameMismatch {
                index,
                expected,
                got,
            } => write!(
                f,
                "feature name mismatch at slot {index}: expected {expected:?}, got {got:?}"
            ),
            Self::ParseJson(e) => write!(f, "artifact JSON parse error: {e}"),
            Self::Io(e) => write!(f, "artifact file IO error: {e}"),
        }
    }
}

impl std::error::Error for ArtifactError {}

/// Artifacts that carry feature names must agree with the slot order the
/// assembler produces; a renamed slot means the artifact was fitted against
/// a different feature set and padding would silently bias predictions.
fn check_feature_names(names: &[String]) -> Result<(), ArtifactError> {
    if names.is_empty() {
        return Ok(());
    }
    if names.len() != FEATURE_COUNT {
        return Err(ArtifactError::DimensionMismatch {
            field: "feature_names",
            expected: FEATURE_COUNT,
            got: names.len(),
        });
    }
    for (i, (got, expected)) in names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
        if got != expected {
            return Err(ArtifactError::FeatureNameMismatch {
                index: i,
                expected: (*expected).to_string(),
                got: got.clone(),
            });
        }
    }
    Ok(())
}

/// Scaler + classifier pair behind one immutable handle. Loaded once at
/// startup; `assess` is the whole per-request pipeline.
#[derive(Debug, Clone)]
pub struct Predictor {
    scaler: FeatureScaler,
    model: FraudModel,
}

impl Predictor {
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ArtifactError> {
        let scaler = FeatureScaler::from_file(scaler_path)?;
        let model = FraudModel::from_file(model_path)?;
        Ok(Self { scaler, model })
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        scaler: FeatureScaler,
        model: FraudModel,
    ) -> Result<Self, ArtifactError> {
        scaler.validate()?;
        model.validate()?;
        Ok(Self { scaler, model })
    }

    pub fn model_id(&self) -> &str {
        &self.model.model_id
    }

    pub fn model_version(&self) -> &str {
        &self.model.model_version
    }

    pub fn threshold(&self) -> f64 {
        self.model.threshold
    }

    /// Assemble, scale, classify one transaction. Confidence is reported
    /// relative to the predicted class.
    pub fn assess(&self, input: &TransactionInput) -> FraudAssessment {
        let vector = FeatureVector::from_input(input);
        let scaled = self.scaler.transform(&vector.values);

        let label = self.model.predict(&scaled);
        let [legit, fraud] = self.model.predict_probability(&scaled);

        let confidence = match label {
            FraudLabel::Fraudulent => fraud * 100.0,
            FraudLabel::Legitimate => legit * 100.0,
        };

        FraudAssessment {
            label,
            fraud_probability: fraud,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::model::tests::bias_only_model;
    use super::*;
    use crate::types::YesNo;
    use std::path::PathBuf;

    fn sample_input() -> TransactionInput {
        TransactionInput {
            distance_from_home: 10.0,
            distance_from_last_transaction: 5.0,
            ratio_to_median_purchase_price: 1.0,
            repeat_retailer: YesNo::No,
            used_chip: YesNo::Yes,
            used_pin_number: YesNo::No,
            online_order: YesNo::No,
        }
    }

    fn bias_only_predictor(bias: f64) -> Predictor {
        Predictor::with_parts(FeatureScaler::identity(), bias_only_model(bias)).unwrap()
    }

    #[test]
    fn fraud_verdict_reports_fraud_probability() {
        // sigmoid(ln(11.5)) = 0.92
        let predictor = bias_only_predictor(2.442347);
        let assessment = predictor.assess(&sample_input());

        assert_eq!(assessment.label, FraudLabel::Fraudulent);
        assert!((assessment.fraud_probability - 0.92).abs() < 1e-6);
        assert_eq!(assessment.confidence_display(), "92.00%");
        assert_eq!(
            assessment.message(),
            "Warning: This transaction is likely fraudulent!"
        );
    }

    #[test]
    fn legitimate_verdict_reports_complement_probability() {
        // sigmoid(-ln(9)) = 0.10
        let predictor = bias_only_predictor(-2.1972246);
        let assessment = predictor.assess(&sample_input());

        assert_eq!(assessment.label, FraudLabel::Legitimate);
        assert!((assessment.fraud_probability - 0.10).abs() < 1e-6);
        assert_eq!(assessment.confidence_display(), "90.00%");
        assert_eq!(assessment.message(), "This transaction is NOT fraudulent.");
    }

    #[test]
    fn confidence_tracks_the_predicted_class() {
        for bias in [-4.0, -1.0, -0.2, 0.0, 0.2, 1.0, 4.0] {
            let predictor = bias_only_predictor(bias);
            let assessment = predictor.assess(&sample_input());
            assert!(
                assessment.confidence >= 50.0,
                "confidence {} below 50% at bias {}",
                assessment.confidence,
                bias
            );
            assert!(assessment.confidence <= 100.0);
        }
    }

    #[test]
    fn assessment_is_deterministic() {
        let predictor = bias_only_predictor(0.3);
        let input = sample_input();
        let first = predictor.assess(&input);
        for _ in 0..10 {
            let again = predictor.assess(&input);
            assert_eq!(again.label, first.label);
            assert_eq!(again.fraud_probability, first.fraud_probability);
            assert_eq!(again.confidence, first.confidence);
        }
    }

    #[test]
    fn shipped_artifacts_load_and_separate_inputs() {
        let models = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models");
        let predictor = Predictor::load(
            &models.join("fraud_model.json"),
            &models.join("fraud_scaler.json"),
        )
        .unwrap();

        assert_eq!(predictor.model_id(), "cardwatch-lr-2024-11");

        let routine = predictor.assess(&sample_input());
        assert_eq!(routine.label, FraudLabel::Legitimate);

        let risky = TransactionInput {
            distance_from_home: 80.0,
            distance_from_last_transaction: 60.0,
            ratio_to_median_purchase_price: 8.0,
            repeat_retailer: YesNo::No,
            used_chip: YesNo::No,
            used_pin_number: YesNo::No,
            online_order: YesNo::Yes,
        };
        let flagged = predictor.assess(&risky);
        assert_eq!(flagged.label, FraudLabel::Fraudulent);
        assert!(flagged.confidence >= 50.0);
    }

    #[test]
    fn with_parts_rejects_invalid_artifacts() {
        let mut scaler = FeatureScaler::identity();
        scaler.scale[0] = 0.0;
        assert!(Predictor::with_parts(scaler, bias_only_model(0.0)).is_err());
    }
}
