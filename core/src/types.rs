use serde::{Deserialize, Serialize};

// ============================================================================
// FORM INPUTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_feature(self) -> f64 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub distance_from_home: f64,
    pub distance_from_last_transaction: f64,
    pub ratio_to_median_purchase_price: f64,
    pub repeat_retailer: YesNo,
    pub used_chip: YesNo,
    pub used_pin_number: YesNo,
    pub online_order: YesNo,
}

// ============================================================================
// VERDICTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FraudLabel {
    Legitimate,
    Fraudulent,
}

impl FraudLabel {
    pub fn as_u8(self) -> u8 {
        match self {
            FraudLabel::Legitimate => 0,
            FraudLabel::Fraudulent => 1,
        }
    }

    pub fn is_fraud(self) -> bool {
        matches!(self, FraudLabel::Fraudulent)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FraudAssessment {
    pub label: FraudLabel,
    pub fraud_probability: f64,
    pub confidence: f64,
}

impl FraudAssessment {
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.confidence)
    }

    pub fn verdict_label(&self) -> &'static str {
        match self.label {
            FraudLabel::Legitimate => "legitimate",
            FraudLabel::Fraudulent => "fraudulent",
        }
    }

    pub fn message(&self) -> &'static str {
        match self.label {
            FraudLabel::Legitimate => "This transaction is NOT fraudulent.",
            FraudLabel::Fraudulent => "Warning: This transaction is likely fraudulent!",
        }
    }
}
