use crate::types::TransactionInput;

pub const FEATURE_COUNT: usize = 10;

/// Slot order the artifacts were fitted against. Slots 7..9 are padding
/// the upstream training pipeline reserved; they stay at 0.0.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "distance_from_home",
    "distance_from_last_transaction",
    "ratio_to_median_purchase_price",
    "repeat_retailer",
    "used_chip",
    "used_pin_number",
    "online_order",
    "padding_1",
    "padding_2",
    "padding_3",
];

/// One transaction's features in artifact order. Built per request,
/// never shared or reused.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_input(input: &TransactionInput) -> Self {
        let mut values = [0.0f64; FEATURE_COUNT];

        values[0] = input.distance_from_home;
        values[1] = input.distance_from_last_transaction;
        values[2] = input.ratio_to_median_purchase_price;
        values[3] = input.repeat_retailer.as_feature();
        values[4] = input.used_chip.as_feature();
        values[5] = input.used_pin_number.as_feature();
        values[6] = input.online_order.as_feature();
        // values[7..10] stay 0.0 (padding)

        Self { values }
    }
}
