use std::collections::BTreeMap;

/// Built-in rotation weights; a higher weight makes a position rotate faster.
pub const DEFAULT_POSITION_WEIGHTS: [(&str, f64); 9] = [
    ("Maschinist", 3.0),
    ("Staffelführer", 2.0),
    ("Gruppenführer", 2.0),
    ("Truppführer", 1.5),
    ("Angriffstrupp", 1.0),
    ("Wassertrupp", 1.0),
    ("Schlauchtrupp", 1.0),
    ("Sicherheitstrupp", 1.0),
    ("Melder", 1.0),
];

const FALLBACK_WEIGHT: f64 = 1.0;

/// Configured weight, then built-in default, then 1.0. Non-positive or non-finite
/// configured values are ignored.
pub fn position_weight(position: &str, configured: &BTreeMap<String, f64>) -> f64 {
    if let Some(weight) = configured
        .get(position)
        .copied()
        .filter(|weight| weight.is_finite() && *weight > 0.0)
    {
        return weight;
    }

    DEFAULT_POSITION_WEIGHTS
        .iter()
        .find(|(name, _)| *name == position)
        .map(|(_, weight)| *weight)
        .unwrap_or(FALLBACK_WEIGHT)
}
