use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Read-only facts about one checkout's cart and destination.
///
/// Deserialized contexts pass through [`CartContext::new`], so measurements are always
/// rounded and floored at zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "CartFacts")]
pub struct CartContext {
    /// Total physical weight in kilograms, 4 dp, never negative.
    pub weight_kg: f64,
    /// Ex-tax line subtotal sum, 2 dp, never negative.
    pub subtotal: f64,
    pub item_qty: u64,
    #[serde(default)]
    pub shipping_classes: BTreeSet<String>,
    #[serde(default)]
    pub destination_state: String,
    #[serde(default)]
    pub destination_postcode: String,
}

impl CartContext {
    pub fn new(weight_kg: f64, subtotal: f64, item_qty: u64) -> Self {
        Self {
            weight_kg: round_to(weight_kg, 4).max(0.0),
            subtotal: round_to(subtotal, 2).max(0.0),
            item_qty,
            ..Self::default()
        }
    }

    pub fn with_shipping_class(mut self, class: impl Into<String>) -> Self {
        self.shipping_classes.insert(class.into());
        self
    }

    pub fn with_destination(mut self, state: impl Into<String>, postcode: impl Into<String>) -> Self {
        self.destination_state = state.into();
        self.destination_postcode = postcode.into();
        self
    }

    pub fn has_shipping_class(&self, class: &str) -> bool {
        self.shipping_classes.contains(class)
    }
}

#[derive(Deserialize)]
struct CartFacts {
    weight_kg: f64,
    subtotal: f64,
    item_qty: u64,
    #[serde(default)]
    shipping_classes: BTreeSet<String>,
    #[serde(default)]
    destination_state: String,
    #[serde(default)]
    destination_postcode: String,
}

impl From<CartFacts> for CartContext {
    fn from(facts: CartFacts) -> Self {
        Self {
            shipping_classes: facts.shipping_classes,
            destination_state: facts.destination_state,
            destination_postcode: facts.destination_postcode,
            ..Self::new(facts.weight_kg, facts.subtotal, facts.item_qty)
        }
    }
}

const SIGNIFICANT_DIGITS: i32 = 15;

/// Half-away-from-zero rounding to `places` decimals.
///
/// The scaled value is first cut to 15 significant digits so that decimal halves stored
/// inexactly in binary (`1.005` is `1.00499...`) still round up.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled == 0.0 {
        return value;
    }

    let magnitude = scaled.abs().log10().floor() as i32 + 1;
    let precision = SIGNIFICANT_DIGITS - magnitude;
    let scaled = if precision > 0 {
        let pre = 10_f64.powi(precision);
        (scaled * pre).round() / pre
    } else {
        scaled
    };
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rounds_and_floors_measurements() {
        let context = CartContext::new(1.234_56, 19.999, 3);
        assert_eq!(context.weight_kg, 1.2346);
        assert_eq!(context.subtotal, 20.0);

        let negative = CartContext::new(-0.5, -10.0, 0);
        assert_eq!(negative.weight_kg, 0.0);
        assert_eq!(negative.subtotal, 0.0);
    }

    #[test]
    fn decimal_halves_round_up() {
        let subtotals = [(1.005, 1.01), (1.015, 1.02), (2.675, 2.68), (0.125, 0.13)];
        for (raw, expected) in subtotals {
            assert_eq!(CartContext::new(0.0, raw, 0).subtotal, expected, "{raw}");
        }

        assert_eq!(CartContext::new(1.000_05, 0.0, 0).weight_kg, 1.0001);
        assert_eq!(CartContext::new(0.123_45, 0.0, 0).weight_kg, 0.1235);
        assert_eq!(round_to(-1.005, 2), -1.01);
    }

    #[test]
    fn deserialized_measurements_are_normalized() {
        let context: CartContext = serde_json::from_str(
            r#"{"weight_kg": -3.0, "subtotal": 1.005, "item_qty": 1, "destination_state": "DL"}"#,
        )
        .expect("context parses");
        assert_eq!(context.weight_kg, 0.0);
        assert_eq!(context.subtotal, 1.01);
        assert_eq!(context.destination_state, "DL");
    }

    #[test]
    fn deserializes_with_optional_destination() {
        let context: CartContext =
            serde_json::from_str(r#"{"weight_kg": 2.5, "subtotal": 40.0, "item_qty": 2}"#)
                .expect("context parses");
        assert!(context.shipping_classes.is_empty());
        assert_eq!(context.destination_state, "");
    }
}
