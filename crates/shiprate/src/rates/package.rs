use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::{round_to, CartContext};

/// Store weight unit that product weights are recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    G,
    Lbs,
    Oz,
}

impl WeightUnit {
    pub fn to_kg(self, weight: f64) -> f64 {
        match self {
            WeightUnit::Kg => weight,
            WeightUnit::G => weight * 0.001,
            WeightUnit::Lbs => weight * 0.453_592,
            WeightUnit::Oz => weight * 0.028_349_5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::G => "g",
            WeightUnit::Lbs => "lbs",
            WeightUnit::Oz => "oz",
        }
    }
}

impl FromStr for WeightUnit {
    type Err = UnknownWeightUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            "lbs" | "lb" => Ok(Self::Lbs),
            "oz" => Ok(Self::Oz),
            _ => Err(UnknownWeightUnit(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weight unit '{0}' (expected kg, g, lbs or oz)")]
pub struct UnknownWeightUnit(pub String);

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cart line as reported by the checkout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// Ex-tax, pre-coupon line subtotal.
    #[serde(default)]
    pub line_subtotal: f64,
    /// Unit weight in the store's weight unit.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default)]
    pub shipping_class: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
}

/// Cart contents bound for one destination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub contents: Vec<LineItem>,
    #[serde(default)]
    pub destination: Destination,
}

impl CartContext {
    /// Summarize a package. Virtual lines add no weight but still count toward
    /// subtotal, quantity and shipping classes.
    pub fn from_package(package: &Package, unit: WeightUnit) -> Self {
        let mut weight_kg = 0.0;
        let mut subtotal = 0.0;
        let mut item_qty: i64 = 0;
        let mut context = CartContext::default();

        for item in &package.contents {
            subtotal += item.line_subtotal;
            item_qty = item_qty.saturating_add(item.quantity);

            if let Some(class) = item
                .shipping_class
                .as_deref()
                .filter(|class| !class.is_empty())
            {
                context.shipping_classes.insert(class.to_string());
            }

            if item.is_virtual {
                continue;
            }
            let weight = item.weight.unwrap_or(0.0);
            if weight > 0.0 && item.quantity > 0 {
                weight_kg += unit.to_kg(weight) * item.quantity as f64;
            }
        }

        context.weight_kg = round_to(weight_kg, 4).max(0.0);
        context.subtotal = round_to(subtotal, 2).max(0.0);
        context.item_qty = item_qty.max(0) as u64;
        context.destination_state = package.destination.state.clone();
        context.destination_postcode = package.destination.postcode.clone();
        context
    }
}
