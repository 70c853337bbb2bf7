use serde::{Deserialize, Serialize};

use super::context::CartContext;
use super::rule::Rule;

/// How cart weight is rounded before it feeds the per-kg charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRounding {
    #[default]
    None,
    Ceil,
    Floor,
}

impl WeightRounding {
    /// Unknown stored values fall back to exact weight.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ceil" => Self::Ceil,
            "floor" => Self::Floor,
            _ => Self::None,
        }
    }

    pub fn apply(self, weight_kg: f64) -> f64 {
        match self {
            WeightRounding::None => weight_kg,
            WeightRounding::Ceil => weight_kg.ceil(),
            WeightRounding::Floor => weight_kg.floor(),
        }
    }
}

/// Candidate cost of one matching rule, never negative.
///
/// Only the per-kg term sees the rounded weight.
pub fn candidate_cost(rule: &Rule, context: &CartContext, rounding: WeightRounding) -> f64 {
    let weight = rounding.apply(context.weight_kg);
    let percentage = if rule.percent > 0.0 {
        rule.percent * context.subtotal / 100.0
    } else {
        0.0
    };

    (rule.base + rule.per_kg * weight + percentage).max(0.0)
}
