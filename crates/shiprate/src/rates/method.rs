use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::cost::WeightRounding;

/// Identifier prefix of every rate this method produces.
pub const METHOD_ID: &str = "tiered_shipping";
pub const DEFAULT_TITLE: &str = "Weight Based Shipping";

/// Policy for combining the candidate costs of several matching rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcType {
    #[default]
    Cheapest,
    Highest,
    Sum,
}

impl CalcType {
    /// Unknown stored values fall back to cheapest.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "highest" => Self::Highest,
            "sum" => Self::Sum,
            _ => Self::Cheapest,
        }
    }

    /// `None` for an empty candidate list.
    pub fn aggregate(self, candidates: &[f64]) -> Option<f64> {
        if candidates.is_empty() {
            return None;
        }

        let value = match self {
            CalcType::Cheapest => candidates.iter().copied().fold(f64::INFINITY, f64::min),
            CalcType::Highest => candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CalcType::Sum => candidates.iter().sum(),
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxStatus {
    #[default]
    Taxable,
    None,
}

impl TaxStatus {
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("none") {
            Self::None
        } else {
            Self::Taxable
        }
    }
}

/// Per zone-instance settings, fixed for the duration of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodConfiguration {
    pub instance_id: u32,
    pub title: String,
    pub tax_status: TaxStatus,
    /// Subtotal at or above which shipping is free; zero disables.
    pub free_shipping_threshold: f64,
    pub handling_fee: f64,
    pub calc_type: CalcType,
    pub weight_rounding: WeightRounding,
}

impl Default for MethodConfiguration {
    fn default() -> Self {
        Self {
            instance_id: 0,
            title: DEFAULT_TITLE.to_string(),
            tax_status: TaxStatus::default(),
            free_shipping_threshold: 0.0,
            handling_fee: 0.0,
            calc_type: CalcType::default(),
            weight_rounding: WeightRounding::default(),
        }
    }
}

impl MethodConfiguration {
    pub fn rate_id(&self) -> String {
        format!("{METHOD_ID}:{}", self.instance_id)
    }

    pub fn grants_free_shipping(&self, subtotal: f64) -> bool {
        self.free_shipping_threshold > 0.0 && subtotal >= self.free_shipping_threshold
    }

    pub fn applied_handling_fee(&self) -> f64 {
        self.handling_fee.max(0.0)
    }
}

/// Method settings as persisted by the host platform.
///
/// Scalars may be stored as strings or numbers; anything unparseable takes the
/// neutral default instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSettings {
    #[serde(default, deserialize_with = "lenient_instance_id")]
    pub instance_id: u32,
    #[serde(default = "default_title", deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tax_status: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub free_shipping_threshold: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub handling_fee: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub calc_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub weight_rounding: String,
    /// Stored rules: either the JSON text blob or an inline list.
    #[serde(default, alias = "rules_json")]
    pub rules: Value,
}

impl Default for MethodSettings {
    fn default() -> Self {
        Self {
            instance_id: 0,
            title: default_title(),
            tax_status: String::new(),
            free_shipping_threshold: 0.0,
            handling_fee: 0.0,
            calc_type: String::new(),
            weight_rounding: String::new(),
            rules: Value::Null,
        }
    }
}

impl MethodSettings {
    pub fn configuration(&self) -> MethodConfiguration {
        let title = if self.title.trim().is_empty() {
            default_title()
        } else {
            self.title.clone()
        };

        MethodConfiguration {
            instance_id: self.instance_id,
            title,
            tax_status: TaxStatus::from_setting(&self.tax_status),
            free_shipping_threshold: self.free_shipping_threshold,
            handling_fee: self.handling_fee,
            calc_type: CalcType::from_setting(&self.calc_type),
            weight_rounding: WeightRounding::from_setting(&self.weight_rounding),
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let amount = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(amount.filter(|amount| amount.is_finite()).unwrap_or(0.0))
}

fn lenient_instance_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = match &value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(id.and_then(|id| u32::try_from(id).ok()).unwrap_or(0))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}
