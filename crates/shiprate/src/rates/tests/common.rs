use std::sync::Arc;

use serde_json::{json, Value};

use crate::rates::{
    decode_rules_value, CalcType, CartContext, Destination, LineItem, MethodConfiguration,
    MethodRegistry, MethodSettings, Package, QuoteState, RateEngine, Rule, WeightRounding,
    WeightUnit,
};

pub(super) fn rule(record: Value) -> Rule {
    let mut rules = decode_rules_value(&json!([record]));
    assert_eq!(rules.len(), 1, "fixture decodes to one rule");
    rules.remove(0)
}

pub(super) fn universal_rule() -> Rule {
    rule(json!({ "name": "catch-all", "base": 25 }))
}

pub(super) fn context(weight_kg: f64, subtotal: f64, item_qty: u64) -> CartContext {
    CartContext::new(weight_kg, subtotal, item_qty)
}

pub(super) fn config(calc_type: CalcType) -> MethodConfiguration {
    MethodConfiguration {
        instance_id: 4,
        title: "Standard Courier".to_string(),
        calc_type,
        ..MethodConfiguration::default()
    }
}

pub(super) fn engine(calc_type: CalcType, records: Value) -> RateEngine {
    RateEngine::new(config(calc_type), decode_rules_value(&records))
}

/// Three flat-rate tiers that all match a 1 kg cart: 50, 30 and 80.
pub(super) fn overlapping_tiers() -> Value {
    json!([
        { "name": "regional", "base": 50 },
        { "name": "economy", "base": 30, "max_weight": 5 },
        { "name": "express", "base": 80, "min_qty": 1 }
    ])
}

pub(super) fn courier_settings() -> MethodSettings {
    MethodSettings {
        instance_id: 4,
        title: "Standard Courier".to_string(),
        handling_fee: 10.0,
        free_shipping_threshold: 500.0,
        calc_type: "cheapest".to_string(),
        weight_rounding: "ceil".to_string(),
        rules: json!(
            r#"[
                {"name": "light", "max_weight": "2", "base": "40"},
                {"name": "heavy", "min_weight": "2.0001", "base": 40, "per_kg": 15},
                {"name": "delhi", "states": ["dl"], "postcodes": ["^11"], "base": 30}
            ]"#
        ),
        ..MethodSettings::default()
    }
}

pub(super) fn quote_state() -> QuoteState {
    let registry =
        MethodRegistry::from_settings(vec![courier_settings()]).expect("registry builds");
    QuoteState {
        registry: Arc::new(registry),
        weight_unit: WeightUnit::Kg,
    }
}

pub(super) fn package(weight: f64, line_subtotal: f64, state: &str, postcode: &str) -> Package {
    Package {
        contents: vec![LineItem {
            quantity: 1,
            line_subtotal,
            weight: Some(weight),
            ..LineItem::default()
        }],
        destination: Destination {
            state: state.to_string(),
            postcode: postcode.to_string(),
        },
    }
}

pub(super) fn rounding_config(weight_rounding: WeightRounding) -> MethodConfiguration {
    MethodConfiguration {
        weight_rounding,
        ..config(CalcType::Cheapest)
    }
}
