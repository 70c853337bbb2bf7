use serde::Serialize;

use super::context::CartContext;
use super::rule::{normalize_state, Rule};

/// Match predicates in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Weight,
    Subtotal,
    Quantity,
    ShippingClass,
    State,
    Postcode,
}

impl Predicate {
    pub fn label(self) -> &'static str {
        match self {
            Predicate::Weight => "weight outside bounds",
            Predicate::Subtotal => "subtotal outside bounds",
            Predicate::Quantity => "quantity outside bounds",
            Predicate::ShippingClass => "shipping class not in cart",
            Predicate::State => "destination state not listed",
            Predicate::Postcode => "destination postcode not matched",
        }
    }
}

/// Evaluate the predicates in order, returning the first one that fails.
pub fn first_failure(rule: &Rule, context: &CartContext) -> Option<Predicate> {
    if !rule.weight.contains(context.weight_kg) {
        return Some(Predicate::Weight);
    }

    if !rule.subtotal.contains(context.subtotal) {
        return Some(Predicate::Subtotal);
    }

    let quantity = i64::try_from(context.item_qty).unwrap_or(i64::MAX);
    if !rule.quantity.contains(quantity) {
        return Some(Predicate::Quantity);
    }

    if let Some(class) = &rule.shipping_class {
        if !context.has_shipping_class(class) {
            return Some(Predicate::ShippingClass);
        }
    }

    if !rule.states.is_empty() {
        let state = normalize_state(&context.destination_state);
        if !rule.states.iter().any(|candidate| *candidate == state) {
            return Some(Predicate::State);
        }
    }

    if !rule.postcodes.is_empty() {
        let postcode = context.destination_postcode.trim();
        if !rule
            .postcodes
            .iter()
            .any(|pattern| pattern.is_match(postcode))
        {
            return Some(Predicate::Postcode);
        }
    }

    None
}

pub fn matches(rule: &Rule, context: &CartContext) -> bool {
    first_failure(rule, context).is_none()
}
