use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::CartContext;
use super::cost::candidate_cost;
use super::decode::{decode_rules, decode_rules_value};
use super::matcher::{first_failure, Predicate};
use super::method::{MethodConfiguration, MethodSettings, TaxStatus};
use super::rule::Rule;

/// Shipping rate handed back to checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: String,
    pub label: String,
    pub cost: f64,
    pub tax_status: TaxStatus,
}

/// Cost contributed by one matching rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub rule_index: usize,
    pub rule_name: String,
    pub cost: f64,
}

/// Rule that did not apply, with the first predicate it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub rule_index: usize,
    pub rule_name: String,
    pub predicate: Predicate,
}

/// Full trail of one rate calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    /// Subtotal reached the free-shipping threshold; rules were not consulted.
    FreeShipping { rate: Rate },
    NoRules,
    NoMatch { rejections: Vec<Rejection> },
    Rated {
        rate: Rate,
        candidates: Vec<Candidate>,
        aggregate: f64,
        handling_fee: f64,
        rejections: Vec<Rejection>,
    },
}

impl Evaluation {
    pub fn rate(&self) -> Option<&Rate> {
        match self {
            Evaluation::FreeShipping { rate } | Evaluation::Rated { rate, .. } => Some(rate),
            Evaluation::NoRules | Evaluation::NoMatch { .. } => None,
        }
    }

    pub fn into_rate(self) -> Option<Rate> {
        match self {
            Evaluation::FreeShipping { rate } | Evaluation::Rated { rate, .. } => Some(rate),
            Evaluation::NoRules | Evaluation::NoMatch { .. } => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Evaluation::FreeShipping { rate } => format!("{}: free shipping", rate.label),
            Evaluation::NoRules => "no rules configured".to_string(),
            Evaluation::NoMatch { rejections } => {
                format!("no rule matched ({} rejected)", rejections.len())
            }
            Evaluation::Rated {
                rate, candidates, ..
            } => format!(
                "{}: {:.2} from {} matching rule(s)",
                rate.label,
                rate.cost,
                candidates.len()
            ),
        }
    }
}

/// Rate calculator for one method instance, holding its decoded rules.
///
/// Immutable once built, so one engine can serve concurrent checkouts.
#[derive(Debug, Clone)]
pub struct RateEngine {
    config: MethodConfiguration,
    rules: Vec<Rule>,
}

impl RateEngine {
    pub fn new(config: MethodConfiguration, rules: Vec<Rule>) -> Self {
        Self { config, rules }
    }

    pub fn from_settings(settings: &MethodSettings) -> Self {
        Self::new(settings.configuration(), decode_rules_value(&settings.rules))
    }

    pub fn config(&self) -> &MethodConfiguration {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn quote(&self, context: &CartContext) -> Option<Rate> {
        self.evaluate(context).into_rate()
    }

    pub fn evaluate(&self, context: &CartContext) -> Evaluation {
        if self.config.grants_free_shipping(context.subtotal) {
            debug!(
                subtotal = context.subtotal,
                threshold = self.config.free_shipping_threshold,
                "free shipping threshold reached"
            );
            return Evaluation::FreeShipping {
                rate: free_rate(&self.config),
            };
        }

        if self.rules.is_empty() {
            return Evaluation::NoRules;
        }

        let mut candidates = Vec::new();
        let mut rejections = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            match first_failure(rule, context) {
                Some(predicate) => {
                    debug!(
                        rule = %rule.display_name(index),
                        reason = predicate.label(),
                        "shipping rule skipped"
                    );
                    rejections.push(Rejection {
                        rule_index: index,
                        rule_name: rule.name.clone(),
                        predicate,
                    });
                }
                None => {
                    let cost = candidate_cost(rule, context, self.config.weight_rounding);
                    debug!(rule = %rule.display_name(index), cost, "shipping rule matched");
                    candidates.push(Candidate {
                        rule_index: index,
                        rule_name: rule.name.clone(),
                        cost,
                    });
                }
            }
        }

        let costs: Vec<f64> = candidates.iter().map(|candidate| candidate.cost).collect();
        let Some(aggregate) = self.config.calc_type.aggregate(&costs) else {
            return Evaluation::NoMatch { rejections };
        };

        let handling_fee = self.config.applied_handling_fee();
        let rate = Rate {
            id: self.config.rate_id(),
            label: self.config.title.clone(),
            cost: (aggregate + handling_fee).max(0.0),
            tax_status: self.config.tax_status,
        };

        Evaluation::Rated {
            rate,
            candidates,
            aggregate,
            handling_fee,
            rejections,
        }
    }
}

/// Compute the rate for one cart from a persisted rules blob.
///
/// Returns `None` when no rule applies; a malformed blob counts as no rules.
pub fn compute_rate(
    config: &MethodConfiguration,
    rules_blob: &str,
    context: &CartContext,
) -> Option<Rate> {
    if config.grants_free_shipping(context.subtotal) {
        return Some(free_rate(config));
    }

    RateEngine::new(config.clone(), decode_rules(rules_blob)).quote(context)
}

fn free_rate(config: &MethodConfiguration) -> Rate {
    Rate {
        id: config.rate_id(),
        label: config.title.clone(),
        cost: 0.0,
        tax_status: config.tax_status,
    }
}
