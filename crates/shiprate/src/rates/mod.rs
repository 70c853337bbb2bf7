//! Tiered shipping rates: rule decoding, matching, cost aggregation and quoting.
//!
//! Rules are decoded leniently from whatever the host persisted, matched against a
//! cart summary, and the matching candidates are folded into at most one rate.

pub mod context;
pub mod cost;
pub mod decode;
pub mod engine;
pub mod import;
pub mod matcher;
pub mod method;
pub mod package;
pub mod registry;
pub mod router;
pub mod rule;

#[cfg(test)]
mod tests;

pub use context::CartContext;
pub use cost::{candidate_cost, WeightRounding};
pub use decode::{decode_rules, decode_rules_value, DecodeReport, RuleIssue};
pub use engine::{compute_rate, Candidate, Evaluation, Rate, RateEngine, Rejection};
pub use import::{read_line_items, ImportError};
pub use matcher::{first_failure, matches, Predicate};
pub use method::{CalcType, MethodConfiguration, MethodSettings, TaxStatus, METHOD_ID};
pub use package::{Destination, LineItem, Package, UnknownWeightUnit, WeightUnit};
pub use registry::{MethodRegistry, MethodSummary, SettingsError};
pub use router::{quote_router, AdHocQuoteRequest, QuoteResponse, QuoteState};
pub use rule::{Bounds, PostcodePattern, Rule};
