use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::rule::{normalize_state, shipping_class_filter, Bounds, PostcodePattern, Rule};

/// Problem recovered while decoding stored rules. None of these abort decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleIssue {
    MalformedDocument {
        message: String,
    },
    NotAList {
        found: &'static str,
    },
    NotARecord {
        index: usize,
        found: &'static str,
    },
    NonNumeric {
        index: usize,
        field: &'static str,
        value: String,
    },
    InvalidList {
        index: usize,
        field: &'static str,
        found: &'static str,
    },
    InvalidPattern {
        index: usize,
        pattern: String,
        message: String,
    },
    InvertedBounds {
        index: usize,
        field: &'static str,
    },
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleIssue::MalformedDocument { message } => {
                write!(f, "rules document is not valid JSON ({message}); no rules loaded")
            }
            RuleIssue::NotAList { found } => {
                write!(f, "rules document is {found}, expected a list; no rules loaded")
            }
            RuleIssue::NotARecord { index, found } => {
                write!(f, "rule #{} is {found}, expected an object; skipped", index + 1)
            }
            RuleIssue::NonNumeric {
                index,
                field,
                value,
            } => write!(
                f,
                "rule #{}: {field} value {value} is not numeric; treated as unset",
                index + 1
            ),
            RuleIssue::InvalidList {
                index,
                field,
                found,
            } => write!(
                f,
                "rule #{}: {field} is {found}, expected a list; filter ignored",
                index + 1
            ),
            RuleIssue::InvalidPattern {
                index,
                pattern,
                message,
            } => write!(
                f,
                "rule #{}: postcode pattern '{pattern}' never matches: {message}",
                index + 1
            ),
            RuleIssue::InvertedBounds { index, field } => write!(
                f,
                "rule #{}: minimum {field} exceeds maximum; rule can never match",
                index + 1
            ),
        }
    }
}

/// Decoded rules together with every issue recovered along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecodeReport {
    pub rules: Vec<Rule>,
    pub issues: Vec<RuleIssue>,
}

impl DecodeReport {
    /// Decode a persisted text blob. Blank text is an empty rule list.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => Self {
                rules: Vec::new(),
                issues: vec![RuleIssue::MalformedDocument {
                    message: err.to_string(),
                }],
            },
        }
    }

    /// Decode an already parsed document. A JSON string is treated as a text blob.
    pub fn from_value(value: &Value) -> Self {
        let entries = match value {
            Value::Null => return Self::default(),
            Value::String(text) => return Self::from_text(text),
            Value::Array(entries) => entries,
            other => {
                return Self {
                    rules: Vec::new(),
                    issues: vec![RuleIssue::NotAList {
                        found: kind_of(other),
                    }],
                }
            }
        };

        let mut report = Self::default();
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                Value::Object(record) => {
                    let rule = decode_record(index, record, &mut report.issues);
                    report.rules.push(rule);
                }
                other => report.issues.push(RuleIssue::NotARecord {
                    index,
                    found: kind_of(other),
                }),
            }
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn log_issues(&self) {
        for issue in &self.issues {
            warn!(%issue, "recovered malformed shipping rule data");
        }
    }
}

/// Lenient decode of a persisted rules blob; never fails.
pub fn decode_rules(raw: &str) -> Vec<Rule> {
    let report = DecodeReport::from_text(raw);
    report.log_issues();
    report.rules
}

/// Lenient decode of an already parsed rules document; never fails.
pub fn decode_rules_value(value: &Value) -> Vec<Rule> {
    let report = DecodeReport::from_value(value);
    report.log_issues();
    report.rules
}

fn decode_record(index: usize, record: &Map<String, Value>, issues: &mut Vec<RuleIssue>) -> Rule {
    let mut fields = FieldReader {
        index,
        record,
        issues: &mut *issues,
    };

    let weight = Bounds::new(fields.decimal("min_weight"), fields.decimal("max_weight"));
    let subtotal = Bounds::new(
        fields.decimal("min_subtotal"),
        fields.decimal("max_subtotal"),
    );
    let quantity = Bounds::new(fields.integer("min_qty"), fields.integer("max_qty"));

    let rule = Rule {
        name: fields.text("name"),
        weight,
        subtotal,
        quantity,
        shipping_class: shipping_class_filter(&fields.text("shipping_class")),
        base: fields.decimal("base").unwrap_or(0.0),
        per_kg: fields.decimal("per_kg").unwrap_or(0.0),
        percent: fields.decimal("percent").unwrap_or(0.0),
        states: fields
            .list("states")
            .into_iter()
            .filter_map(scalar_text)
            .map(|state| normalize_state(&state))
            .collect(),
        postcodes: fields.postcodes(),
    };

    for (field, inverted) in [
        ("weight", rule.weight.is_inverted()),
        ("subtotal", rule.subtotal.is_inverted()),
        ("quantity", rule.quantity.is_inverted()),
    ] {
        if inverted {
            issues.push(RuleIssue::InvertedBounds { index, field });
        }
    }

    rule
}

struct FieldReader<'r, 'i> {
    index: usize,
    record: &'r Map<String, Value>,
    issues: &'i mut Vec<RuleIssue>,
}

impl<'r, 'i> FieldReader<'r, 'i> {
    fn text(&self, field: &str) -> String {
        self.record
            .get(field)
            .and_then(scalar_text)
            .unwrap_or_default()
    }

    /// Unset when missing, null or blank; non-numeric values are reported and unset.
    fn decimal(&mut self, field: &'static str) -> Option<f64> {
        let record = self.record;
        let value = record.get(field)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Number(number) => number.as_f64(),
            Value::String(text) if text.trim().is_empty() => return None,
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed.filter(|number| number.is_finite()) {
            Some(number) => Some(number),
            None => {
                self.non_numeric(field, value);
                None
            }
        }
    }

    /// Integer bound; fractional input is truncated toward zero.
    fn integer(&mut self, field: &'static str) -> Option<i64> {
        let record = self.record;
        let value = record.get(field)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|n| n.is_finite()).map(|n| n as i64)),
            Value::String(text) if text.trim().is_empty() => return None,
            Value::String(text) => {
                let text = text.trim();
                text.parse::<i64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .map(|n| n as i64)
                })
            }
            _ => None,
        };

        if parsed.is_none() {
            self.non_numeric(field, value);
        }
        parsed
    }

    fn list(&mut self, field: &'static str) -> Vec<&'r Value> {
        let record = self.record;
        match record.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            // An empty string is how a cleared multi-select is stored.
            Some(Value::String(text)) if text.trim().is_empty() => Vec::new(),
            Some(other) => {
                self.issues.push(RuleIssue::InvalidList {
                    index: self.index,
                    field,
                    found: kind_of(other),
                });
                Vec::new()
            }
        }
    }

    fn postcodes(&mut self) -> Vec<PostcodePattern> {
        let index = self.index;
        let entries = self.list("postcodes");
        let mut patterns = Vec::with_capacity(entries.len());

        for entry in entries {
            let source = scalar_text(entry).unwrap_or_default();
            let pattern = PostcodePattern::compile(&source);
            if let Some(message) = pattern.error() {
                self.issues.push(RuleIssue::InvalidPattern {
                    index,
                    pattern: pattern.source().to_string(),
                    message: message.to_string(),
                });
            }
            patterns.push(pattern);
        }

        patterns
    }

    fn non_numeric(&mut self, field: &'static str, value: &Value) {
        self.issues.push(RuleIssue::NonNumeric {
            index: self.index,
            field,
            value: value.to_string(),
        });
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
