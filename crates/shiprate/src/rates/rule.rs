use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

/// Inclusive range where either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }

    /// True when both sides are set and the range is empty.
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

/// Destination postcode pattern, kept with its source text for diagnostics.
///
/// Patterns use `regex` syntax, which has no look-around or backreferences; PCRE patterns
/// relying on them fail to compile. A pattern that failed to compile is retained with no
/// regex so that the rule's postcode filter stays active but can never be satisfied by it.
#[derive(Debug, Clone)]
pub struct PostcodePattern {
    source: String,
    regex: Option<Regex>,
    error: Option<String>,
}

impl PostcodePattern {
    pub fn compile(source: &str) -> Self {
        let source = source.trim().to_string();
        if source.is_empty() {
            return Self {
                source,
                regex: None,
                error: Some("pattern is empty".to_string()),
            };
        }

        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Self {
                source,
                regex: Some(regex),
                error: None,
            },
            Err(err) => Self {
                source,
                regex: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile failure message, if the pattern is unusable.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    pub fn is_match(&self, postcode: &str) -> bool {
        self.regex
            .as_ref()
            .map(|regex| regex.is_match(postcode))
            .unwrap_or(false)
    }
}

impl PartialEq for PostcodePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.is_valid() == other.is_valid()
    }
}

impl Serialize for PostcodePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// One shipping tier: match predicates plus a cost formula.
///
/// Rules are only built by the decoder, which normalizes the loosely typed stored
/// records once so matching never has to re-interpret raw values.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rule {
    pub name: String,
    pub weight: Bounds<f64>,
    pub subtotal: Bounds<f64>,
    pub quantity: Bounds<i64>,
    /// `None` when the stored class was empty or the `any` sentinel.
    pub shipping_class: Option<String>,
    pub base: f64,
    pub per_kg: f64,
    pub percent: f64,
    /// Trimmed, upper-cased state codes.
    pub states: Vec<String>,
    pub postcodes: Vec<PostcodePattern>,
}

impl Rule {
    /// A rule with no filters matches every cart.
    pub fn is_universal(&self) -> bool {
        self.weight == Bounds::unbounded()
            && self.subtotal == Bounds::unbounded()
            && self.quantity == Bounds::unbounded()
            && self.shipping_class.is_none()
            && self.states.is_empty()
            && self.postcodes.is_empty()
    }

    /// Label used in logs and reports; falls back to the rule position.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("rule #{}", index + 1)
        } else {
            self.name.clone()
        }
    }
}

/// Shipping-class filter value that disables the filter.
pub const ANY_SHIPPING_CLASS: &str = "any";

pub(crate) fn shipping_class_filter(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY_SHIPPING_CLASS) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn normalize_state(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive_and_open_ended() {
        let bounds = Bounds::new(Some(0.5), Some(1.5));
        assert!(bounds.contains(0.5));
        assert!(bounds.contains(1.5));
        assert!(!bounds.contains(0.4999));
        assert!(!bounds.contains(1.5001));

        let open_max = Bounds::new(Some(2_i64), None);
        assert!(open_max.contains(i64::MAX));
        assert!(!open_max.contains(1));
    }

    #[test]
    fn inverted_bounds_are_detected() {
        assert!(Bounds::new(Some(5.0), Some(1.0)).is_inverted());
        assert!(!Bounds::new(Some(1.0), Some(1.0)).is_inverted());
        assert!(!Bounds::<f64>::new(None, Some(1.0)).is_inverted());
    }

    #[test]
    fn any_sentinel_disables_class_filter() {
        assert_eq!(shipping_class_filter(" ANY "), None);
        assert_eq!(shipping_class_filter(""), None);
        assert_eq!(shipping_class_filter(" bulky "), Some("bulky".to_string()));
    }

    #[test]
    fn invalid_pattern_is_kept_but_never_matches() {
        let pattern = PostcodePattern::compile("(11");
        assert!(pattern.error().is_some());
        assert!(!pattern.is_valid());
        assert!(!pattern.is_match("110001"));
    }

    #[test]
    fn patterns_are_case_insensitive_substring_searches() {
        let pattern = PostcodePattern::compile("sw1a");
        assert!(pattern.is_valid());
        assert!(pattern.is_match("London SW1A 1AA"));
        assert!(!pattern.is_match("SW2"));
    }

    #[test]
    fn look_around_patterns_are_reported_invalid() {
        for source in ["(?<=1)1", r"(1)\1"] {
            let pattern = PostcodePattern::compile(source);
            assert!(!pattern.is_valid(), "{source}");
            assert!(pattern.error().is_some(), "{source}");
            assert!(!pattern.is_match("110001"), "{source}");
        }
    }
}
