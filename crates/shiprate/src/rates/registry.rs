use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cost::WeightRounding;
use super::engine::RateEngine;
use super::method::{CalcType, MethodSettings};

/// Error raised while loading the method settings document.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read method settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("method settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("method instance {0} is configured more than once")]
    DuplicateInstance(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsDocument {
    Wrapped { methods: Vec<MethodSettings> },
    Bare(Vec<MethodSettings>),
}

/// Listing entry for a configured method instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub instance_id: u32,
    pub title: String,
    pub calc_type: CalcType,
    pub weight_rounding: WeightRounding,
    pub rule_count: usize,
}

/// Rate engines keyed by zone instance, each built once from its settings.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    engines: BTreeMap<u32, Arc<RateEngine>>,
}

impl MethodRegistry {
    pub fn from_settings(
        settings: impl IntoIterator<Item = MethodSettings>,
    ) -> Result<Self, SettingsError> {
        let mut engines = BTreeMap::new();
        for method in settings {
            if engines.contains_key(&method.instance_id) {
                return Err(SettingsError::DuplicateInstance(method.instance_id));
            }
            let engine = RateEngine::from_settings(&method);
            info!(
                instance_id = method.instance_id,
                title = %engine.config().title,
                rules = engine.rules().len(),
                "loaded shipping method"
            );
            engines.insert(method.instance_id, Arc::new(engine));
        }
        Ok(Self { engines })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SettingsError> {
        let methods = match serde_json::from_reader(reader)? {
            SettingsDocument::Wrapped { methods } | SettingsDocument::Bare(methods) => methods,
        };
        Self::from_settings(methods)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let file = File::open(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn get(&self, instance_id: u32) -> Option<Arc<RateEngine>> {
        self.engines.get(&instance_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn summaries(&self) -> Vec<MethodSummary> {
        self.engines
            .iter()
            .map(|(instance_id, engine)| MethodSummary {
                instance_id: *instance_id,
                title: engine.config().title.clone(),
                calc_type: engine.config().calc_type,
                weight_rounding: engine.config().weight_rounding,
                rule_count: engine.rules().len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(instance_id: u32, title: &str) -> MethodSettings {
        MethodSettings {
            instance_id,
            title: title.to_string(),
            ..MethodSettings::default()
        }
    }

    #[test]
    fn repeated_instance_aborts_the_load() {
        let err = MethodRegistry::from_settings([
            settings(1, "Courier"),
            settings(2, "Freight"),
            settings(1, "Courier again"),
        ])
        .expect_err("duplicate id");
        assert!(matches!(err, SettingsError::DuplicateInstance(1)));
    }

    #[test]
    fn summaries_follow_instance_id_order() {
        let registry =
            MethodRegistry::from_settings([settings(7, "Courier"), settings(3, "Freight")])
                .expect("loads");
        let titles: Vec<_> = registry.summaries().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, ["Freight", "Courier"]);
    }
}
