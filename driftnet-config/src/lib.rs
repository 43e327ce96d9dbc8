//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML file (optional), inline YAML snippets
//! (tests/CLI), then `DRIFTNET_`-prefixed environment variables. `${VAR}`
//! placeholders inside string values are expanded recursively before the
//! merged tree is deserialized into typed structs.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct DriftnetConfig {
    pub version: Option<String>,
    pub search: SearchConfig,
}

/// Raw search-API configuration as it appears on disk / in the environment.
///
/// `max_duration_secs` stays a string here on purpose: the value usually
/// arrives via `${VAR}` expansion and is parsed during [`SearchConfig::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_query_type")]
    pub query_type: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub max_duration_secs: String,
}

fn default_endpoint() -> String {
    "https://api.twitterapi.io/twitter/tweet/advanced_search".into()
}
fn default_query_type() -> String {
    "Latest".into()
}

/// Validated settings handed to the harvester. Constructing this is the
/// precondition gate: once you hold a `SearchSettings`, no configuration
/// error can occur downstream.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub query_type: String,
    pub api_key: String,
    pub max_duration: Duration,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("search API key is missing or unresolved")]
    MissingApiKey,
    #[error("max search duration is missing")]
    MissingDuration,
    #[error("max search duration {0:?} is not a number of seconds")]
    InvalidDuration(String),
}

impl SearchConfig {
    /// Check the hard preconditions and produce validated [`SearchSettings`].
    ///
    /// A value still containing `${` after expansion means the referenced
    /// environment variable was never set, so it counts as missing.
    pub fn validate(&self) -> Result<SearchSettings, SettingsError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() || api_key.contains("${") {
            return Err(SettingsError::MissingApiKey);
        }

        let raw_secs = self.max_duration_secs.trim();
        if raw_secs.is_empty() || raw_secs.contains("${") {
            return Err(SettingsError::MissingDuration);
        }
        let secs: u64 = raw_secs
            .parse()
            .map_err(|_| SettingsError::InvalidDuration(raw_secs.to_string()))?;

        Ok(SearchSettings {
            endpoint: self.endpoint.clone(),
            query_type: self.query_type.clone(),
            api_key: api_key.to_string(),
            max_duration: Duration::from_secs(secs),
        })
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct DriftnetConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DriftnetConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftnetConfigLoader {
    /// Start with sensible defaults: `DRIFTNET_` env overrides are always on.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("DRIFTNET").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use driftnet_config::DriftnetConfigLoader;
    ///
    /// let cfg = DriftnetConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "1"
    /// search:
    ///   api_key: "k"
    ///   max_duration_secs: "120"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("1"));
    /// assert_eq!(cfg.search.query_type, "Latest");
    /// ```
    pub fn load(self) -> Result<DriftnetConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Deserialize loosely first so `${VAR}` expansion can walk the tree.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: DriftnetConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}
