//! Loader for service configuration with YAML + environment overlays.
//!
//! Values come from an optional `leko.yaml` file merged with `LEKO_`-prefixed
//! environment variables (`LEKO_OPENAI__API_KEY` overrides `openai.api_key`).
//! `${VAR}` placeholders inside string values are expanded from the
//! environment before typed deserialisation, so secrets can stay out of the
//! file entirely.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct LekoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub freshness: FreshnessConfig,
    /// Shared secret guarding the command endpoints. Unset = open (dev mode).
    #[serde(default)]
    pub secret: Option<String>,
}

impl Default for LekoConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            openai: OpenAiConfig::default(),
            search: SearchConfig::default(),
            answer: AnswerConfig::default(),
            freshness: FreshnessConfig::default(),
            secret: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Completion provider settings, including the ordered model chain.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Missing key is tolerated at startup; `/ask` reports it per request.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    /// Models attempted in order until one answers.
    #[serde(default = "default_model_chain")]
    pub model_chain: Vec<String>,
    /// Cheap model used for the freshness judgement call.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_classifier_timeout")]
    pub classifier_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_openai_endpoint(),
            model_chain: default_model_chain(),
            classifier_model: default_classifier_model(),
            generation_timeout_secs: default_generation_timeout(),
            classifier_timeout_secs: default_classifier_timeout(),
        }
    }
}

/// Google Custom Search settings. Both credentials must be present for web
/// grounding to be active; otherwise the pipeline answers without it.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub engine_id: Option<String>,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_hl")]
    pub hl: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: default_search_endpoint(),
            result_count: default_result_count(),
            timeout_secs: default_search_timeout(),
            gl: default_gl(),
            hl: default_hl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerConfig {
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,
    #[serde(default = "default_max_answer_chars")]
    pub max_answer_chars: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_question_chars: default_max_question_chars(),
            max_answer_chars: default_max_answer_chars(),
        }
    }
}

/// Extra freshness markers merged into the built-in set, so deployments can
/// tune the fast path without a code change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FreshnessConfig {
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com".into()
}
fn default_model_chain() -> Vec<String> {
    vec!["gpt-4o".into(), "gpt-4o-mini".into()]
}
fn default_classifier_model() -> String {
    "gpt-4o-mini".into()
}
fn default_generation_timeout() -> u64 {
    15
}
fn default_classifier_timeout() -> u64 {
    5
}
fn default_search_endpoint() -> String {
    "https://www.googleapis.com".into()
}
fn default_result_count() -> u32 {
    5
}
fn default_search_timeout() -> u64 {
    8
}
fn default_gl() -> String {
    "tr".into()
}
fn default_hl() -> String {
    "tr".into()
}
fn default_max_question_chars() -> usize {
    600
}
fn default_max_answer_chars() -> usize {
    900
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
pub struct LekoConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for LekoConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LekoConfigLoader {
    /// Start with the defaults: `LEKO_` env overrides only. Attach a file
    /// with [`LekoConfigLoader::with_file`] when one exists; headless
    /// deployments can rely purely on environment variables.
    ///
    /// ```
    /// use leko_config::LekoConfigLoader;
    ///
    /// let cfg = LekoConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    /// assert_eq!(cfg.openai.model_chain, vec!["gpt-4o", "gpt-4o-mini"]);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("LEKO").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use leko_config::LekoConfigLoader;
    ///
    /// let cfg = LekoConfigLoader::new()
    ///     .with_yaml_str("search:\n  result_count: 3\n")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.search.result_count, 3);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// The loader combines YAML sources with `LEKO_`-prefixed environment
    /// variables and expands `${VAR}` placeholders before materialising the
    /// strongly typed struct.
    ///
    /// ```
    /// use leko_config::LekoConfigLoader;
    ///
    /// unsafe { std::env::set_var("EXAMPLE_OPENAI_KEY", "sk-from-env"); }
    ///
    /// let cfg = LekoConfigLoader::new()
    ///     .with_yaml_str("openai:\n  api_key: \"${EXAMPLE_OPENAI_KEY}\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    /// assert_eq!(cfg.openai.api_key.as_deref(), Some("sk-from-env"));
    ///
    /// unsafe { std::env::remove_var("EXAMPLE_OPENAI_KEY"); }
    /// ```
    pub fn load(self) -> Result<LekoConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so placeholders can be expanded
        // recursively, then deserialize into the typed config.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: LekoConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
