//! Application configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `chrysalis.ron` file (if exists), or the file passed with `--config`
//! 3. Environment variables prefixed with `CHRYSALIS_`
//!
//! Example environment variable: `CHRYSALIS_SELECTOR__REPETITION_PENALTY=0.5`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrysalis_engine::{BookkeepingKeys, EngineSettings, SelectorTuning, TraitWeights};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChrysalisConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub selector: SelectorTuning,

    #[serde(default)]
    pub traits: TraitsConfig,

    #[serde(default)]
    pub breeding: BreedingConfig,

    #[serde(default)]
    pub hatching: HatchingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// RON or JSON catalog file
    pub path: PathBuf,
    /// Minimum seconds between modification-time checks when watching
    pub reload_interval_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/catalog.ron"),
            reload_interval_secs: 2,
        }
    }
}

impl CatalogConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }
}

/// One row of the trait weight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitWeightEntry {
    pub name: String,
    pub weight: f64,
}

/// Trait naming and weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitsConfig {
    /// Weight table; empty means the built-in table
    pub weights: Vec<TraitWeightEntry>,
    /// Names of the traits written by the engines
    pub keys: BookkeepingKeys,
    /// Trait holding a sprite's dominant color name
    pub color_trait: Option<String>,
}

impl Default for TraitsConfig {
    fn default() -> Self {
        Self {
            weights: Vec::new(),
            keys: BookkeepingKeys::default(),
            color_trait: Some("Couleur".to_string()),
        }
    }
}

impl TraitsConfig {
    pub fn trait_weights(&self) -> TraitWeights {
        if self.weights.is_empty() {
            return TraitWeights::default();
        }
        TraitWeights::new(
            self.weights
                .iter()
                .map(|entry| (entry.name.clone(), entry.weight)),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    /// Number of cosmetic egg assets
    pub asset_pool_size: u32,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self { asset_pool_size: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchingConfig {
    /// Family for eggs without a family hint
    pub default_family: Option<String>,
    /// Options offered per hatch
    pub candidates: usize,
}

impl Default for HatchingConfig {
    fn default() -> Self {
        Self {
            default_family: None,
            candidates: chrysalis_engine::DEFAULT_HATCH_OPTIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log at debug level instead of info
    pub verbose: bool,
}

impl ChrysalisConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path` if given (must exist), otherwise `chrysalis.ron` (optional)
    /// 3. Environment variables prefixed with `CHRYSALIS_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            Environment::with_prefix("CHRYSALIS")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("chrysalis")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults for the scalar settings
            .set_default("catalog.path", "data/catalog.ron")?
            .set_default("catalog.reload_interval_secs", 2_i64)?
            .set_default("selector.continuity_bonus", 1.3)?
            .set_default("selector.repetition_penalty", 0.4)?
            .set_default("selector.noise_amplitude", 0.1)?
            .set_default("selector.score_floor", 0.01)?
            .set_default("selector.color_weight", 0.0)?
            .set_default("breeding.asset_pool_size", 8_i64)?
            .set_default("hatching.candidates", 3_i64)?
            .set_default("logging.verbose", false)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (CHRYSALIS_SELECTOR__NOISE_AMPLITUDE, etc.)
            .add_source(env);

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Engine settings derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            selector: self.selector,
            trait_weights: self.traits.trait_weights(),
            keys: self.traits.keys.clone(),
            color_trait: self.traits.color_trait.clone(),
            default_hatch_family: self.hatching.default_family.clone(),
            hatch_options: self.hatching.candidates,
            egg_asset_pool: self.breeding.asset_pool_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Environment {
        Environment::with_prefix("CHRYSALIS")
            .separator("__")
            .try_parsing(true)
            .source(Some(config::Map::new()))
    }

    #[test]
    fn test_default_config() {
        let config = ChrysalisConfig::default();
        assert_eq!(config.catalog.path, PathBuf::from("data/catalog.ron"));
        assert_eq!(config.selector.continuity_bonus, 1.3);
        assert_eq!(config.breeding.asset_pool_size, 8);
        assert_eq!(config.hatching.candidates, 3);
        assert!(!config.logging.verbose);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let config = ChrysalisConfig::load_with_env(None, no_env()).expect("Failed to load config");
        assert_eq!(config, ChrysalisConfig::default());
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(
            file,
            r#"(
                selector: (repetition_penalty: 0.25),
                traits: (weights: [(name: "Taille", weight: 3.0), (name: "Forme", weight: 1.0)]),
                hatching: (default_family: "moth"),
            )"#
        )
        .unwrap();

        let config = ChrysalisConfig::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(config.selector.repetition_penalty, 0.25);
        assert_eq!(config.selector.continuity_bonus, 1.3);
        assert_eq!(config.hatching.default_family.as_deref(), Some("moth"));

        let weights = config.traits.trait_weights();
        assert_eq!(weights.len(), 2);
        assert!((weights.weight("Taille").unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_env_layer_overrides_file() {
        let env = Environment::with_prefix("CHRYSALIS")
            .separator("__")
            .try_parsing(true)
            .source(Some(
                [
                    ("CHRYSALIS_SELECTOR__NOISE_AMPLITUDE".to_string(), "0.2".to_string()),
                    ("CHRYSALIS_BREEDING__ASSET_POOL_SIZE".to_string(), "12".to_string()),
                ]
                .into_iter()
                .collect(),
            ));

        let config = ChrysalisConfig::load_with_env(None, env).unwrap();
        assert_eq!(config.selector.noise_amplitude, 0.2);
        assert_eq!(config.breeding.asset_pool_size, 12);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ron");
        assert!(ChrysalisConfig::load_with_env(Some(&missing), no_env()).is_err());
    }

    #[test]
    fn test_engine_settings_mapping() {
        let mut config = ChrysalisConfig::default();
        config.breeding.asset_pool_size = 4;
        config.hatching.candidates = 5;
        let settings = config.engine_settings();
        assert_eq!(settings.egg_asset_pool, 4);
        assert_eq!(settings.hatch_options, 5);
        assert_eq!(settings.trait_weights, TraitWeights::default());
        assert_eq!(settings.color_trait.as_deref(), Some("Couleur"));
    }
}
