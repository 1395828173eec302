//! Engine settings shared by the evolution, breeding and hatching engines

use chrysalis_catalog::CatalogIndex;
use serde::{Deserialize, Serialize};

use crate::breeding::BreedingEngine;
use crate::color::ColorMatcher;
use crate::evolution::EvolutionEngine;
use crate::hatching::{DEFAULT_HATCH_OPTIONS, HatchingEngine};
use crate::selection::{FamilySelector, SelectorTuning};
use crate::similarity::TraitWeights;
use crate::BookkeepingKeys;

/// Everything tunable about the engines, in one serde-friendly value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub selector: SelectorTuning,
    pub trait_weights: TraitWeights,
    pub keys: BookkeepingKeys,
    /// Trait naming a sprite's dominant color, for color-profile matching
    pub color_trait: Option<String>,
    /// Family used to hatch eggs that carry no family hint
    pub default_hatch_family: Option<String>,
    pub hatch_options: usize,
    /// Number of cosmetic egg assets to pick from
    pub egg_asset_pool: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            selector: SelectorTuning::default(),
            trait_weights: TraitWeights::default(),
            keys: BookkeepingKeys::default(),
            color_trait: Some("Couleur".to_string()),
            default_hatch_family: None,
            hatch_options: DEFAULT_HATCH_OPTIONS,
            egg_asset_pool: 8,
        }
    }
}

impl EngineSettings {
    pub fn color_matcher(&self) -> ColorMatcher {
        ColorMatcher::new(self.color_trait.clone())
    }

    pub fn evolution_engine<'a>(&self, catalog: &'a CatalogIndex) -> EvolutionEngine<'a> {
        EvolutionEngine::new(catalog)
            .with_selector(FamilySelector::new(self.selector, self.trait_weights.clone()))
            .with_color_matcher(self.color_matcher())
            .with_keys(self.keys.clone())
    }

    pub fn hatching_engine<'a>(&self, catalog: &'a CatalogIndex) -> HatchingEngine<'a> {
        HatchingEngine::new(catalog)
            .with_default_family(self.default_hatch_family.clone())
            .with_color_matcher(self.color_matcher())
            .with_keys(self.keys.clone())
    }

    pub fn breeding_engine(&self) -> BreedingEngine {
        BreedingEngine::new(self.keys.clone())
    }
}
