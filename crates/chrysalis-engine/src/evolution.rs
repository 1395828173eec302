//! Evolution of a creature from level N to N + 1
//!
//! The whole call is a pure function of the catalog, the creature and the
//! wallet id: the RNG is seeded from those inputs, so replaying an evolution
//! yields the same family, sprite and attributes.

use chrysalis_catalog::{CatalogIndex, ColorProfile, MAX_LEVEL, SpriteRecord, TraitMap};
use serde::{Deserialize, Serialize};

use crate::color::ColorMatcher;
use crate::creature::Creature;
use crate::rng::{EngineRng, evolution_seed, make_rng};
use crate::selection::{FamilyCandidateScore, FamilySelector, SelectionContext, select_sprite};
use crate::{BookkeepingKeys, DataIntegrityWarning, EngineError};

/// Outcome of one evolution event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Level reached
    pub level: u8,
    pub family: String,
    pub sprite: SpriteRecord,
    pub color_profile: Option<ColorProfile>,
    /// Sprite attributes plus family, sprite id and level bookkeeping traits
    pub attributes: TraitMap,
    /// Selection score of the chosen family
    pub score: f64,
    /// Full score table, in catalog order
    pub candidates: Vec<FamilyCandidateScore>,
    #[serde(default)]
    pub warnings: Vec<DataIntegrityWarning>,
}

/// Evolves creatures against a catalog index
#[derive(Debug, Clone)]
pub struct EvolutionEngine<'a> {
    catalog: &'a CatalogIndex,
    selector: FamilySelector,
    colors: ColorMatcher,
    keys: BookkeepingKeys,
}

impl<'a> EvolutionEngine<'a> {
    pub fn new(catalog: &'a CatalogIndex) -> Self {
        Self {
            catalog,
            selector: FamilySelector::default(),
            colors: ColorMatcher::default(),
            keys: BookkeepingKeys::default(),
        }
    }

    pub fn with_selector(mut self, selector: FamilySelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_color_matcher(mut self, colors: ColorMatcher) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_keys(mut self, keys: BookkeepingKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn selector(&self) -> &FamilySelector {
        &self.selector
    }

    /// Evolve `creature` to `target_level` (must be its level + 1).
    ///
    /// The RNG is seeded from the wallet, creature id, target level and
    /// lineage, so identical inputs produce identical results.
    pub fn evolve(
        &self,
        creature: &Creature,
        target_level: u8,
        wallet_id: &str,
    ) -> Result<EvolutionResult, EngineError> {
        let seed = evolution_seed(wallet_id, &creature.id, target_level, &creature.lineage);
        log::debug!("Evolving creature {} with seed '{}'", creature.id, seed);
        let mut rng = make_rng(&seed);
        self.evolve_with_rng(creature, target_level, &mut rng)
    }

    /// Evolve with a caller-supplied random stream instead of the derived seed
    pub fn evolve_with_rng<R: EngineRng + ?Sized>(
        &self,
        creature: &Creature,
        target_level: u8,
        rng: &mut R,
    ) -> Result<EvolutionResult, EngineError> {
        if creature.is_egg() {
            return Err(EngineError::NotHatched(creature.id.clone()));
        }
        if target_level > MAX_LEVEL || creature.level.checked_add(1) != Some(target_level) {
            return Err(EngineError::InvalidTransition {
                creature_id: creature.id.clone(),
                from: creature.level,
                to: target_level,
            });
        }
        creature.check_lineage()?;

        let level_catalog =
            self.catalog
                .families_by_level(target_level)
                .ok_or(EngineError::CatalogMissing {
                    level: target_level,
                    family: None,
                })?;

        let lineage_families = creature.lineage_families();
        let context = SelectionContext {
            current_family: creature.family(),
            current_attributes: &creature.attributes,
            current_color: creature.color_profile.as_ref(),
            lineage_families: &lineage_families,
        };

        let catalog = self.catalog;
        let selection = self
            .selector
            .select_family(&context, level_catalog, |family| catalog.color_profiles(family), rng)
            .ok_or(EngineError::CatalogMissing {
                level: target_level,
                family: None,
            })?;

        let mut warnings = Vec::new();
        if selection.fell_back {
            warnings.push(
                DataIntegrityWarning::FamilySelectionFallback {
                    level: target_level,
                    family: selection.family.clone(),
                }
                .raise(),
            );
        }

        let entries = self
            .catalog
            .family(target_level, &selection.family)
            .ok_or_else(|| EngineError::CatalogMissing {
                level: target_level,
                family: Some(selection.family.clone()),
            })?;
        let sprite = select_sprite(entries, rng).ok_or_else(|| EngineError::CatalogMissing {
            level: target_level,
            family: Some(selection.family.clone()),
        })?;

        let color = self
            .colors
            .resolve(self.catalog.color_profiles(&selection.family), sprite);
        warnings.extend(color.warning);

        let attributes = self.keys.stamp(
            &sprite.attributes,
            &selection.family,
            &sprite.sprite_id,
            target_level,
        );

        log::info!(
            "Creature {} evolves to level {} as '{}' ({})",
            creature.id,
            target_level,
            selection.family,
            sprite.sprite_id
        );

        Ok(EvolutionResult {
            level: target_level,
            family: selection.family.clone(),
            sprite: sprite.clone(),
            color_profile: color.profile,
            attributes,
            score: selection.chosen_score(),
            candidates: selection.candidates,
            warnings,
        })
    }
}
