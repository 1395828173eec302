//! Hatching eggs into level-0 creatures
//!
//! The engine proposes a handful of distinct sprites from the egg's inherited
//! family. Picking one is left to the creature's owner; the chosen candidate
//! is then applied with [`HatchingEngine::hatch`].

use chrysalis_catalog::{CatalogIndex, ColorProfile, SpriteRecord};
use serde::{Deserialize, Serialize};

use crate::color::ColorMatcher;
use crate::creature::{Creature, CreatureId};
use crate::rng::EngineRng;
use crate::selection::select_sprite;
use crate::{BookkeepingKeys, DataIntegrityWarning, EngineError};

/// Number of options offered per hatch unless configured otherwise
pub const DEFAULT_HATCH_OPTIONS: usize = 3;

/// Rejection-sampling budget per obtainable candidate
const DRAWS_PER_CANDIDATE: usize = 64;

/// One sprite option offered to the owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchCandidate {
    pub family: String,
    pub sprite: SpriteRecord,
    pub color_profile: Option<ColorProfile>,
}

/// All options for one egg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchProposal {
    pub egg_id: CreatureId,
    pub family: String,
    pub candidates: Vec<HatchCandidate>,
    #[serde(default)]
    pub warnings: Vec<DataIntegrityWarning>,
}

#[derive(Debug, Clone)]
pub struct HatchingEngine<'a> {
    catalog: &'a CatalogIndex,
    colors: ColorMatcher,
    keys: BookkeepingKeys,
    default_family: Option<String>,
}

impl<'a> HatchingEngine<'a> {
    pub fn new(catalog: &'a CatalogIndex) -> Self {
        Self {
            catalog,
            colors: ColorMatcher::default(),
            keys: BookkeepingKeys::default(),
            default_family: None,
        }
    }

    /// Family used when an egg carries no family hint
    pub fn with_default_family(mut self, family: Option<String>) -> Self {
        self.default_family = family.filter(|f| !f.trim().is_empty());
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

    /// Propose `count` distinct level-0 sprites from the egg's family.
    ///
    /// Families with fewer sprites than requested yield all of them plus a
    /// [`DataIntegrityWarning::HatchPoolExhausted`] warning.
    pub fn propose_hatch_options<R: EngineRng + ?Sized>(
        &self,
        egg: &Creature,
        count: usize,
        rng: &mut R,
    ) -> Result<HatchProposal, EngineError> {
        if !egg.is_egg() {
            return Err(EngineError::NotAnEgg(egg.id.clone()));
        }

        let mut warnings = Vec::new();
        let family = self.resolve_family(egg, &mut warnings)?;

        let entries = self
            .catalog
            .family(0, &family)
            .ok_or_else(|| EngineError::CatalogMissing {
                level: 0,
                family: Some(family.clone()),
            })?;

        let target = count.min(entries.len());
        if target < count {
            warnings.push(
                DataIntegrityWarning::HatchPoolExhausted {
                    family: family.clone(),
                    requested: count,
                    available: entries.len(),
                }
                .raise(),
            );
        }

        let budget = target.saturating_mul(DRAWS_PER_CANDIDATE);
        let mut chosen: Vec<&SpriteRecord> = Vec::with_capacity(target);
        let mut draws = 0;
        while chosen.len() < target && draws < budget {
            draws += 1;
            let Some(sprite) = select_sprite(entries, rng) else {
                break;
            };
            if !chosen.iter().any(|c| c.sprite_id == sprite.sprite_id) {
                chosen.push(sprite);
            }
        }
        if chosen.len() < target {
            log::debug!(
                "Hatch sampling for '{}' hit its draw budget, filling in catalog order",
                family
            );
            for sprite in entries.values() {
                if chosen.len() == target {
                    break;
                }
                if !chosen.iter().any(|c| c.sprite_id == sprite.sprite_id) {
                    chosen.push(sprite);
                }
            }
        }

        let profiles = self.catalog.color_profiles(&family);
        let candidates = chosen
            .into_iter()
            .map(|sprite| {
                let color = self.colors.resolve(profiles, sprite);
                warnings.extend(color.warning);
                HatchCandidate {
                    family: family.clone(),
                    sprite: sprite.clone(),
                    color_profile: color.profile,
                }
            })
            .collect::<Vec<_>>();

        log::info!(
            "Proposed {} hatch options for egg {} from family '{}'",
            candidates.len(),
            egg.id,
            family
        );

        Ok(HatchProposal {
            egg_id: egg.id.clone(),
            family,
            candidates,
            warnings,
        })
    }

    /// Hatch `egg` into the owner's chosen candidate.
    ///
    /// The new creature takes the sprite's traits plus bookkeeping, and keeps
    /// the family size inherited at breeding.
    pub fn hatch(&self, egg: &Creature, candidate: &HatchCandidate) -> Result<Creature, EngineError> {
        let mut attributes = self.keys.stamp(
            &candidate.sprite.attributes,
            &candidate.family,
            &candidate.sprite.sprite_id,
            0,
        );
        if let Some(size) = egg.attributes.get(&self.keys.total_family_size) {
            attributes.insert(self.keys.total_family_size.as_str(), size.clone());
        }

        let mut creature = egg.clone();
        creature.complete_hatch(
            candidate.family.as_str(),
            candidate.sprite.sprite_id.as_str(),
            attributes,
            candidate.color_profile.clone(),
        )?;
        log::info!(
            "Egg {} hatched as '{}' ({})",
            creature.id,
            candidate.family,
            candidate.sprite.sprite_id
        );
        Ok(creature)
    }

    fn resolve_family(
        &self,
        egg: &Creature,
        warnings: &mut Vec<DataIntegrityWarning>,
    ) -> Result<String, EngineError> {
        let hint = egg
            .attributes
            .get(&self.keys.family)
            .map(ToString::to_string)
            .filter(|f| !f.trim().is_empty());
        if let Some(family) = hint {
            return Ok(family);
        }

        let family = self
            .default_family
            .clone()
            .ok_or_else(|| EngineError::HatchFamilyUnresolved {
                egg_id: egg.id.clone(),
            })?;
        warnings.push(
            DataIntegrityWarning::HatchFamilyDefaulted {
                egg_id: egg.id.clone(),
                family: family.clone(),
            }
            .raise(),
        );
        Ok(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{ParentRef, Stage};
    use crate::rng::make_rng;
    use chrysalis_catalog::{CatalogData, ColorMetrics, RawSprite, TraitMap};

    fn catalog() -> CatalogIndex {
        let mut sprites = Vec::new();
        for i in 1..=5 {
            sprites.push(RawSprite {
                level: 0,
                family: "moth".into(),
                sprite_id: None,
                asset_path: format!("art/moth_{i}.png"),
                display_name: format!("Moth {i}"),
                lore: String::new(),
                attributes: Vec::new(),
            });
        }
        for i in 1..=2 {
            sprites.push(RawSprite {
                level: 0,
                family: "beetle".into(),
                sprite_id: None,
                asset_path: format!("art/beetle_{i}.png"),
                display_name: format!("Beetle {i}"),
                lore: String::new(),
                attributes: Vec::new(),
            });
        }
        CatalogIndex::build(&CatalogData {
            sprites,
            color_profiles: vec![ColorProfile {
                family: "moth".into(),
                sprite_id: "moth_2.png".into(),
                hsv_mean: [0.0; 3],
                rgb_mean: [0.0; 3],
                metrics: ColorMetrics::default(),
            }],
        })
    }

    fn egg(hint: Option<&str>) -> Creature {
        let parent = |id: &str| ParentRef {
            id: id.into(),
            family: "moth".into(),
            level: 3,
        };
        let mut attributes = TraitMap::new();
        attributes.insert("Stage", "Egg");
        attributes.insert("Total Family Size", 4.5);
        if let Some(hint) = hint {
            attributes.insert("Family", hint);
        }
        Creature {
            id: "egg-7".into(),
            level: 0,
            stage: Stage::Egg {
                parents: [parent("1"), parent("2")],
                asset_index: 1,
            },
            attributes,
            color_profile: None,
            lineage: Vec::new(),
            role: "Guard".into(),
        }
    }

    #[test]
    fn test_distinct_candidates() {
        let catalog = catalog();
        let engine = HatchingEngine::new(&catalog);
        for i in 0..50 {
            let mut rng = make_rng(&format!("hatch{i}"));
            let proposal = engine
                .propose_hatch_options(&egg(Some("moth")), DEFAULT_HATCH_OPTIONS, &mut rng)
                .unwrap();
            assert_eq!(proposal.candidates.len(), 3);
            let mut ids: Vec<_> = proposal.candidates.iter().map(|c| c.sprite.sprite_id.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 3);
            assert!(proposal.candidates.iter().all(|c| c.color_profile.is_some()));
        }
    }

    #[test]
    fn test_small_family_returns_all_with_warning() {
        let catalog = catalog();
        let mut rng = make_rng("small");
        let proposal = HatchingEngine::new(&catalog)
            .propose_hatch_options(&egg(Some("beetle")), 3, &mut rng)
            .unwrap();
        assert_eq!(proposal.candidates.len(), 2);
        assert!(proposal.warnings.contains(&DataIntegrityWarning::HatchPoolExhausted {
            family: "beetle".into(),
            requested: 3,
            available: 2,
        }));
    }

    #[test]
    fn test_huge_count_is_capped_by_family_size() {
        let catalog = catalog();
        let mut rng = make_rng("huge");
        let proposal = HatchingEngine::new(&catalog)
            .propose_hatch_options(&egg(Some("moth")), usize::MAX, &mut rng)
            .unwrap();
        assert_eq!(proposal.candidates.len(), 5);
        assert!(proposal.warnings.contains(&DataIntegrityWarning::HatchPoolExhausted {
            family: "moth".into(),
            requested: usize::MAX,
            available: 5,
        }));
    }

    #[test]
    fn test_default_family_used_without_hint() {
        let catalog = catalog();
        let mut rng = make_rng("default");
        let proposal = HatchingEngine::new(&catalog)
            .with_default_family(Some("moth".into()))
            .propose_hatch_options(&egg(None), 3, &mut rng)
            .unwrap();
        assert_eq!(proposal.family, "moth");
        assert!(matches!(
            proposal.warnings[0],
            DataIntegrityWarning::HatchFamilyDefaulted { .. }
        ));
    }

    #[test]
    fn test_unresolved_family_is_fatal() {
        let catalog = catalog();
        let mut rng = make_rng("none");
        let err = HatchingEngine::new(&catalog)
            .with_default_family(Some("   ".into()))
            .propose_hatch_options(&egg(None), 3, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::HatchFamilyUnresolved {
                egg_id: "egg-7".into()
            }
        );
    }

    #[test]
    fn test_unknown_family_is_catalog_missing() {
        let catalog = catalog();
        let mut rng = make_rng("unknown");
        let err = HatchingEngine::new(&catalog)
            .propose_hatch_options(&egg(Some("dragon")), 3, &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::CatalogMissing { level: 0, .. }));
    }

    #[test]
    fn test_hatched_creature_rejected() {
        let catalog = catalog();
        let mut rng = make_rng("hatched");
        let creature = Creature::hatched("1", "moth", "moth_1", TraitMap::new());
        let err = HatchingEngine::new(&catalog)
            .propose_hatch_options(&creature, 3, &mut rng)
            .unwrap_err();
        assert_eq!(err, EngineError::NotAnEgg("1".into()));
    }

    #[test]
    fn test_hatch_applies_candidate() {
        let catalog = catalog();
        let engine = HatchingEngine::new(&catalog);
        let egg = egg(Some("moth"));
        let mut rng = make_rng("apply");
        let proposal = engine.propose_hatch_options(&egg, 3, &mut rng).unwrap();
        let choice = &proposal.candidates[1];

        let creature = engine.hatch(&egg, choice).unwrap();
        assert!(!creature.is_egg());
        assert_eq!(creature.level, 0);
        assert_eq!(creature.family(), Some("moth"));
        assert_eq!(creature.sprite_id(), Some(choice.sprite.sprite_id.as_str()));
        assert_eq!(creature.attributes.number("Level"), Some(0.0));
        assert_eq!(creature.attributes.number("Total Family Size"), Some(4.5));
        assert!(!creature.attributes.contains("Stage"));
        assert_eq!(creature.role, "Guard");
        assert!(creature.lineage.is_empty());
    }
}
