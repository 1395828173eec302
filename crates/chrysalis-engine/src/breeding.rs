//! Breeding two creatures into an egg
//!
//! Breeding does not consult the catalog. The egg's look is a uniform pick
//! from a fixed cosmetic asset pool, its traits are a fixed merge of
//! bookkeeping values, and its role is a coin flip between the parents.
//! Eligibility (level, tenure, payment) is the caller's responsibility.

use chrysalis_catalog::TraitMap;
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, CreatureId, ParentRef, Stage};
use crate::rng::EngineRng;
use crate::{BookkeepingKeys, EngineError};

/// Metadata for a freshly bred egg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggMetadata {
    /// 1-based index into the cosmetic egg asset pool
    pub asset_index: u32,
    pub attributes: TraitMap,
    pub role: String,
    /// Parents in argument order, as they were at breeding time
    pub parents: [ParentRef; 2],
}

impl EggMetadata {
    /// Materialize the egg as a level-0 creature
    pub fn into_egg(self, id: impl Into<CreatureId>) -> Creature {
        Creature {
            id: id.into(),
            level: 0,
            stage: Stage::Egg {
                parents: self.parents,
                asset_index: self.asset_index,
            },
            attributes: self.attributes,
            color_profile: None,
            lineage: Vec::new(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreedingEngine {
    keys: BookkeepingKeys,
}

impl BreedingEngine {
    pub fn new(keys: BookkeepingKeys) -> Self {
        Self { keys }
    }

    /// Breed two hatched creatures into egg metadata.
    ///
    /// Input is rejected before any random draw. Draw order is the asset
    /// index, then the role coin flip.
    pub fn breed<R: EngineRng + ?Sized>(
        &self,
        parent_a: &Creature,
        parent_b: &Creature,
        asset_pool_size: u32,
        rng: &mut R,
    ) -> Result<EggMetadata, EngineError> {
        if parent_a.id == parent_b.id {
            return Err(EngineError::InvalidBreedingInput {
                reason: format!("creature {} cannot breed with itself", parent_a.id),
            });
        }
        if asset_pool_size == 0 {
            return Err(EngineError::InvalidBreedingInput {
                reason: "egg asset pool is empty".to_string(),
            });
        }
        let parents = [parent_ref(parent_a)?, parent_ref(parent_b)?];

        let asset_index = 1 + rng.next_index(asset_pool_size as usize) as u32;
        let role = if rng.next_f64() < 0.5 {
            parent_a.role.clone()
        } else {
            parent_b.role.clone()
        };

        let mut attributes = TraitMap::new();
        attributes.insert(self.keys.stage.as_str(), "Egg");
        attributes.insert(
            self.keys.parents.as_str(),
            format!("{} x {}", parent_a.id, parent_b.id),
        );
        if let Some(size) = self.inherited_family_size(parent_a, parent_b) {
            attributes.insert(self.keys.total_family_size.as_str(), size);
        }
        // Same-family parents pass their family on as a hatching hint
        if parents[0].family == parents[1].family {
            attributes.insert(self.keys.family.as_str(), parents[0].family.as_str());
        }

        log::info!(
            "Bred {} x {} into egg asset #{} with role '{}'",
            parent_a.id,
            parent_b.id,
            asset_index,
            role
        );

        Ok(EggMetadata {
            asset_index,
            attributes,
            role,
            parents,
        })
    }

    /// Mean of the parents' recorded family sizes, ignoring a missing side
    fn inherited_family_size(&self, a: &Creature, b: &Creature) -> Option<f64> {
        let key = self.keys.total_family_size.as_str();
        match (a.attributes.number(key), b.attributes.number(key)) {
            (Some(x), Some(y)) => Some((x + y) / 2.0),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        }
    }
}

fn parent_ref(parent: &Creature) -> Result<ParentRef, EngineError> {
    let family = parent
        .family()
        .ok_or_else(|| EngineError::InvalidBreedingInput {
            reason: format!("parent {} is still an egg", parent.id),
        })?;
    Ok(ParentRef {
        id: parent.id.clone(),
        family: family.to_string(),
        level: parent.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::make_rng;

    fn parent(id: &str, family: &str, role: &str, size: Option<f64>) -> Creature {
        let mut attributes = TraitMap::new();
        if let Some(size) = size {
            attributes.insert("Total Family Size", size);
        }
        let mut creature = Creature::hatched(id, family, format!("{family}_1"), attributes).with_role(role);
        creature.level = 3;
        creature
    }

    #[test]
    fn test_breed_merges_bookkeeping_traits() {
        let a = parent("1", "moth", "Guard", Some(4.0));
        let b = parent("2", "beetle", "Scout", Some(7.0));
        let mut rng = make_rng("breed");
        let egg = BreedingEngine::default().breed(&a, &b, 10, &mut rng).unwrap();

        assert!((1..=10).contains(&egg.asset_index));
        assert_eq!(egg.attributes.text("Stage"), Some("Egg"));
        assert_eq!(egg.attributes.text("Parents"), Some("1 x 2"));
        assert_eq!(egg.attributes.number("Total Family Size"), Some(5.5));
        assert!(!egg.attributes.contains("Family"));
        assert!(egg.role == "Guard" || egg.role == "Scout");
        assert_eq!(egg.parents[0].id.as_str(), "1");
        assert_eq!(egg.parents[1].family, "beetle");
        assert_eq!(egg.parents[1].level, 3);
    }

    #[test]
    fn test_family_size_one_side_missing() {
        let a = parent("1", "moth", "Guard", None);
        let b = parent("2", "moth", "Scout", Some(6.0));
        let mut rng = make_rng("breed");
        let egg = BreedingEngine::default().breed(&a, &b, 3, &mut rng).unwrap();
        assert_eq!(egg.attributes.number("Total Family Size"), Some(6.0));

        let c = parent("3", "moth", "Scout", None);
        let egg = BreedingEngine::default().breed(&a, &c, 3, &mut rng).unwrap();
        assert!(!egg.attributes.contains("Total Family Size"));
    }

    #[test]
    fn test_same_family_parents_leave_hint() {
        let a = parent("1", "moth", "Guard", None);
        let b = parent("2", "moth", "Scout", None);
        let mut rng = make_rng("hint");
        let egg = BreedingEngine::default().breed(&a, &b, 3, &mut rng).unwrap();
        assert_eq!(egg.attributes.text("Family"), Some("moth"));
    }

    #[test]
    fn test_same_parent_rejected_before_draw() {
        struct PanickingRng;
        impl EngineRng for PanickingRng {
            fn next_f64(&mut self) -> f64 {
                panic!("no draw expected");
            }
        }
        let a = parent("1", "moth", "Guard", None);
        let err = BreedingEngine::default()
            .breed(&a, &a.clone(), 3, &mut PanickingRng)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidBreedingInput { .. }));

        let b = parent("2", "moth", "Guard", None);
        let err = BreedingEngine::default()
            .breed(&a, &b, 0, &mut PanickingRng)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidBreedingInput { .. }));
    }

    #[test]
    fn test_egg_parent_rejected() {
        let a = parent("1", "moth", "Guard", None);
        let b = parent("2", "moth", "Guard", None);
        let mut rng = make_rng("egg");
        let egg = BreedingEngine::default()
            .breed(&a, &b, 3, &mut rng)
            .unwrap()
            .into_egg("3");
        let err = BreedingEngine::default().breed(&a, &egg, 3, &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::InvalidBreedingInput { .. }));
    }

    #[test]
    fn test_into_egg() {
        let a = parent("1", "moth", "Guard", None);
        let b = parent("2", "beetle", "Scout", None);
        let mut rng = make_rng("into");
        let metadata = BreedingEngine::default().breed(&a, &b, 8, &mut rng).unwrap();
        let asset_index = metadata.asset_index;
        let egg = metadata.into_egg("9");

        assert!(egg.is_egg());
        assert_eq!(egg.level, 0);
        assert!(egg.lineage.is_empty());
        assert_eq!(egg.family(), None);
        assert!(matches!(egg.stage, Stage::Egg { asset_index: i, .. } if i == asset_index));
    }
}
