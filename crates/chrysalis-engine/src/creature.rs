//! Creature state and its level transitions
//!
//! ```text
//! Egg(level 0) --hatch--> Hatched(level 0) --evolve--> 1 --evolve--> 2 --evolve--> 3
//! ```
//!
//! No transition skips a level and none is reversible. Each evolution appends
//! one [`EvolutionStep`], so `lineage.len() == level` always holds.

use std::collections::BTreeSet;
use std::fmt;

use chrysalis_catalog::{ColorProfile, MAX_LEVEL, TraitMap};
use serde::{Deserialize, Serialize};

use crate::EngineError;
use crate::evolution::EvolutionResult;

/// Identifier of a creature (token id, database key, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureId(String);

impl CreatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CreatureId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CreatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed level transition, recording the state the creature left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStep {
    /// Level the creature was at when it evolved away from this form
    pub level_at_step: u8,
    pub family: String,
    pub sprite_id: String,
    /// Unix timestamp (seconds) supplied by the caller
    pub timestamp: u64,
}

/// Breeding parent captured at breeding time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: CreatureId,
    pub family: String,
    pub level: u8,
}

/// Whether the creature is still an egg or has a concrete form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Produced by breeding; no family commitment yet
    Egg {
        parents: [ParentRef; 2],
        /// Index into the cosmetic egg asset pool (1-based)
        asset_index: u32,
    },
    /// Concrete form from the catalog
    Hatched { family: String, sprite_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub level: u8,
    pub stage: Stage,
    #[serde(default)]
    pub attributes: TraitMap,
    #[serde(default)]
    pub color_profile: Option<ColorProfile>,
    #[serde(default)]
    pub lineage: Vec<EvolutionStep>,
    /// Administrative label inherited through breeding
    #[serde(default)]
    pub role: String,
}

impl Creature {
    /// Create a level-0 creature with a concrete form
    pub fn hatched(
        id: impl Into<CreatureId>,
        family: impl Into<String>,
        sprite_id: impl Into<String>,
        attributes: TraitMap,
    ) -> Self {
        Self {
            id: id.into(),
            level: 0,
            stage: Stage::Hatched {
                family: family.into(),
                sprite_id: sprite_id.into(),
            },
            attributes,
            color_profile: None,
            lineage: Vec::new(),
            role: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn is_egg(&self) -> bool {
        matches!(self.stage, Stage::Egg { .. })
    }

    /// Reached the highest level; no further evolution
    pub fn is_terminal(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Current family, `None` for eggs
    pub fn family(&self) -> Option<&str> {
        match &self.stage {
            Stage::Hatched { family, .. } => Some(family),
            Stage::Egg { .. } => None,
        }
    }

    /// Current sprite id, `None` for eggs
    pub fn sprite_id(&self) -> Option<&str> {
        match &self.stage {
            Stage::Hatched { sprite_id, .. } => Some(sprite_id),
            Stage::Egg { .. } => None,
        }
    }

    /// Breeding parents, `Some` only for eggs
    pub fn parents(&self) -> Option<&[ParentRef; 2]> {
        match &self.stage {
            Stage::Egg { parents, .. } => Some(parents),
            Stage::Hatched { .. } => None,
        }
    }

    /// Families this creature has already passed through
    pub fn lineage_families(&self) -> BTreeSet<&str> {
        self.lineage.iter().map(|step| step.family.as_str()).collect()
    }

    /// Turn an egg into a concrete level-0 creature
    pub fn complete_hatch(
        &mut self,
        family: impl Into<String>,
        sprite_id: impl Into<String>,
        attributes: TraitMap,
        color_profile: Option<ColorProfile>,
    ) -> Result<(), EngineError> {
        if !self.is_egg() {
            return Err(EngineError::NotAnEgg(self.id.clone()));
        }
        self.stage = Stage::Hatched {
            family: family.into(),
            sprite_id: sprite_id.into(),
        };
        self.level = 0;
        self.attributes = attributes;
        self.color_profile = color_profile;
        self.lineage.clear();
        Ok(())
    }

    /// Move to the next level using an evolution result.
    ///
    /// The form being left is appended to the lineage.
    pub fn apply_evolution(
        &mut self,
        result: &EvolutionResult,
        timestamp: u64,
    ) -> Result<(), EngineError> {
        let (family, sprite_id) = match &self.stage {
            Stage::Hatched { family, sprite_id } => (family.clone(), sprite_id.clone()),
            Stage::Egg { .. } => return Err(EngineError::NotHatched(self.id.clone())),
        };

        if self.is_terminal() || result.level != self.level + 1 {
            return Err(EngineError::InvalidTransition {
                creature_id: self.id.clone(),
                from: self.level,
                to: result.level,
            });
        }
        self.check_lineage()?;

        self.lineage.push(EvolutionStep {
            level_at_step: self.level,
            family,
            sprite_id,
            timestamp,
        });
        self.level = result.level;
        self.stage = Stage::Hatched {
            family: result.family.clone(),
            sprite_id: result.sprite.sprite_id.clone(),
        };
        self.attributes = result.attributes.clone();
        self.color_profile = result.color_profile.clone();
        Ok(())
    }

    /// Every level gained must be backed by exactly one lineage step
    pub fn check_lineage(&self) -> Result<(), EngineError> {
        if self.lineage.len() != usize::from(self.level) {
            return Err(EngineError::InconsistentLineage {
                creature_id: self.id.clone(),
                level: self.level,
                lineage_len: self.lineage.len(),
            });
        }
        Ok(())
    }
}
