//! Engine error and data-integrity warning types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::creature::CreatureId;

/// Fatal errors for a single engine call. Nothing here is retried by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The catalog has no entries for the requested level (or family at that level)
    #[error("catalog has no entries for level {}{}", .level, family_suffix(.family))]
    CatalogMissing { level: u8, family: Option<String> },

    /// Breeding was called with unusable input (same parent twice, empty asset pool)
    #[error("invalid breeding input: {reason}")]
    InvalidBreedingInput { reason: String },

    /// An egg has no family hint and no default family is configured
    #[error("egg {egg_id} has no family hint and no default hatch family is configured")]
    HatchFamilyUnresolved { egg_id: CreatureId },

    /// Requested level change is not a single forward step within 0..=3
    #[error("creature {creature_id} cannot move from level {from} to level {to}")]
    InvalidTransition {
        creature_id: CreatureId,
        from: u8,
        to: u8,
    },

    /// A creature's recorded lineage does not have one step per level gained
    #[error("creature {creature_id} is at level {level} but has {lineage_len} lineage steps")]
    InconsistentLineage {
        creature_id: CreatureId,
        level: u8,
        lineage_len: usize,
    },

    /// Evolution was requested for a creature that is still an egg
    #[error("creature {0} is still an egg and must hatch before evolving")]
    NotHatched(CreatureId),

    /// Hatching was requested for a creature that is not an egg
    #[error("creature {0} is not an egg")]
    NotAnEgg(CreatureId),
}

fn family_suffix(family: &Option<String>) -> String {
    family
        .as_ref()
        .map(|f| format!(" in family '{}'", f))
        .unwrap_or_default()
}

/// Non-fatal fallback taken during an engine call
///
/// The call still completes with best-effort output. Every warning is logged
/// when raised and also returned to the caller alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataIntegrityWarning {
    /// Weighted family selection resolved nothing; the first catalog family was used
    FamilySelectionFallback { level: u8, family: String },
    /// No color profile matched the sprite; the family's first profile was used
    ColorProfileFallback { family: String, sprite_id: String },
    /// The family has no color profiles at all
    ColorProfileMissing { family: String },
    /// The egg carried no family hint; the configured default family was used
    HatchFamilyDefaulted { egg_id: CreatureId, family: String },
    /// The family has fewer distinct sprites than hatch candidates requested
    HatchPoolExhausted {
        family: String,
        requested: usize,
        available: usize,
    },
}

impl DataIntegrityWarning {
    /// Log the warning and hand it back, for `warnings.push(w.raise())`
    pub fn raise(self) -> Self {
        log::warn!("Data integrity: {}", self);
        self
    }
}

impl std::fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FamilySelectionFallback { level, family } => write!(
                f,
                "family selection at level {} resolved nothing, fell back to '{}'",
                level, family
            ),
            Self::ColorProfileFallback { family, sprite_id } => write!(
                f,
                "no color profile for sprite '{}', using first profile of family '{}'",
                sprite_id, family
            ),
            Self::ColorProfileMissing { family } => {
                write!(f, "family '{}' has no color profiles", family)
            }
            Self::HatchFamilyDefaulted { egg_id, family } => write!(
                f,
                "egg {} has no family hint, hatching as default family '{}'",
                egg_id, family
            ),
            Self::HatchPoolExhausted {
                family,
                requested,
                available,
            } => write!(
                f,
                "family '{}' has {} distinct level-0 sprites, {} hatch candidates requested",
                family, available, requested
            ),
        }
    }
}
