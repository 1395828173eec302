//! Procedural creature evolution for Chrysalis
//!
//! This crate implements:
//! - Seeded, reproducible randomness keyed by wallet, creature and lineage
//! - Attribute similarity scoring over a weighted trait table
//! - Weighted family selection with continuity bonus and repetition penalty
//! - Evolution (level N -> N + 1), breeding (two parents -> egg) and
//!   hatching (egg -> distinct level-0 options)
//!
//! All engines are pure: they borrow a read-only
//! [`CatalogIndex`](chrysalis_catalog::CatalogIndex) and hold no state
//! between calls.

pub mod bookkeeping;
pub mod breeding;
pub mod color;
pub mod creature;
pub mod error;
pub mod evolution;
pub mod hatching;
pub mod rng;
pub mod selection;
pub mod settings;
pub mod similarity;

// Re-export main types for convenience
pub use bookkeeping::BookkeepingKeys;
pub use breeding::{BreedingEngine, EggMetadata};
pub use color::{ColorMatch, ColorMatcher};
pub use creature::{Creature, CreatureId, EvolutionStep, ParentRef, Stage};
pub use error::{DataIntegrityWarning, EngineError};
pub use evolution::{EvolutionEngine, EvolutionResult};
pub use hatching::{DEFAULT_HATCH_OPTIONS, HatchCandidate, HatchProposal, HatchingEngine};
pub use rng::{EngineRng, SeededRng, make_rng};
pub use selection::{
    FamilyCandidateScore, FamilySelection, FamilySelector, SelectionContext, SelectorTuning,
    select_sprite,
};
pub use settings::EngineSettings;
pub use similarity::TraitWeights;
