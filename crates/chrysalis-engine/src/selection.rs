//! Family and sprite selection
//!
//! Family choice is content-weighted: every family at the target level gets a
//! score from attribute similarity, a continuity bonus for the creature's own
//! family, a penalty for families already in its lineage, and a little noise.
//! One family is then drawn by roulette over those scores. Sprite choice
//! inside the family is uniform.

use std::collections::BTreeSet;

use chrysalis_catalog::{ColorProfile, FamilyEntries, LevelCatalog, SpriteRecord, TraitMap};
use serde::{Deserialize, Serialize};

use crate::color::family_color_score;
use crate::rng::EngineRng;
use crate::similarity::TraitWeights;

/// Tunable constants of the family selector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTuning {
    /// Multiplier for the creature's current family
    pub continuity_bonus: f64,
    /// Multiplier for families already present in the lineage
    pub repetition_penalty: f64,
    /// Width of the additive noise band, centered on zero
    pub noise_amplitude: f64,
    /// Lowest score any family can end up with
    pub score_floor: f64,
    /// Weight of color similarity (0 disables it)
    pub color_weight: f64,
}

impl Default for SelectorTuning {
    fn default() -> Self {
        Self {
            continuity_bonus: 1.3,
            repetition_penalty: 0.4,
            noise_amplitude: 0.1,
            score_floor: 0.01,
            color_weight: 0.0,
        }
    }
}

/// Score breakdown for one candidate family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyCandidateScore {
    pub family: String,
    pub attrs_score: f64,
    pub color_score: f64,
    pub family_bonus: f64,
    pub lineage_bonus: f64,
    pub noise: f64,
    pub total_score: f64,
}

/// What the creature currently looks like, as seen by the selector
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub current_family: Option<&'a str>,
    pub current_attributes: &'a TraitMap,
    pub current_color: Option<&'a ColorProfile>,
    pub lineage_families: &'a BTreeSet<&'a str>,
}

/// Result of a family draw
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySelection {
    pub family: String,
    /// Every candidate's score, in catalog order
    pub candidates: Vec<FamilyCandidateScore>,
    /// True when the roulette resolved nothing and the first family was used
    pub fell_back: bool,
}

impl FamilySelection {
    /// Score of the chosen family
    pub fn chosen_score(&self) -> f64 {
        self.candidates
            .iter()
            .find(|c| c.family == self.family)
            .map_or(0.0, |c| c.total_score)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilySelector {
    pub tuning: SelectorTuning,
    pub weights: TraitWeights,
}

impl FamilySelector {
    pub fn new(tuning: SelectorTuning, weights: TraitWeights) -> Self {
        Self { tuning, weights }
    }

    /// Score every family in `catalog`, drawing one noise value per family in
    /// catalog order.
    ///
    /// `color_profiles` supplies each family's profiles for the optional color
    /// term.
    pub fn score_candidates<'c, R, F>(
        &self,
        context: &SelectionContext<'_>,
        catalog: &LevelCatalog,
        color_profiles: F,
        rng: &mut R,
    ) -> Vec<FamilyCandidateScore>
    where
        R: EngineRng + ?Sized,
        F: Fn(&str) -> &'c [ColorProfile],
    {
        let tuning = &self.tuning;

        catalog
            .iter()
            .map(|(family, entries)| {
                let attrs_score = entries
                    .values()
                    .next()
                    .map_or(0.0, |representative| {
                        self.weights
                            .similarity(context.current_attributes, &representative.attributes)
                    });

                let family_bonus = if context.current_family == Some(family.as_str()) {
                    tuning.continuity_bonus
                } else {
                    1.0
                };
                let lineage_bonus = if context.lineage_families.contains(family.as_str()) {
                    tuning.repetition_penalty
                } else {
                    1.0
                };
                let noise = (rng.next_f64() - 0.5) * tuning.noise_amplitude;
                let color_score = if tuning.color_weight > 0.0 {
                    family_color_score(context.current_color, color_profiles(family))
                } else {
                    0.0
                };

                let raw = attrs_score * family_bonus * lineage_bonus
                    + noise
                    + tuning.color_weight * color_score;
                // NaN fails the comparison inside max() and is replaced by the floor
                let total_score = raw.max(tuning.score_floor);

                FamilyCandidateScore {
                    family: family.clone(),
                    attrs_score,
                    color_score,
                    family_bonus,
                    lineage_bonus,
                    noise,
                    total_score,
                }
            })
            .collect()
    }

    /// Score the catalog and draw one family by roulette selection.
    ///
    /// Returns `None` only for an empty catalog.
    pub fn select_family<'c, R, F>(
        &self,
        context: &SelectionContext<'_>,
        catalog: &LevelCatalog,
        color_profiles: F,
        rng: &mut R,
    ) -> Option<FamilySelection>
    where
        R: EngineRng + ?Sized,
        F: Fn(&str) -> &'c [ColorProfile],
    {
        let first = catalog.keys().next()?.clone();
        let candidates = self.score_candidates(context, catalog, color_profiles, rng);

        let drawn = roulette(&candidates, rng);
        let (family, fell_back) = match drawn {
            Some(index) => (candidates[index].family.clone(), false),
            None => (first, true),
        };

        log::debug!(
            "Selected family '{}' from {} candidates{}",
            family,
            candidates.len(),
            if fell_back { " (fallback)" } else { "" }
        );

        Some(FamilySelection {
            family,
            candidates,
            fell_back,
        })
    }
}

/// Weighted roulette draw: the first candidate whose cumulative score exceeds
/// `rng() * total` wins. `None` if the scores cannot form a distribution.
fn roulette<R: EngineRng + ?Sized>(candidates: &[FamilyCandidateScore], rng: &mut R) -> Option<usize> {
    let total: f64 = candidates.iter().map(|c| c.total_score).sum();
    let draw = rng.next_f64() * total;
    if !(total > 0.0) || !total.is_finite() {
        return None;
    }

    let mut cumulative = 0.0;
    candidates.iter().position(|candidate| {
        cumulative += candidate.total_score;
        cumulative > draw
    })
}

/// Draw one sprite uniformly from a family (`floor(rng() * count)`)
pub fn select_sprite<'a, R>(entries: &'a FamilyEntries, rng: &mut R) -> Option<&'a SpriteRecord>
where
    R: EngineRng + ?Sized,
{
    if entries.is_empty() {
        return None;
    }
    let index = rng.next_index(entries.len());
    entries.get_index(index).map(|(_, sprite)| sprite)
}
