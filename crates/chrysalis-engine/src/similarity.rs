//! Attribute similarity scoring
//!
//! Compares two trait bags through a weight table. Traits missing from the
//! table are ignored; numeric traits that differ still earn partial credit
//! that falls off linearly with the difference.

use chrysalis_catalog::TraitMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Absolute difference at which a numeric trait stops earning credit
pub const NUMERIC_FALLOFF: f64 = 10.0;

/// Relative importance of each recognized trait. Always sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct TraitWeights {
    weights: IndexMap<String, f64>,
}

impl Default for TraitWeights {
    fn default() -> Self {
        Self::normalized(
            [
                ("Taille", 0.20),
                ("Couleur", 0.15),
                ("Forme", 0.15),
                ("Motif", 0.10),
                ("Habitat", 0.10),
                ("Régime", 0.10),
                ("Pattes", 0.10),
                ("Ailes", 0.10),
            ]
            .into_iter()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect(),
        )
    }
}

impl TraitWeights {
    /// Build a weight table, normalizing it to sum to 1.
    ///
    /// Negative and non-finite weights count as zero. A table with no positive
    /// weight falls back to the default table.
    pub fn new<I, K>(weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let weights: IndexMap<String, f64> = weights
            .into_iter()
            .map(|(name, weight)| {
                let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
                (name.into(), weight)
            })
            .collect();

        if weights.values().sum::<f64>() <= 0.0 {
            log::warn!("Trait weight table has no positive weight, using default table");
            return Self::default();
        }
        Self::normalized(weights)
    }

    fn normalized(mut weights: IndexMap<String, f64>) -> Self {
        let total: f64 = weights.values().sum();
        for weight in weights.values_mut() {
            *weight /= total;
        }
        Self { weights }
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.weights.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Similarity of two trait bags in [0, 1].
    ///
    /// A recognized trait is considered when at least one side has it. Equal
    /// values earn the full weight, unequal numbers earn
    /// `weight * max(0, 1 - |a - b| / 10)`, and a trait missing on one side
    /// earns nothing. The sum is divided by the weight considered, so two bags
    /// sharing no recognized trait score 0.
    pub fn similarity(&self, a: &TraitMap, b: &TraitMap) -> f64 {
        let mut considered = 0.0;
        let mut earned = 0.0;

        for (name, weight) in &self.weights {
            let (left, right) = (a.get(name), b.get(name));
            if left.is_none() && right.is_none() {
                continue;
            }
            considered += weight;

            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };
            if left.matches(right) {
                earned += weight;
            } else if let (Some(x), Some(y)) = (left.as_number(), right.as_number()) {
                earned += weight * (1.0 - (x - y).abs() / NUMERIC_FALLOFF).max(0.0);
            }
        }

        if considered <= 0.0 {
            0.0
        } else {
            (earned / considered).clamp(0.0, 1.0)
        }
    }
}

impl From<IndexMap<String, f64>> for TraitWeights {
    fn from(weights: IndexMap<String, f64>) -> Self {
        Self::new(weights)
    }
}

impl From<TraitWeights> for IndexMap<String, f64> {
    fn from(weights: TraitWeights) -> Self {
        weights.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits(pairs: &[(&str, &str)]) -> TraitMap {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn weights() -> TraitWeights {
        TraitWeights::new([("Taille", 1.0), ("Pattes", 1.0), ("Couleur", 2.0)])
    }

    #[test]
    fn test_weights_are_normalized() {
        let w = weights();
        let total: f64 = w.iter().map(|(_, weight)| weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((w.weight("Couleur").unwrap() - 0.5).abs() < 1e-12);

        let default_total: f64 = TraitWeights::default().iter().map(|(_, w)| w).sum();
        assert!((default_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_table_falls_back_to_default() {
        let w = TraitWeights::new([("Taille", 0.0), ("Pattes", f64::NAN)]);
        assert_eq!(w, TraitWeights::default());
    }

    #[test]
    fn test_identical_bags_score_one() {
        let a = traits(&[("Taille", "Grande"), ("Couleur", "Rouge")]);
        assert!((weights().similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_values_score_zero() {
        let a = traits(&[("Taille", "Grande")]);
        let b = traits(&[("Taille", "Petite")]);
        assert_eq!(weights().similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_unrecognized_traits_ignored() {
        let a = traits(&[("Taille", "Grande"), ("Humeur", "Joyeuse")]);
        let b = traits(&[("Taille", "Grande"), ("Humeur", "Triste")]);
        assert!((weights().similarity(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_nothing_considered_scores_zero() {
        let a = traits(&[("Humeur", "Joyeuse")]);
        assert_eq!(weights().similarity(&a, &TraitMap::new()), 0.0);
        assert_eq!(weights().similarity(&TraitMap::new(), &TraitMap::new()), 0.0);
    }

    #[test]
    fn test_missing_on_one_side_counts_against() {
        // Taille matches (0.25), Couleur only on one side (0.5 considered, 0 earned)
        let a = traits(&[("Taille", "Grande"), ("Couleur", "Rouge")]);
        let b = traits(&[("Taille", "Grande")]);
        let score = weights().similarity(&a, &b);
        assert!((score - 0.25 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_partial_credit() {
        let w = TraitWeights::new([("Pattes", 1.0)]);
        let six: TraitMap = [("Pattes", 6.0)].into_iter().collect();
        let eight: TraitMap = [("Pattes", 8.0)].into_iter().collect();
        let far: TraitMap = [("Pattes", 40.0)].into_iter().collect();
        let text_six = traits(&[("Pattes", "6")]);

        assert!((w.similarity(&six, &eight) - 0.8).abs() < 1e-12);
        assert_eq!(w.similarity(&six, &far), 0.0);
        assert!((w.similarity(&six, &text_six) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = traits(&[("Taille", "Grande"), ("Pattes", "4")]);
        let b = traits(&[("Couleur", "Bleu"), ("Pattes", "7")]);
        let w = weights();
        assert!((w.similarity(&a, &b) - w.similarity(&b, &a)).abs() < 1e-12);
    }
}
