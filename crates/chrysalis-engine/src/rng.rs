//! Seeded randomness for reproducible selections
//!
//! Every engine call derives its own generator from a string key, so the same
//! inputs always replay the same stream:
//! - evolution: wallet (lower-cased), creature id, target level, and the sorted
//!   families and sprites already in the lineage
//! - breeding: wallet, both parent ids (sorted), caller nonce
//! - hatching: wallet, egg id, caller nonce
//!
//! Components are length-prefixed, so ids containing separators cannot collide.
//!
//! The key is hashed with FNV-1a, which is stable across platforms and
//! compiler versions, and the hash seeds a Xoshiro256++ generator.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::creature::{CreatureId, EvolutionStep};

/// Generator type produced by [`make_rng`]
pub type SeededRng = Xoshiro256PlusPlus;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Random source consumed by the engines
///
/// Only uniform floats are needed; anything implementing [`rand::Rng`]
/// qualifies through the blanket impl.
pub trait EngineRng {
    /// Next float in [0.0, 1.0)
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl<T: ?Sized + rand::Rng> EngineRng for T {
    fn next_f64(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }
}

/// 64-bit FNV-1a hash of a seed key
pub fn seed_hash(seed: &str) -> u64 {
    seed.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic generator for a seed key
pub fn make_rng(seed: &str) -> SeededRng {
    Xoshiro256PlusPlus::seed_from_u64(seed_hash(seed))
}

/// Seed key under construction. Every component is length-prefixed and every
/// list count-prefixed, so distinct inputs never produce the same key.
struct SeedKey(String);

impl SeedKey {
    fn new(tag: &str) -> Self {
        let mut key = Self(String::new());
        key.text(tag);
        key
    }

    fn text(&mut self, value: &str) -> &mut Self {
        self.0.push_str(&format!("{}:{}|", value.len(), value));
        self
    }

    fn list<'a>(&mut self, values: impl ExactSizeIterator<Item = &'a str>) -> &mut Self {
        self.0.push_str(&format!("{}#", values.len()));
        for value in values {
            self.text(value);
        }
        self
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

/// Seed key for one evolution event
pub fn evolution_seed(
    wallet_id: &str,
    creature_id: &CreatureId,
    target_level: u8,
    lineage: &[EvolutionStep],
) -> String {
    let families: BTreeSet<&str> = lineage.iter().map(|step| step.family.as_str()).collect();
    let sprites: BTreeSet<&str> = lineage.iter().map(|step| step.sprite_id.as_str()).collect();

    SeedKey::new("evolve")
        .text(&wallet_id.trim().to_lowercase())
        .text(creature_id.as_str())
        .text(&target_level.to_string())
        .list(families.into_iter())
        .list(sprites.into_iter())
        .finish()
}

/// Seed key for one breeding event (independent of argument order)
pub fn breeding_seed(
    wallet_id: &str,
    parent_a: &CreatureId,
    parent_b: &CreatureId,
    nonce: u64,
) -> String {
    let (first, second) = if parent_a <= parent_b {
        (parent_a, parent_b)
    } else {
        (parent_b, parent_a)
    };
    SeedKey::new("breed")
        .text(&wallet_id.trim().to_lowercase())
        .text(first.as_str())
        .text(second.as_str())
        .text(&nonce.to_string())
        .finish()
}

/// Seed key for one hatch proposal
pub fn hatch_seed(wallet_id: &str, egg_id: &CreatureId, nonce: u64) -> String {
    SeedKey::new("hatch")
        .text(&wallet_id.trim().to_lowercase())
        .text(egg_id.as_str())
        .text(&nonce.to_string())
        .finish()
}
