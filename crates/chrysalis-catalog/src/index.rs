//! Read-only catalog lookup index
//!
//! Built once from [`CatalogData`] and never mutated afterwards. Callers that
//! need to reload swap in a freshly built index instead.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{CatalogData, ColorProfile, MAX_LEVEL, SpriteRecord, TraitMap};

/// Sprites of one family at one level, keyed by sprite id in catalog order
pub type FamilyEntries = IndexMap<String, SpriteRecord>;

/// Families available at one level, keyed by family name in catalog order
pub type LevelCatalog = IndexMap<String, FamilyEntries>;

/// Lookup structures over the sprite catalog and color profiles
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    levels: BTreeMap<u8, LevelCatalog>,
    color_profiles: IndexMap<String, Vec<ColorProfile>>,
    skipped_entries: usize,
}

impl CatalogIndex {
    /// Build the index from raw catalog data.
    ///
    /// Malformed rows are skipped and counted, never fatal: a level that ends
    /// up with no valid rows is simply absent.
    pub fn build(data: &CatalogData) -> Self {
        let mut index = Self::default();

        for raw in &data.sprites {
            let family = raw.family.trim();
            if family.is_empty() {
                log::warn!("Skipping catalog sprite {:?}: blank family", raw.asset_path);
                index.skipped_entries += 1;
                continue;
            }

            let level = match u8::try_from(raw.level) {
                Ok(level) if level <= MAX_LEVEL => level,
                _ => {
                    log::warn!(
                        "Skipping catalog sprite {:?} in family '{}': level {} outside 0..={}",
                        raw.asset_path,
                        family,
                        raw.level,
                        MAX_LEVEL
                    );
                    index.skipped_entries += 1;
                    continue;
                }
            };

            let Some(sprite_id) = raw.resolved_sprite_id() else {
                log::warn!(
                    "Skipping catalog sprite in family '{}' at level {}: no sprite id or asset path",
                    family,
                    level
                );
                index.skipped_entries += 1;
                continue;
            };

            let record = SpriteRecord {
                sprite_id: sprite_id.clone(),
                family: family.to_string(),
                asset_path: raw.asset_path.clone(),
                display_name: raw.display_name.clone(),
                lore: raw.lore.clone(),
                attributes: TraitMap::from_entries(raw.attributes.iter().cloned()),
            };

            let entries = index
                .levels
                .entry(level)
                .or_default()
                .entry(family.to_string())
                .or_default();

            if entries.insert(sprite_id.clone(), record).is_some() {
                log::warn!(
                    "Duplicate catalog sprite '{}' in family '{}' at level {}, keeping the later row",
                    sprite_id,
                    family,
                    level
                );
            }
        }

        for profile in &data.color_profiles {
            let family = profile.family.trim();
            if family.is_empty() {
                log::warn!("Skipping color profile {:?}: blank family", profile.sprite_id);
                index.skipped_entries += 1;
                continue;
            }
            index
                .color_profiles
                .entry(family.to_string())
                .or_default()
                .push(profile.clone());
        }

        log::debug!(
            "Built catalog index: levels {:?}, {} sprites, {} profiled families, {} rows skipped",
            index.levels().collect::<Vec<_>>(),
            index.sprite_count(),
            index.color_profiles.len(),
            index.skipped_entries
        );

        index
    }

    /// All families at `level`, or `None` if the catalog has nothing there
    pub fn families_by_level(&self, level: u8) -> Option<&LevelCatalog> {
        self.levels.get(&level).filter(|families| !families.is_empty())
    }

    /// Sprites of one family at one level
    pub fn family(&self, level: u8, family: &str) -> Option<&FamilyEntries> {
        self.families_by_level(level)
            .and_then(|families| families.get(family))
            .filter(|entries| !entries.is_empty())
    }

    /// Color profiles recorded for a family (empty if none)
    pub fn color_profiles(&self, family: &str) -> &[ColorProfile] {
        self.color_profiles
            .get(family)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Levels present in the index, ascending
    pub fn levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.levels.keys().copied()
    }

    pub fn family_count(&self, level: u8) -> usize {
        self.families_by_level(level).map_or(0, IndexMap::len)
    }

    /// Total number of sprite records across all levels
    pub fn sprite_count(&self) -> usize {
        self.levels
            .values()
            .flat_map(|families| families.values())
            .map(IndexMap::len)
            .sum()
    }

    /// Rows dropped during the build because they were malformed
    pub fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl From<&CatalogData> for CatalogIndex {
    fn from(data: &CatalogData) -> Self {
        Self::build(data)
    }
}
