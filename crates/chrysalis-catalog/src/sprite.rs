//! Sprite records

use serde::{Deserialize, Serialize};

use crate::TraitMap;

/// One concrete visual asset and its declared traits
///
/// Identified by `(level, family, sprite_id)`; the level is implied by where
/// the record lives in the [`CatalogIndex`](crate::CatalogIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRecord {
    pub sprite_id: String,
    pub family: String,
    pub asset_path: String,
    pub display_name: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub attributes: TraitMap,
}
