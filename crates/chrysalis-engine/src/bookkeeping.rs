//! Trait names the engines write into creature metadata

use chrysalis_catalog::TraitMap;
use serde::{Deserialize, Serialize};

/// Names of the bookkeeping traits injected by the engines.
///
/// Deployments with their own metadata taxonomy can rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookkeepingKeys {
    /// Family name (also read back as the egg's family hint)
    pub family: String,
    pub sprite: String,
    pub level: String,
    /// Egg stage marker
    pub stage: String,
    /// Lineage note naming both breeding parents
    pub parents: String,
    /// Inherited numeric "total family size"
    pub total_family_size: String,
}

impl Default for BookkeepingKeys {
    fn default() -> Self {
        Self {
            family: "Family".to_string(),
            sprite: "Sprite".to_string(),
            level: "Level".to_string(),
            stage: "Stage".to_string(),
            parents: "Parents".to_string(),
            total_family_size: "Total Family Size".to_string(),
        }
    }
}

impl BookkeepingKeys {
    /// Copy `base` and add the family, sprite and level traits
    pub fn stamp(&self, base: &TraitMap, family: &str, sprite_id: &str, level: u8) -> TraitMap {
        let mut attributes = base.clone();
        attributes.insert(self.family.as_str(), family);
        attributes.insert(self.sprite.as_str(), sprite_id);
        attributes.insert(self.level.as_str(), level);
        attributes
    }
}
