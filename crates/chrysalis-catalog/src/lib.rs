//! Sprite catalog data for Chrysalis
//!
//! This crate provides the foundational data types for creature generation:
//! - Trait bags (TraitMap, TraitValue, TraitEntry)
//! - Sprite records and color profiles (SpriteRecord, ColorProfile)
//! - Raw catalog sources in RON or JSON (CatalogData, RawSprite)
//! - The read-only lookup index built from them (CatalogIndex)

mod color;
mod index;
mod source;
mod sprite;
mod traits;

pub use color::{ColorMetrics, ColorProfile};
pub use index::{CatalogIndex, FamilyEntries, LevelCatalog};
pub use source::{CatalogData, CatalogLoadError, RawSprite};
pub use sprite::SpriteRecord;
pub use traits::{TraitEntry, TraitMap, TraitValue};

/// Highest progression level a creature can reach (terminal stage)
pub const MAX_LEVEL: u8 = 3;

/// Derive a sprite id from an asset path or filename ("art/moth_03.png" -> "moth_03")
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
