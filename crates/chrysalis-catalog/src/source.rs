//! Raw catalog sources
//!
//! The catalog arrives as a flat table of sprite rows plus a table of color
//! profiles, in RON or JSON. Rows are validated when the index is built, not
//! when they are parsed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ColorProfile, TraitEntry, file_stem};

/// Errors raised while reading catalog data from disk or a string
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RON catalog: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported catalog format for {0} (expected .ron or .json)")]
    UnsupportedFormat(PathBuf),
}

/// One sprite row as supplied by the catalog data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSprite {
    /// Progression level (0-3). Signed so out-of-range rows still parse.
    pub level: i64,
    pub family: String,
    /// Explicit sprite id; derived from `asset_path` when missing
    #[serde(default)]
    pub sprite_id: Option<String>,
    pub asset_path: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub attributes: Vec<TraitEntry>,
}

impl RawSprite {
    /// Sprite id for this row, falling back to the asset's file stem
    pub fn resolved_sprite_id(&self) -> Option<String> {
        let explicit = self.sprite_id.as_deref().map(str::trim).unwrap_or("");
        let id = if explicit.is_empty() {
            file_stem(self.asset_path.trim())
        } else {
            explicit
        };
        if id.is_empty() { None } else { Some(id.to_string()) }
    }
}

/// Complete raw catalog: sprite rows and color profiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub sprites: Vec<RawSprite>,
    #[serde(default)]
    pub color_profiles: Vec<ColorProfile>,
}

impl CatalogData {
    pub fn from_ron_str(s: &str) -> Result<Self, CatalogLoadError> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogLoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a catalog file, picking the parser from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, CatalogLoadError> = match extension.as_deref() {
            Some("ron") => Self::from_ron_str,
            Some("json") => Self::from_json_str,
            _ => return Err(CatalogLoadError::UnsupportedFormat(path.to_path_buf())),
        };

        let contents = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let data = parse(&contents)?;
        log::info!(
            "Loaded catalog {:?}: {} sprite rows, {} color profiles",
            path,
            data.sprites.len(),
            data.color_profiles.len()
        );
        Ok(data)
    }
}
