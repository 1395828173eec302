//! Color profile summaries attached to sprites

use serde::{Deserialize, Serialize};

use crate::file_stem;

/// Summary color statistics for one sprite image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorProfile {
    pub family: String,
    /// Sprite id or image filename the statistics were computed from
    #[serde(alias = "filename")]
    pub sprite_id: String,
    /// Mean hue (degrees, 0-360), saturation (0-1) and value (0-1)
    pub hsv_mean: [f64; 3],
    /// Mean red, green, blue (0-255)
    pub rgb_mean: [f64; 3],
    #[serde(default)]
    pub metrics: ColorMetrics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorMetrics {
    pub colorfulness: f64,
    pub contrast: f64,
}

impl ColorProfile {
    /// Check whether this profile was computed for the given sprite.
    ///
    /// Profiles are often keyed by image filename, so both sides are reduced
    /// to their file stem and compared case-insensitively.
    pub fn matches_sprite(&self, sprite_id: &str) -> bool {
        file_stem(&self.sprite_id).eq_ignore_ascii_case(file_stem(sprite_id))
    }

    pub fn hue(&self) -> f64 {
        self.hsv_mean[0].rem_euclid(360.0)
    }

    /// Angular distance between this profile's mean hue and `hue` (0-180)
    pub fn hue_distance(&self, hue: f64) -> f64 {
        let diff = (self.hue() - hue.rem_euclid(360.0)).abs();
        diff.min(360.0 - diff)
    }

    /// Similarity of mean RGB colors in [0, 1] (1 = identical)
    pub fn rgb_similarity(&self, other: &ColorProfile) -> f64 {
        let max_distance = (3.0 * 255.0_f64 * 255.0).sqrt();
        let distance = self
            .rgb_mean
            .iter()
            .zip(other.rgb_mean.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt();
        (1.0 - distance / max_distance).clamp(0.0, 1.0)
    }
}
