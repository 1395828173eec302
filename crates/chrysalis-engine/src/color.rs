//! Color profile matching
//!
//! Profiles are cosmetic, so matching never fails: it degrades through
//! progressively weaker heuristics and reports a warning when it has to fall
//! back to a family-level default.

use chrysalis_catalog::{ColorProfile, SpriteRecord};

use crate::DataIntegrityWarning;

/// Hue (degrees) for color names commonly found in catalog traits
const NAMED_HUES: &[(&str, f64)] = &[
    ("rouge", 0.0),
    ("red", 0.0),
    ("orange", 30.0),
    ("marron", 25.0),
    ("brown", 25.0),
    ("brun", 25.0),
    ("jaune", 60.0),
    ("yellow", 60.0),
    ("or", 50.0),
    ("gold", 50.0),
    ("vert", 120.0),
    ("green", 120.0),
    ("cyan", 180.0),
    ("turquoise", 175.0),
    ("bleu", 240.0),
    ("blue", 240.0),
    ("violet", 280.0),
    ("purple", 280.0),
    ("rose", 330.0),
    ("pink", 330.0),
];

/// Look up the hue of a color name ("Rouge", "dark blue", ...)
pub fn named_hue(name: &str) -> Option<f64> {
    let lower = name.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            NAMED_HUES
                .iter()
                .find(|(color, _)| *color == word)
                .map(|(_, hue)| *hue)
        })
}

/// Outcome of resolving a color profile for one sprite
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatch {
    pub profile: Option<ColorProfile>,
    pub warning: Option<DataIntegrityWarning>,
}

/// Resolves the color profile belonging to a sprite
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatcher {
    /// Trait whose value names the sprite's dominant color
    color_trait: Option<String>,
}

impl Default for ColorMatcher {
    fn default() -> Self {
        Self::new(Some("Couleur".to_string()))
    }
}

impl ColorMatcher {
    pub fn new(color_trait: Option<String>) -> Self {
        Self { color_trait }
    }

    /// Find the profile for `sprite` among its family's profiles.
    ///
    /// Order: exact sprite id, filename stem, dominant color (nearest hue to
    /// the color named by the sprite's color trait), then the family's first
    /// profile with a warning.
    pub fn resolve(&self, profiles: &[ColorProfile], sprite: &SpriteRecord) -> ColorMatch {
        let found = profiles
            .iter()
            .find(|p| p.sprite_id == sprite.sprite_id)
            .or_else(|| {
                profiles.iter().find(|p| {
                    p.matches_sprite(&sprite.sprite_id) || p.matches_sprite(&sprite.asset_path)
                })
            })
            .or_else(|| self.nearest_by_dominant_color(profiles, sprite));

        if let Some(profile) = found {
            return ColorMatch {
                profile: Some(profile.clone()),
                warning: None,
            };
        }

        match profiles.first() {
            Some(first) => ColorMatch {
                profile: Some(first.clone()),
                warning: Some(
                    DataIntegrityWarning::ColorProfileFallback {
                        family: sprite.family.clone(),
                        sprite_id: sprite.sprite_id.clone(),
                    }
                    .raise(),
                ),
            },
            None => ColorMatch {
                profile: None,
                warning: Some(
                    DataIntegrityWarning::ColorProfileMissing {
                        family: sprite.family.clone(),
                    }
                    .raise(),
                ),
            },
        }
    }

    fn nearest_by_dominant_color<'a>(
        &self,
        profiles: &'a [ColorProfile],
        sprite: &SpriteRecord,
    ) -> Option<&'a ColorProfile> {
        let trait_name = self.color_trait.as_deref()?;
        let hue = sprite
            .attributes
            .get(trait_name)
            .map(ToString::to_string)
            .and_then(|name| named_hue(&name))?;

        profiles
            .iter()
            .min_by(|a, b| a.hue_distance(hue).total_cmp(&b.hue_distance(hue)))
    }
}

/// Color similarity between a creature's profile and a candidate family,
/// using the family's first profile as representative. 0 when either is missing.
pub fn family_color_score(current: Option<&ColorProfile>, family_profiles: &[ColorProfile]) -> f64 {
    match (current, family_profiles.first()) {
        (Some(current), Some(representative)) => current.rgb_similarity(representative),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrysalis_catalog::{ColorMetrics, TraitMap};

    fn profile(sprite_id: &str, hue: f64) -> ColorProfile {
        ColorProfile {
            family: "moth".into(),
            sprite_id: sprite_id.into(),
            hsv_mean: [hue, 0.5, 0.5],
            rgb_mean: [100.0, 100.0, 100.0],
            metrics: ColorMetrics::default(),
        }
    }

    fn sprite(id: &str, color: Option<&str>) -> SpriteRecord {
        let mut attributes = TraitMap::new();
        if let Some(color) = color {
            attributes.insert("Couleur", color);
        }
        SpriteRecord {
            sprite_id: id.into(),
            family: "moth".into(),
            asset_path: format!("art/{id}.png"),
            display_name: id.into(),
            lore: String::new(),
            attributes,
        }
    }

    #[test]
    fn test_named_hue() {
        assert_eq!(named_hue("Rouge"), Some(0.0));
        assert_eq!(named_hue("dark blue"), Some(240.0));
        assert_eq!(named_hue("Gris"), None);
    }

    #[test]
    fn test_exact_match() {
        let profiles = vec![profile("m1", 0.0), profile("m2", 120.0)];
        let result = ColorMatcher::default().resolve(&profiles, &sprite("m2", None));
        assert_eq!(result.profile.unwrap().sprite_id, "m2");
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_filename_match() {
        let profiles = vec![profile("m1.png", 0.0), profile("M2.PNG", 120.0)];
        let result = ColorMatcher::default().resolve(&profiles, &sprite("m2", None));
        assert_eq!(result.profile.unwrap().sprite_id, "M2.PNG");
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_dominant_color_match() {
        let profiles = vec![profile("x", 10.0), profile("y", 230.0), profile("z", 120.0)];
        let result = ColorMatcher::default().resolve(&profiles, &sprite("m9", Some("Bleu")));
        assert_eq!(result.profile.unwrap().sprite_id, "y");
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_dominant_color_disabled() {
        let profiles = vec![profile("x", 10.0), profile("y", 230.0)];
        let result = ColorMatcher::new(None).resolve(&profiles, &sprite("m9", Some("Bleu")));
        assert_eq!(result.profile.unwrap().sprite_id, "x");
        assert!(matches!(
            result.warning,
            Some(DataIntegrityWarning::ColorProfileFallback { .. })
        ));
    }

    #[test]
    fn test_first_profile_fallback() {
        let profiles = vec![profile("x", 10.0), profile("y", 230.0)];
        let result = ColorMatcher::default().resolve(&profiles, &sprite("m9", None));
        assert_eq!(result.profile.unwrap().sprite_id, "x");
        assert_eq!(
            result.warning,
            Some(DataIntegrityWarning::ColorProfileFallback {
                family: "moth".into(),
                sprite_id: "m9".into(),
            })
        );
    }

    #[test]
    fn test_no_profiles() {
        let result = ColorMatcher::default().resolve(&[], &sprite("m9", None));
        assert!(result.profile.is_none());
        assert!(matches!(
            result.warning,
            Some(DataIntegrityWarning::ColorProfileMissing { .. })
        ));
    }

    #[test]
    fn test_family_color_score() {
        let current = profile("c", 0.0);
        assert!((family_color_score(Some(&current), &[profile("x", 0.0)]) - 1.0).abs() < 1e-12);
        assert_eq!(family_color_score(None, &[profile("x", 0.0)]), 0.0);
        assert_eq!(family_color_score(Some(&current), &[]), 0.0);
    }
}
