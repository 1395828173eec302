//! Open-ended trait bags
//!
//! Catalog attributes are data-driven, so traits stay a name -> value map
//! rather than a closed struct. Values are either text or numbers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single trait value as it appears in catalog data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Number(f64),
    Text(String),
}

impl TraitValue {
    /// Numeric view of the value. Numeric-looking text ("4", " 2.5") counts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Compare two values the way catalog data means them: numbers by value,
    /// everything else by exact text.
    pub fn matches(&self, other: &TraitValue) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for TraitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TraitValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TraitValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for TraitValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u8> for TraitValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for TraitValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Attribute row in the `[{trait_type, value}]` list form used by catalogs
/// and token metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitEntry {
    pub trait_type: String,
    pub value: TraitValue,
}

/// Mapping from trait name to value
///
/// Backed by a sorted map so serialized output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitMap(BTreeMap<String, TraitValue>);

impl TraitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the attribute-list form. Later rows win on duplicate names.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TraitEntry>,
    {
        let mut map = Self::new();
        for entry in entries {
            if let Some(previous) = map.insert(entry.trait_type.clone(), entry.value) {
                log::debug!(
                    "Duplicate trait '{}' in attribute list, replacing value {}",
                    entry.trait_type,
                    previous
                );
            }
        }
        map
    }

    pub fn get(&self, name: &str) -> Option<&TraitValue> {
        self.0.get(name)
    }

    /// Text value of a trait (numbers are not coerced to text)
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TraitValue::as_text)
    }

    /// Numeric value of a trait, including numeric-looking text
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(TraitValue::as_number)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert a trait, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TraitValue>) -> Option<TraitValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TraitMap
where
    K: Into<String>,
    V: Into<TraitValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text_is_a_number() {
        assert_eq!(TraitValue::from("4").as_number(), Some(4.0));
        assert_eq!(TraitValue::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(TraitValue::from("Grande").as_number(), None);
        assert_eq!(TraitValue::from("NaN").as_number(), None);
    }

    #[test]
    fn test_matches_numbers_by_value() {
        assert!(TraitValue::from("4").matches(&TraitValue::Number(4.0)));
        assert!(!TraitValue::from(3.0).matches(&TraitValue::Number(4.0)));
        assert!(TraitValue::from("Grande").matches(&TraitValue::from("Grande")));
        assert!(!TraitValue::from("Grande").matches(&TraitValue::from("grande")));
    }

    #[test]
    fn test_display_integers_without_fraction() {
        assert_eq!(TraitValue::Number(3.0).to_string(), "3");
        assert_eq!(TraitValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_from_entries_last_row_wins() {
        let map = TraitMap::from_entries(vec![
            TraitEntry {
                trait_type: "Taille".into(),
                value: "Petite".into(),
            },
            TraitEntry {
                trait_type: "Taille".into(),
                value: "Grande".into(),
            },
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.text("Taille"), Some("Grande"));
    }

    #[test]
    fn test_untagged_serde() {
        let map: TraitMap = serde_json::from_str(r#"{"Level": 2, "Taille": "Grande"}"#).unwrap();
        assert_eq!(map.number("Level"), Some(2.0));
        assert_eq!(map.text("Taille"), Some("Grande"));
        assert_eq!(map.text("Level"), None);
    }
}
