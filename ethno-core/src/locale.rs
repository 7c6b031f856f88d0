//! Localized display names for entity ids.
//!
//! Entity ids are filesystem-derived ASCII slugs; the user-facing names
//! live in a small TOML table:
//!
//! ```toml
//! [names]
//! russian = "Русские"
//! yakut = "Якуты"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from loading a locale table.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    #[serde(default)]
    names: HashMap<String, String>,
}

/// Entity id → display name table with an inverse lookup.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    names: HashMap<String, String>,
}

impl Localizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `[names]` table from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LocaleError> {
        let content = fs::read_to_string(path)?;
        let parsed: LocaleFile = toml::from_str(&content)?;
        Ok(Self {
            names: parsed.names,
        })
    }

    pub fn insert(&mut self, id: impl Into<String>, display: impl Into<String>) {
        self.names.insert(id.into(), display.into());
    }

    /// Display name for an entity id, falling back to the id itself.
    pub fn display<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Inverse lookup: entity id owning a display name, if any.
    pub fn entity_id(&self, display: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, name)| name.as_str() == display)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Localizer {
        let mut loc = Localizer::new();
        loc.insert("russian", "Русские");
        loc.insert("yakut", "Якуты");
        loc
    }

    #[test]
    fn test_display_and_fallback() {
        let loc = sample();
        assert_eq!(loc.display("russian"), "Русские");
        assert_eq!(loc.display("unknown"), "unknown");
    }

    #[test]
    fn test_inverse_lookup() {
        let loc = sample();
        assert_eq!(loc.entity_id("Якуты"), Some("yakut"));
        assert_eq!(loc.entity_id("Нет таких"), None);
    }

    #[test]
    fn test_load_from_toml() {
        let loc: LocaleFile =
            toml::from_str("[names]\nrussian = \"Русские\"\n").expect("parse toml");
        assert_eq!(loc.names.get("russian").map(String::as_str), Some("Русские"));
    }

    #[test]
    fn test_load_missing_names_table() {
        let loc: LocaleFile = toml::from_str("").expect("parse toml");
        assert!(loc.names.is_empty());
    }
}
