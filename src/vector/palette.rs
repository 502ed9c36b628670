use std::collections::{HashMap, HashSet};

use crate::foundation::core::Rgb;
use crate::foundation::error::{SimvisError, SimvisResult};

/// Palette entry. `rgb` may be absent; using such an entry is a configuration error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedColor {
    /// Identifier shape items refer to.
    pub id: String,
    /// Color value, if the entry declares one.
    pub rgb: Option<Rgb>,
}

impl IndexedColor {
    /// Entry with a color value.
    pub fn new(id: impl Into<String>, rgb: Rgb) -> Self {
        Self {
            id: id.into(),
            rgb: Some(rgb),
        }
    }
}

/// Named color table of one vector description. Ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<IndexedColor>,
}

impl Palette {
    /// Build a palette, rejecting duplicate ids.
    pub fn new(colors: Vec<IndexedColor>) -> SimvisResult<Self> {
        let mut seen = HashSet::with_capacity(colors.len());
        for c in &colors {
            if !seen.insert(c.id.as_str()) {
                return Err(SimvisError::config(format!(
                    "duplicate color id '{}' in palette",
                    c.id
                )));
            }
        }
        Ok(Self { colors })
    }

    /// Entries in declaration order.
    pub fn colors(&self) -> &[IndexedColor] {
        &self.colors
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Return `true` when the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Linear lookup by id.
    pub fn resolve(&self, id: &str) -> SimvisResult<Rgb> {
        let entry = self
            .colors
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SimvisError::config(format!("invalid color: '{id}'")))?;
        entry
            .rgb
            .ok_or_else(|| SimvisError::config(format!("color '{id}' has no RGB value")))
    }

    /// Replace the RGB value of every entry whose id appears in `overrides`.
    ///
    /// Ids that are not in the palette are ignored.
    pub fn with_overrides(&self, overrides: &HashMap<String, Rgb>) -> Self {
        let colors = self
            .colors
            .iter()
            .map(|c| match overrides.get(&c.id) {
                Some(rgb) => IndexedColor {
                    id: c.id.clone(),
                    rgb: Some(*rgb),
                },
                None => c.clone(),
            })
            .collect();
        Self { colors }
    }
}
