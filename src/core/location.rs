//! Location display-name source.
//!
//! A location is opaque to the chart builder: the only behavior is extracting
//! a plain display name from a value that may carry icon markup.

use serde::{Deserialize, Serialize};

use crate::core::text::{LocalizedText, Translator, adjust_icon_text};

/// An observation site, identified only by its (possibly decorated) name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: LocalizedText,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<LocalizedText>) -> Self {
        Self { name: name.into() }
    }

    /// Empty location used when a chart is built without one.
    #[must_use]
    pub fn none() -> Self {
        Self::new("")
    }

    /// Plain display name with icon markup stripped.
    #[must_use]
    pub fn display_name(&self, translator: &dyn Translator) -> String {
        adjust_icon_text(&translator.translate(&self.name))
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Location {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
