//! Localized rich-text values and the text boundaries consumed by the chart
//! builder: entity decoding for axis/legend labels, HTML escaping for tooltip
//! affixes, and icon-markup stripping for location names.
//!
//! The real translation service lives outside this crate; `Translator` is the
//! seam it plugs into.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A display string that is either plain or a `{lang: text}` map.
///
/// The map keeps insertion order so the first entry is a stable fallback when
/// neither the requested language nor English is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLang(IndexMap<String, String>),
}

impl LocalizedText {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    #[must_use]
    pub fn by_lang<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::ByLang(
            entries
                .into_iter()
                .map(|(lang, text)| (lang.into(), text.into()))
                .collect(),
        )
    }

    /// Resolves to the text for `lang`, falling back to English and then to
    /// the first entry.
    #[must_use]
    pub fn resolve(&self, lang: &str) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::ByLang(map) => map
                .get(lang)
                .or_else(|| map.get("en"))
                .or_else(|| map.values().next())
                .map_or("", String::as_str),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_owned())
    }
}

impl From<String> for LocalizedText {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

/// Resolves a localized value to the active-locale string.
pub trait Translator {
    fn translate(&self, text: &LocalizedText) -> String;
}

/// Translator pinned to a single language with English fallback.
#[derive(Debug, Clone)]
pub struct LangTranslator {
    pub lang: String,
}

impl LangTranslator {
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }
}

impl Default for LangTranslator {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Translator for LangTranslator {
    fn translate(&self, text: &LocalizedText) -> String {
        text.resolve(&self.lang).to_owned()
    }
}

/// Replaces HTML character references with their literal characters,
/// e.g. `&deg;` becomes `°`. Unknown references are kept verbatim.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            Some(end) if end > 1 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push_str(&decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let named = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "deg" => Some('°'),
        "micro" => Some('µ'),
        "sup2" => Some('²'),
        "sup3" => Some('³'),
        "middot" => Some('·'),
        "times" => Some('×'),
        "permil" => Some('‰'),
        _ => None,
    };
    if let Some(ch) = named {
        return Some(ch.to_string());
    }

    let code = entity.strip_prefix('#')?;
    let value = match code.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse().ok()?,
    };
    char::from_u32(value).map(|ch| ch.to_string())
}

/// Escapes text for safe embedding inside a tooltip HTML fragment.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Extracts the plain display text from a value that may carry icon markup,
/// dropping tags and collapsing the whitespace left behind.
#[must_use]
pub fn adjust_icon_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }

    let mut out = String::with_capacity(stripped.len());
    for word in decode_entities(&stripped).split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
