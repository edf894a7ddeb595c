//! Active-language selection for localized storefront text.
//!
//! Catalog rows store three text variants side by side (Arabic, English,
//! Hebrew). Display code resolves one variant per active language with a
//! fixed fallback chain: requested language, then Arabic, then English.
//! Resolution never alters stored data; it picks a field.

use serde::{Deserialize, Serialize};

/// Storefront display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Arabic (the store's primary language).
    #[default]
    Arabic,
    /// English.
    English,
    /// Hebrew.
    Hebrew,
}

impl Language {
    /// ISO 639-1 code for this language.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::English => "en",
            Self::Hebrew => "he",
        }
    }

    /// Parse an ISO 639-1 code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "ar" => Some(Self::Arabic),
            "en" => Some(Self::English),
            "he" => Some(Self::Hebrew),
            _ => None,
        }
    }

    /// Whether this language renders right-to-left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Arabic | Self::Hebrew)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A piece of text stored in all three storefront languages.
///
/// Fields map 1:1 to the backend's `*_ar` / `*_en` / `*_he` columns. Empty
/// strings count as missing for fallback purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    /// Arabic variant.
    pub ar: String,
    /// English variant.
    pub en: String,
    /// Hebrew variant.
    pub he: String,
}

impl LocalizedText {
    /// Build from the three stored variants.
    #[must_use]
    pub fn new(
        ar: impl Into<String>,
        en: impl Into<String>,
        he: impl Into<String>,
    ) -> Self {
        Self {
            ar: ar.into(),
            en: en.into(),
            he: he.into(),
        }
    }

    /// Resolve the display text for `lang`.
    ///
    /// Fallback order: requested language, then Arabic, then English. Returns
    /// an empty string only when all three variants are empty.
    #[must_use]
    pub fn resolve(&self, lang: Language) -> &str {
        let requested = self.variant(lang);
        if !requested.is_empty() {
            return requested;
        }
        if !self.ar.is_empty() {
            return &self.ar;
        }
        &self.en
    }

    /// The stored variant for `lang`, without fallback.
    #[must_use]
    pub fn variant(&self, lang: Language) -> &str {
        match lang {
            Language::Arabic => &self.ar,
            Language::English => &self.en,
            Language::Hebrew => &self.he,
        }
    }

    /// Whether all variants are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ar.is_empty() && self.en.is_empty() && self.he.is_empty()
    }
}
