// src/locale/mod.rs
// Language codes, request language resolution, and the static per-language catalog

pub mod catalog;
pub mod resolver;

pub use catalog::{Catalog, LanguageEntry, LocationPool};
pub use resolver::LanguageResolver;

use serde::{Deserialize, Serialize};

/// Closed set of languages the chat can speak.
/// Anything that doesn't normalize to one of these resolves to `En`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LanguageCode {
    #[default]
    En,
    Cn,
    Es,
    Ko,
    Ja,
    Fr,
    It,
    Nl,
    Pt,
    Hi,
    Ar,
    Bn,
    Ru,
    Vi,
    Id,
    Th,
    My,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 17] = [
        LanguageCode::En,
        LanguageCode::Cn,
        LanguageCode::Es,
        LanguageCode::Ko,
        LanguageCode::Ja,
        LanguageCode::Fr,
        LanguageCode::It,
        LanguageCode::Nl,
        LanguageCode::Pt,
        LanguageCode::Hi,
        LanguageCode::Ar,
        LanguageCode::Bn,
        LanguageCode::Ru,
        LanguageCode::Vi,
        LanguageCode::Id,
        LanguageCode::Th,
        LanguageCode::My,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "EN",
            LanguageCode::Cn => "CN",
            LanguageCode::Es => "ES",
            LanguageCode::Ko => "KO",
            LanguageCode::Ja => "JA",
            LanguageCode::Fr => "FR",
            LanguageCode::It => "IT",
            LanguageCode::Nl => "NL",
            LanguageCode::Pt => "PT",
            LanguageCode::Hi => "HI",
            LanguageCode::Ar => "AR",
            LanguageCode::Bn => "BN",
            LanguageCode::Ru => "RU",
            LanguageCode::Vi => "VI",
            LanguageCode::Id => "ID",
            LanguageCode::Th => "TH",
            LanguageCode::My => "MY",
        }
    }

    /// Exact, case-insensitive match against the known codes.
    pub fn from_exact(code: &str) -> Option<Self> {
        let upper = code.trim().to_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == upper)
    }

    /// Normalize free-form input: uppercase, exact match, then the leading
    /// two characters, then the ISO aliases. `None` means "not recognized".
    pub fn normalize(input: &str) -> Option<Self> {
        let upper = input.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }
        if let Some(code) = Self::from_exact(&upper) {
            return Some(code);
        }
        let leading: String = upper.chars().take(2).collect();
        if leading.chars().count() == 2 {
            if let Some(code) = Self::from_exact(&leading) {
                return Some(code);
            }
        }
        Self::from_alias(&leading)
    }

    fn from_alias(code: &str) -> Option<Self> {
        match code {
            "ZH" => Some(LanguageCode::Cn),
            _ => None,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or(())
    }
}
