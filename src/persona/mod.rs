// src/persona/mod.rs
// Session persona: a fictitious stranger the model plays for one chat.
// Sampled once per session from an injected RNG, then carried in a cookie.

pub mod codec;

pub use codec::{decode_persona, encode_persona};

use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::locale::{Catalog, LanguageCode};

/// Personas are always adults.
pub const AGE_RANGE: RangeInclusive<u8> = 19..=46;

/// Longest country/region accepted back from a client cookie.
pub const MAX_FIELD_CHARS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Ok(Gender::Female),
            "male" | "m" => Ok(Gender::Male),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub gender: Gender,
    pub age: u8,
    pub country: String,
    pub region: String,
}

impl Persona {
    /// Draw a persona for `lang`: gender from `genders`, age from `AGE_RANGE`,
    /// country and region from the language's location pools.
    pub fn sample<R: Rng + ?Sized>(
        lang: LanguageCode,
        catalog: &Catalog,
        genders: &[Gender],
        rng: &mut R,
    ) -> Self {
        let gender = genders.choose(rng).copied().unwrap_or(Gender::Female);
        let age = rng.random_range(AGE_RANGE);
        let (country, region) = match catalog.locations(lang).choose(rng) {
            Some(pool) => (pool.country, pool.regions.choose(rng).copied().unwrap_or(pool.country)),
            None => ("USA", "NY"),
        };

        Self {
            gender,
            age,
            country: country.to_string(),
            region: region.to_string(),
        }
    }

    /// A persona from a client cookie is only trusted if it could have come from `sample`.
    pub fn is_valid(&self) -> bool {
        let field_ok = |s: &str| {
            let trimmed = s.trim();
            !trimmed.is_empty()
                && trimmed.chars().count() <= MAX_FIELD_CHARS
                && !trimmed.chars().any(char::is_control)
        };
        AGE_RANGE.contains(&self.age) && field_ok(&self.country) && field_ok(&self.region)
    }
}
