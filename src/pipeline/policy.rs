// src/pipeline/policy.rs
// Static sanitization rules, optionally overridden by a TOML file

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;

use crate::config::ConfigError;

/// A pattern and what it gets replaced with. Replacements may only shrink
/// the text, which keeps cleaning convergent.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub pattern: Regex,
    pub replacement: &'static str,
}

impl Rewrite {
    fn builtin(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid builtin regex"),
            replacement,
        }
    }
}

/// Artifacts that give away a machine: reasoning blocks, markdown, LaTeX,
/// invisible letters. Applied in order.
const SYMBOL_RULES: &[(&str, &str)] = &[
    (r"(?s)<think>.*?</think>", ""),
    (r"(?s)<think>.*$", ""),
    (r"```[A-Za-z0-9_+\-]*", ""),
    (r"`+", ""),
    (r"(?i)[\\/]text\{([^}]*)\}", "${1}"),
    (r"\\[()\[\]]", ""),
    (r"\${2,}", ""),
    (r"\*+", ""),
    (r"[<>]{2,}", ""),
    (r"[\u{3164}\u{115F}\u{1160}\u{200B}-\u{200D}\u{FEFF}]", ""),
];

/// Layout tidying, run after the symbol and phrase passes.
const TIDY_RULES: &[(&str, &str)] = &[
    (r"^\s*[-•]\s+", ""),
    (r"\s+", " "),
    (r" ([,.!?;:])", "${1}"),
    (r"^[\s,;:]+", ""),
];

/// Self-disclosures: the phrase goes, the rest of the sentence stays.
pub const DEFAULT_FORBIDDEN_PHRASES: &[&str] = &[
    r"\bas an ai(?: language model| assistant| model)?\b",
    r"\bi(?:'m|’m| am) (?:just )?(?:an? )?(?:ai|bot|chatbot|language model|virtual assistant)\b",
    r"\b(?:large )?language model\b",
    r"\b(?:openai|chatgpt|gpt-?\d(?:\.\d)?(?:-?turbo)?|venice(?:\.ai| ai)?|qwen\d*(?:-\d+b)?|llama ?\d*|anthropic|mistral|deepseek)\b",
];

/// One-word replies that carry no conversation.
pub const DEFAULT_FILLERS: &[&str] = &[
    "ok", "okay", "k", "kk", "hmm", "hm", "mm", "lol", "lmao", "haha", "ha", "yeah", "yep", "sure",
    "cool", "nice", "ㅇㅇ", "ㅋㅋ", "ㅋㅋㅋ", "ㅎㅎ", "嗯", "哈哈", "うん", "はい",
];

#[derive(Debug, Clone)]
pub struct SanitizePolicy {
    pub symbol_rules: Vec<Rewrite>,
    pub tidy_rules: Vec<Rewrite>,
    pub forbidden_phrases: Vec<Regex>,
    /// Lowercased, compared against the candidate stripped of surrounding punctuation
    pub fillers: Vec<String>,
    /// Cap in characters, not bytes
    pub max_chars: usize,
    pub max_sentences: usize,
    pub duplicate_threshold: f64,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            symbol_rules: SYMBOL_RULES.iter().map(|&(p, r)| Rewrite::builtin(p, r)).collect(),
            tidy_rules: TIDY_RULES.iter().map(|&(p, r)| Rewrite::builtin(p, r)).collect(),
            forbidden_phrases: DEFAULT_FORBIDDEN_PHRASES
                .iter()
                .map(|p| compile_phrase(p).expect("valid builtin regex"))
                .collect(),
            fillers: DEFAULT_FILLERS.iter().map(|f| f.to_string()).collect(),
            max_chars: 200,
            max_sentences: 2,
            duplicate_threshold: 0.8,
        }
    }
}

/// Overrides read from `POLICY_FILE`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    pub forbidden_phrases: Option<Vec<String>>,
    pub fillers: Option<Vec<String>>,
    pub max_chars: Option<usize>,
    pub max_sentences: Option<usize>,
    pub duplicate_threshold: Option<f64>,
}

impl SanitizePolicy {
    /// Replace the numeric limits, keeping them in a usable range.
    pub fn with_limits(mut self, max_chars: usize, max_sentences: usize, duplicate_threshold: f64) -> Self {
        self.max_chars = max_chars.max(1);
        self.max_sentences = max_sentences.max(1);
        self.duplicate_threshold = duplicate_threshold.clamp(0.0, 1.0);
        self
    }

    pub fn apply_file(mut self, file: PolicyFile) -> Result<Self, ConfigError> {
        if let Some(phrases) = file.forbidden_phrases {
            self.forbidden_phrases = phrases.iter().map(|p| compile_phrase(p)).collect::<Result<_, _>>()?;
        }
        if let Some(fillers) = file.fillers {
            self.fillers = fillers.into_iter().map(|f| f.trim().to_lowercase()).collect();
        }
        let max_chars = file.max_chars.unwrap_or(self.max_chars);
        let max_sentences = file.max_sentences.unwrap_or(self.max_sentences);
        let threshold = file.duplicate_threshold.unwrap_or(self.duplicate_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "duplicate_threshold must be within 0..=1, got {threshold}"
            )));
        }
        Ok(self.with_limits(max_chars, max_sentences, threshold))
    }

    pub fn apply_toml_str(self, content: &str) -> Result<Self, ConfigError> {
        let file: PolicyFile = toml::from_str(content)?;
        self.apply_file(file)
    }

    pub fn load_overrides(self, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        self.apply_toml_str(&content)
    }

    pub fn is_filler(&self, text: &str) -> bool {
        let core = text
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        core.is_empty() || self.fillers.iter().any(|f| *f == core)
    }
}

fn compile_phrase(pattern: &str) -> Result<Regex, ConfigError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}
