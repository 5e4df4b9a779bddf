// src/pipeline/mod.rs
// Reply pipeline: clean upstream candidates and pick the first acceptable one.
// Pure: no I/O, no randomness. The caller fetches candidates and chooses the fallback.

pub mod policy;
pub mod sanitize;
pub mod similarity;

pub use policy::{PolicyFile, SanitizePolicy};
pub use sanitize::clean;
pub use similarity::overlap_ratio;

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub text: String,
    pub used_fallback: bool,
}

impl PipelineResult {
    pub fn fallback(text: &str) -> Self {
        Self {
            text: text.to_string(),
            used_fallback: true,
        }
    }
}

/// Why a candidate was kept or dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(String),
    Empty,
    Filler(String),
    Duplicate { text: String, ratio: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct ReplyPipeline {
    policy: SanitizePolicy,
}

impl ReplyPipeline {
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    pub fn clean(&self, raw: &str) -> String {
        clean(raw, &self.policy)
    }

    /// Clean one candidate and judge it against the prior assistant turn.
    pub fn assess(&self, raw: &str, prior_assistant_turn: Option<&str>) -> Verdict {
        let text = self.clean(raw);
        if text.is_empty() {
            return Verdict::Empty;
        }
        if self.policy.is_filler(&text) {
            return Verdict::Filler(text);
        }
        if let Some(prior) = prior_assistant_turn.filter(|p| !p.trim().is_empty()) {
            let ratio = overlap_ratio(&text, prior);
            if ratio >= self.policy.duplicate_threshold {
                return Verdict::Duplicate { text, ratio };
            }
        }
        Verdict::Accepted(text)
    }

    /// First acceptable candidate in order, or `fallback_text` with `used_fallback` set.
    pub fn produce<S: AsRef<str>>(
        &self,
        candidates: &[S],
        prior_assistant_turn: Option<&str>,
        fallback_text: &str,
    ) -> PipelineResult {
        for (attempt, candidate) in candidates.iter().enumerate() {
            match self.assess(candidate.as_ref(), prior_assistant_turn) {
                Verdict::Accepted(text) => {
                    debug!(attempt, "Candidate accepted");
                    return PipelineResult { text, used_fallback: false };
                }
                verdict => debug!(attempt, ?verdict, "Candidate rejected"),
            }
        }
        PipelineResult::fallback(fallback_text)
    }
}
