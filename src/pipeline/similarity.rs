// src/pipeline/similarity.rs
// Word-set overlap used to catch a reply that parrots the previous one

use std::collections::HashSet;

/// Lowercased words, split on anything that isn't a letter or digit in any script.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// |A ∩ B| / min(|A|, |B|). Zero when either side has no words.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f64 / smaller as f64
}
