// src/pipeline/sanitize.rs
// Turns a raw completion into a short, plain-text chat line

use super::policy::SanitizePolicy;

/// Longest repeated word run that gets collapsed ("i mean i mean").
const MAX_REPEAT_RUN: usize = 4;

/// Terminators that end a sentence even without a following space.
const WIDE_TERMINALS: &[char] = &['。', '！', '？', '｡'];

/// Terminators that need whitespace (or the end of text) after them.
const SPACED_TERMINALS: &[char] = &['.', '!', '?', '…', '‼', '⁇', '⁈', '⁉', '।', '॥', '۔', '؟', '።', '။'];

/// Clean a candidate until it stops changing.
///
/// Each pass strips symbol artifacts, removes forbidden phrases, tidies
/// whitespace, collapses stutters and truncates. Iterating to a fixed point
/// makes `clean(clean(x)) == clean(x)` hold even when one removal exposes
/// another (`"$openai$"` becomes `"$$"`, then nothing). No pass lengthens
/// the text, so the loop ends.
pub fn clean(raw: &str, policy: &SanitizePolicy) -> String {
    let mut current = clean_pass(raw, policy);
    loop {
        let next = clean_pass(&current, policy);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str, policy: &SanitizePolicy) -> String {
    let mut s = text.to_string();
    for rule in &policy.symbol_rules {
        s = rule.pattern.replace_all(&s, rule.replacement).into_owned();
    }
    for phrase in &policy.forbidden_phrases {
        s = phrase.replace_all(&s, "").into_owned();
    }
    for rule in &policy.tidy_rules {
        s = rule.pattern.replace_all(&s, rule.replacement).into_owned();
    }
    let collapsed = collapse_repeats(&s);
    truncate(collapsed.trim(), policy.max_chars, policy.max_sentences)
        .trim()
        .to_string()
}

/// Collapse immediately repeated word runs to one occurrence.
/// The later occurrence wins so its trailing punctuation survives ("go go!" -> "go!").
pub fn collapse_repeats(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<&str> = Vec::with_capacity(words.len());
    let mut i = 0;

    'next: while i < words.len() {
        for n in (1..=MAX_REPEAT_RUN).rev() {
            if out.len() >= n && i + n <= words.len() && same_run(&out[out.len() - n..], &words[i..i + n]) {
                let start = out.len() - n;
                out.truncate(start);
                out.extend_from_slice(&words[i..i + n]);
                i += n;
                continue 'next;
            }
        }
        out.push(words[i]);
        i += 1;
    }

    out.join(" ")
}

fn word_key(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn same_run(a: &[&str], b: &[&str]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            let key = word_key(x);
            !key.is_empty() && key == word_key(y)
        })
}

/// Byte offsets just past each sentence terminator run (closing quotes included).
pub fn sentence_boundaries(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        let mut wide = WIDE_TERMINALS.contains(&c);
        let mut end = idx + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if is_terminal(next) || is_closer(next) {
                wide |= WIDE_TERMINALS.contains(&next);
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_break = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
        if wide || at_break {
            ends.push(end);
        }
    }

    ends
}

fn is_terminal(c: char) -> bool {
    WIDE_TERMINALS.contains(&c) || SPACED_TERMINALS.contains(&c)
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '」' | '』' | '）')
}

/// Keep at most `max_sentences` sentences within `max_chars` characters.
/// Cuts at the last allowed sentence boundary inside the cap; with no
/// boundary inside the cap, cuts hard at the cap.
pub fn truncate(text: &str, max_chars: usize, max_sentences: usize) -> String {
    let cap = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let boundaries = sentence_boundaries(text);
    let trailing_fragment = match boundaries.last() {
        Some(&end) => !text[end..].trim().is_empty(),
        None => !text.is_empty(),
    };
    let sentences = boundaries.len() + usize::from(trailing_fragment);

    if cap == text.len() && sentences <= max_sentences {
        return text.to_string();
    }

    let keep = boundaries
        .iter()
        .copied()
        .filter(|&end| end <= cap)
        .take(max_sentences)
        .last();

    match keep {
        Some(end) => text[..end].to_string(),
        None => text[..cap].to_string(),
    }
}
