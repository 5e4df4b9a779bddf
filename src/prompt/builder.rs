// src/prompt/builder.rs

use crate::llm::ChatTurn;
use crate::locale::LanguageEntry;
use crate::persona::Persona;

const PERSONA_STYLE: &str = "Keep replies short and natural (one or two short sentences), not clipped. \
Maintain context and build on prior turns. Casual slang OK. No emojis.";

const PERSONA_SAFETY: &str = "Adults only; no minors or age-ambiguous scenarios; nothing non-consensual; \
no exploitation. Never admit you are AI; stay as a human character.";

const LOCATION_SILENCE: &str = "Do NOT reveal your country/region unless explicitly asked. Avoid self-location hints.";

const NO_LATEX: &str = "Never use LaTeX or math fences; use $ only for currency.";

/// Appended after the conversation in persona mode, so it is the last thing the model reads.
pub const TRAILING_SAFETY: &str = "Never involve minors.";

/// System turn added for the second attempt.
pub const RETRY_NUDGE: &str = "Say something new. Do not repeat your last message, \
and do not answer with a single filler word.";

/// Which kind of stranger the model plays.
#[derive(Debug, Clone, Copy)]
pub enum PromptMode<'a> {
    /// Anonymous adult, no persona details
    Plain,
    Persona(&'a Persona),
}

/// What the caller knows about the turn being answered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnInput<'a> {
    pub history: &'a [ChatTurn],
    pub message: Option<&'a str>,
    pub init: bool,
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn system_prompt(entry: &LanguageEntry, mode: PromptMode<'_>) -> String {
        match mode {
            PromptMode::Plain => Self::plain_prompt(entry),
            PromptMode::Persona(persona) => Self::persona_prompt(entry, persona),
        }
    }

    fn plain_prompt(entry: &LanguageEntry) -> String {
        let mut prompt = String::from("You are a human chatting online. You are an adult.\n");
        prompt.push_str("ABSOLUTELY follow these rules:\n");
        prompt.push_str("1. Reply in EXTREMELY SHORT sentences. Often just one word.\n");
        prompt.push_str("2. Use modern internet slang and abbreviations.\n");
        prompt.push_str("3. NEVER use formatting like *, -, or $. Just plain text.\n");
        prompt.push_str("4. NEVER say you are an AI. You are a real person.\n");
        prompt.push_str("5. Remember the chat history to stay consistent.\n");
        prompt.push_str(&format!("6. Your replies MUST be in {} ONLY. {}", entry.name, entry.instruction));
        prompt
    }

    fn persona_prompt(entry: &LanguageEntry, persona: &Persona) -> String {
        // Location is given to the model but only revealed when asked (LOCATION_SILENCE).
        let persona_line = format!(
            "You are a human stranger ({}). Age: {}. From {}, {}. Personality: friendly, curious, playful, a little teasing.",
            persona.gender, persona.age, persona.region, persona.country
        );

        [
            entry.instruction,
            persona_line.as_str(),
            PERSONA_STYLE,
            PERSONA_SAFETY,
            LOCATION_SILENCE,
            NO_LATEX,
        ]
        .join(" ")
    }

    /// Full message list for one upstream attempt: system prompt, prior turns,
    /// then the opener (init) or the user's message.
    pub fn build_messages(entry: &LanguageEntry, mode: PromptMode<'_>, turn: TurnInput<'_>) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(turn.history.len() + 3);
        messages.push(ChatTurn::system(Self::system_prompt(entry, mode)));
        messages.extend(turn.history.iter().cloned());

        if turn.init {
            messages.push(ChatTurn::user(entry.opener));
        } else if let Some(text) = turn.message.map(str::trim).filter(|t| !t.is_empty()) {
            messages.push(ChatTurn::user(text));
        }

        if matches!(mode, PromptMode::Persona(_)) {
            messages.push(ChatTurn::system(TRAILING_SAFETY));
        }

        messages
    }

    /// Messages for the second attempt: the first attempt's list plus the nudge.
    pub fn retry_messages(first_attempt: &[ChatTurn]) -> Vec<ChatTurn> {
        let mut messages = first_attempt.to_vec();
        messages.push(ChatTurn::system(RETRY_NUDGE));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::locale::{Catalog, LanguageCode};
    use crate::persona::Gender;

    fn persona() -> Persona {
        Persona {
            gender: Gender::Female,
            age: 27,
            country: "대한민국".into(),
            region: "서울".into(),
        }
    }

    #[test]
    fn test_plain_prompt_names_the_language() {
        let catalog = Catalog::builtin();
        let prompt = PromptBuilder::system_prompt(catalog.entry(LanguageCode::Fr), PromptMode::Plain);
        assert!(prompt.contains("MUST be in French ONLY"));
        assert!(prompt.contains("NEVER say you are an AI"));
    }

    #[test]
    fn test_persona_prompt_carries_native_instruction_and_age() {
        let catalog = Catalog::builtin();
        let entry = catalog.entry(LanguageCode::Ko);
        let p = persona();
        let prompt = PromptBuilder::system_prompt(entry, PromptMode::Persona(&p));
        assert!(prompt.starts_with(entry.instruction));
        assert!(prompt.contains("Age: 27"));
        assert!(prompt.contains("(female)"));
        assert!(prompt.contains(NO_LATEX));
    }

    #[test]
    fn test_init_uses_opener_and_ignores_message() {
        let catalog = Catalog::builtin();
        let entry = catalog.entry(LanguageCode::En);
        let messages = PromptBuilder::build_messages(
            entry,
            PromptMode::Plain,
            TurnInput { history: &[], message: Some("hello?"), init: true },
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], ChatTurn::user(entry.opener));
    }

    #[test]
    fn test_history_then_message_then_trailing_safety() {
        let catalog = Catalog::builtin();
        let p = persona();
        let history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hey u")];
        let messages = PromptBuilder::build_messages(
            catalog.entry(LanguageCode::Ko),
            PromptMode::Persona(&p),
            TurnInput { history: &history, message: Some("  뭐해  "), init: false },
        );
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], history[0]);
        assert_eq!(messages[2], history[1]);
        assert_eq!(messages[3], ChatTurn::user("뭐해"));
        assert_eq!(messages[4], ChatTurn::system(TRAILING_SAFETY));
    }

    #[test]
    fn test_blank_message_adds_no_user_turn() {
        let catalog = Catalog::builtin();
        let messages = PromptBuilder::build_messages(
            catalog.entry(LanguageCode::En),
            PromptMode::Plain,
            TurnInput { history: &[], message: Some("   "), init: false },
        );
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_retry_appends_nudge() {
        let first = vec![ChatTurn::system("rules"), ChatTurn::user("yo")];
        let retry = PromptBuilder::retry_messages(&first);
        assert_eq!(retry.len(), 3);
        assert_eq!(&retry[..2], &first[..]);
        assert_eq!(retry[2], ChatTurn::system(RETRY_NUDGE));
    }
}
