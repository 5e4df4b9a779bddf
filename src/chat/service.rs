// src/chat/service.rs
// ChatService: one reply per request, at most two upstream attempts

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::random::RandomSource;
use super::request::{ChatRequest, PreparedTurn};
use super::ChatError;
use crate::config::{ChatConfig, ConfigError};
use crate::llm::{CompletionClient, CompletionRequest, SamplingParams, ChatTurn};
use crate::locale::{Catalog, LanguageCode, LanguageResolver};
use crate::persona::{decode_persona, Gender, Persona};
use crate::pipeline::{PipelineResult, ReplyPipeline};
use crate::prompt::{PromptBuilder, PromptMode};

/// Header-derived language signals; the explicit code comes from the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageHints<'a> {
    pub referer: Option<&'a str>,
    pub accept_language: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub lang: LanguageCode,
    pub delay_ms: u64,
    #[serde(skip)]
    pub used_fallback: bool,
    #[serde(skip)]
    pub attempts: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaReply {
    #[serde(flatten)]
    pub chat: ChatReply,
    pub persona: Persona,
    /// Sampled for this request rather than read from the cookie
    #[serde(skip)]
    pub fresh_persona: bool,
}

pub struct ChatService {
    config: Arc<ChatConfig>,
    catalog: Catalog,
    resolver: LanguageResolver,
    pipeline: ReplyPipeline,
    genders: Vec<Gender>,
    client: Arc<dyn CompletionClient>,
    random: Arc<dyn RandomSource>,
}

impl ChatService {
    pub fn new(
        config: Arc<ChatConfig>,
        client: Arc<dyn CompletionClient>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pipeline = ReplyPipeline::new(config.sanitize_policy()?);
        let genders = config.genders();

        Ok(Self {
            config,
            catalog: Catalog::builtin(),
            resolver: LanguageResolver::default(),
            pipeline,
            genders,
            client,
            random,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn resolve_language(&self, explicit: Option<&str>, hints: LanguageHints<'_>) -> LanguageCode {
        let (code, source) = self
            .resolver
            .resolve_with_source(explicit, hints.referer, hints.accept_language);
        debug!(lang = %code, source = ?source, "Resolved language");
        tracing::Span::current().record("lang", code.as_str());
        code
    }

    /// Plain mode: an anonymous adult stranger.
    pub async fn chat(&self, request: &ChatRequest, hints: LanguageHints<'_>) -> Result<ChatReply, ChatError> {
        let turn = request.prepare(&self.config)?;
        let lang = self.resolve_language(request.lang.as_deref(), hints);
        let mut rng = self.random.rng();

        let (result, attempts) = self.generate(lang, PromptMode::Plain, &turn, &mut rng).await;
        Ok(self.release(result, attempts, lang, &mut rng).await)
    }

    /// Persona mode. The cookie persona is reused for an ongoing chat if it
    /// decodes and validates; otherwise a new one is sampled.
    pub async fn persona_chat(
        &self,
        request: &ChatRequest,
        hints: LanguageHints<'_>,
        cookie: Option<&str>,
    ) -> Result<PersonaReply, ChatError> {
        let turn = request.prepare(&self.config)?;
        let lang = self.resolve_language(request.lang.as_deref(), hints);
        let mut rng = self.random.rng();

        let stored = if turn.is_new_chat() {
            None
        } else {
            cookie.and_then(decode_persona)
        };
        let fresh_persona = stored.is_none();
        let persona = match stored {
            Some(persona) => persona,
            None => Persona::sample(lang, &self.catalog, &self.genders, &mut rng),
        };
        debug!(fresh = fresh_persona, age = persona.age, country = %persona.country, "Session persona");

        let (result, attempts) = self
            .generate(lang, PromptMode::Persona(&persona), &turn, &mut rng)
            .await;
        let chat = self.release(result, attempts, lang, &mut rng).await;

        Ok(PersonaReply {
            chat,
            persona,
            fresh_persona,
        })
    }

    /// Attempt 1, then attempt 2 only if the pipeline rejected attempt 1.
    /// An upstream error on either attempt ends in the fallback.
    async fn generate(
        &self,
        lang: LanguageCode,
        mode: PromptMode<'_>,
        turn: &PreparedTurn,
        rng: &mut StdRng,
    ) -> (PipelineResult, u8) {
        let entry = self.catalog.entry(lang);
        let fallback = entry.pick_fallback(rng);
        let prior = turn.prior_assistant.as_deref();

        let messages = PromptBuilder::build_messages(entry, mode, turn.input());
        let first = match self.attempt(&messages, self.config.sampling(), 1).await {
            Some(candidate) => self.pipeline.produce(&[candidate], prior, fallback),
            None => return (PipelineResult::fallback(fallback), 1),
        };
        if !first.used_fallback {
            return (first, 1);
        }

        debug!("First candidate rejected, retrying with nudge");
        let retry = PromptBuilder::retry_messages(&messages);
        let second = match self.attempt(&retry, self.config.retry_sampling(), 2).await {
            Some(candidate) => self.pipeline.produce(&[candidate], prior, fallback),
            None => PipelineResult::fallback(fallback),
        };
        if second.used_fallback {
            info!(lang = %lang, "No acceptable candidate, using fallback");
        }
        (second, 2)
    }

    async fn attempt(&self, messages: &[ChatTurn], sampling: SamplingParams, attempt: u8) -> Option<String> {
        let request = CompletionRequest {
            messages: messages.to_vec(),
            sampling,
        };
        match self.client.complete(&request).await {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!(attempt, error = %e, "Upstream call failed, falling back");
                None
            }
        }
    }

    fn sample_delay(&self, rng: &mut StdRng) -> u64 {
        if !self.config.typing_delay_enabled() {
            return 0;
        }
        let max = self.config.typing_delay_max_ms;
        rng.random_range(self.config.typing_delay_min_ms.min(max)..=max)
    }

    /// Wait out the typing delay, then hand the reply back.
    async fn release(&self, result: PipelineResult, attempts: u8, lang: LanguageCode, rng: &mut StdRng) -> ChatReply {
        let delay_ms = self.sample_delay(rng);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        ChatReply {
            reply: result.text,
            lang,
            delay_ms,
            used_fallback: result.used_fallback,
            attempts,
        }
    }
}
