// src/config/mod.rs
// Service configuration, loaded once from the environment (and .env) at startup.
// Passed around explicitly as Arc<ChatConfig>; nothing here is mutated at runtime.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::llm::SamplingParams;
use crate::persona::Gender;
use crate::pipeline::SanitizePolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid policy file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    // ── Upstream completion API
    pub api_key: String,
    pub upstream_base_url: String,
    pub model: String,
    pub upstream_timeout_secs: u64,

    // ── Sampling
    pub temperature: f32,
    pub retry_temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,

    // ── Typing delay (milliseconds, 0/0 disables)
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,

    // ── Request limits
    pub max_message_chars: usize,
    pub max_history_chars: usize,
    pub max_history_turns: usize,
    pub history_turn_clip: usize,
    pub history_window: usize,
    pub max_body_bytes: usize,

    // ── Reply sanitization
    pub reply_max_chars: usize,
    pub reply_max_sentences: usize,
    pub duplicate_threshold: f64,
    pub policy_file: Option<PathBuf>,

    // ── Session cookie
    pub persona_cookie: String,
    pub cookie_secure: bool,
    pub persona_genders: String,

    // ── Server
    pub host: String,
    pub port: u16,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            upstream_base_url: "https://api.venice.ai/api/v1".to_string(),
            model: "venice-uncensored".to_string(),
            upstream_timeout_secs: 8,
            temperature: 0.8,
            retry_temperature: 0.95,
            max_tokens: 140,
            presence_penalty: 0.2,
            frequency_penalty: 0.2,
            typing_delay_min_ms: 1200,
            typing_delay_max_ms: 2200,
            max_message_chars: 1000,
            max_history_chars: 20_000,
            max_history_turns: 100,
            history_turn_clip: 800,
            history_window: 40,
            max_body_bytes: 64 * 1024,
            reply_max_chars: 200,
            reply_max_sentences: 2,
            duplicate_threshold: 0.8,
            policy_file: None,
            persona_cookie: "rcs_persona".to_string(),
            cookie_secure: true,
            persona_genders: "female".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8788,
        }
    }
}

/// Parse an env value, ignoring a trailing `# comment` and surrounding whitespace.
fn parse_value<T: FromStr>(raw: &str) -> Option<T> {
    raw.split('#').next().unwrap_or("").trim().parse::<T>().ok()
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => match parse_value(&val) {
            Some(parsed) => {
                debug!("Config: {} set from environment", key);
                parsed
            }
            None => {
                warn!("Config: {} = '{}' could not be parsed, using default", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

/// Load `.env` into the process environment. Returns false when there is none.
pub fn load_env_file() -> bool {
    dotenvy::dotenv().is_ok()
}

/// Log output style, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "full" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(ConfigError::Invalid(format!("unknown LOG_FORMAT '{other}'"))),
        }
    }
}

impl LogFormat {
    /// Read before the subscriber exists, so an unknown value falls back silently.
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| parse_value(&v))
            .unwrap_or_default()
    }
}

impl ChatConfig {
    /// Reads the process environment. Call `load_env_file` first to pick up `.env`.
    pub fn from_env() -> Self {
        let d = Self::default();
        let api_key = std::env::var("UPSTREAM_API_KEY")
            .or_else(|_| std::env::var("VENICE_API_KEY"))
            .unwrap_or_default();
        let policy_file = std::env::var("POLICY_FILE")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Self {
            api_key: api_key.trim().to_string(),
            upstream_base_url: env_var_or("UPSTREAM_BASE_URL", d.upstream_base_url),
            model: env_var_or("UPSTREAM_MODEL", d.model),
            upstream_timeout_secs: env_var_or("UPSTREAM_TIMEOUT_SECS", d.upstream_timeout_secs),
            temperature: env_var_or("CHAT_TEMPERATURE", d.temperature),
            retry_temperature: env_var_or("CHAT_RETRY_TEMPERATURE", d.retry_temperature),
            max_tokens: env_var_or("CHAT_MAX_TOKENS", d.max_tokens),
            presence_penalty: env_var_or("CHAT_PRESENCE_PENALTY", d.presence_penalty),
            frequency_penalty: env_var_or("CHAT_FREQUENCY_PENALTY", d.frequency_penalty),
            typing_delay_min_ms: env_var_or("TYPING_DELAY_MIN_MS", d.typing_delay_min_ms),
            typing_delay_max_ms: env_var_or("TYPING_DELAY_MAX_MS", d.typing_delay_max_ms),
            max_message_chars: env_var_or("MAX_MESSAGE_CHARS", d.max_message_chars),
            max_history_chars: env_var_or("MAX_HISTORY_CHARS", d.max_history_chars),
            max_history_turns: env_var_or("MAX_HISTORY_TURNS", d.max_history_turns),
            history_turn_clip: env_var_or("HISTORY_TURN_CLIP", d.history_turn_clip),
            history_window: env_var_or("HISTORY_WINDOW", d.history_window),
            max_body_bytes: env_var_or("MAX_BODY_BYTES", d.max_body_bytes),
            reply_max_chars: env_var_or("REPLY_MAX_CHARS", d.reply_max_chars),
            reply_max_sentences: env_var_or("REPLY_MAX_SENTENCES", d.reply_max_sentences),
            duplicate_threshold: env_var_or("DUPLICATE_THRESHOLD", d.duplicate_threshold),
            policy_file,
            persona_cookie: env_var_or("PERSONA_COOKIE", d.persona_cookie),
            cookie_secure: env_var_or("COOKIE_SECURE", d.cookie_secure),
            persona_genders: env_var_or("PERSONA_GENDERS", d.persona_genders),
            host: env_var_or("HOST", d.host),
            port: env_var_or("PORT", d.port),
        }
    }

    /// Reject combinations that would make the service misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.typing_delay_min_ms > self.typing_delay_max_ms {
            return Err(ConfigError::Invalid(format!(
                "TYPING_DELAY_MIN_MS ({}) exceeds TYPING_DELAY_MAX_MS ({})",
                self.typing_delay_min_ms, self.typing_delay_max_ms
            )));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECS must be positive".into()));
        }
        if self.persona_cookie.is_empty()
            || !self.persona_cookie.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Invalid(format!(
                "PERSONA_COOKIE '{}' is not a valid cookie name",
                self.persona_cookie
            )));
        }
        if self.genders().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "PERSONA_GENDERS '{}' names no known gender",
                self.persona_genders
            )));
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(ConfigError::Invalid("DUPLICATE_THRESHOLD must be within 0..=1".into()));
        }
        Ok(())
    }

    /// Builtin policy with this deployment's limits and optional file overrides.
    pub fn sanitize_policy(&self) -> Result<SanitizePolicy, ConfigError> {
        let policy = SanitizePolicy::default().with_limits(
            self.reply_max_chars,
            self.reply_max_sentences,
            self.duplicate_threshold,
        );
        match &self.policy_file {
            Some(path) => policy.load_overrides(path),
            None => Ok(policy),
        }
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }

    /// Same as `sampling` with the retry temperature.
    pub fn retry_sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.retry_temperature,
            ..self.sampling()
        }
    }

    /// Comma-separated `PERSONA_GENDERS`, unknown entries skipped.
    pub fn genders(&self) -> Vec<Gender> {
        self.persona_genders
            .split(',')
            .filter_map(|g| g.parse().ok())
            .collect()
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn typing_delay_enabled(&self) -> bool {
        self.typing_delay_max_ms > 0
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.upstream_base_url.trim_end_matches('/'))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
