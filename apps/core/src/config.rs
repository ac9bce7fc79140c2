//! Startup configuration, read from the environment (and `.env` if present).

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::attachments::{AttachmentPolicy, DEFAULT_MAX_ATTACHMENT_BYTES};
use crate::error::AppError;
use crate::gateway::{GeminiGateway, ModelGateway, RuleBasedGateway};
use crate::session::{InMemorySessionStore, DEFAULT_HISTORY_LIMIT, DEFAULT_SESSION_CAPACITY};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Which gateway adapter to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Gemini,
    RuleBased,
}

impl FromStr for ModelBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ModelBackend::Gemini),
            "rule_based" | "rule-based" | "fallback" => Ok(ModelBackend::RuleBased),
            other => Err(AppError::Config(format!(
                "MODEL_BACKEND must be 'gemini' or 'rule_based', got '{}'",
                other
            ))),
        }
    }
}

/// Connection settings for the Gemini adapter
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: ModelBackend,
    /// Present whenever `backend` is `Gemini`
    pub gemini: Option<GeminiSettings>,
    pub max_attachment_bytes: usize,
    pub session_capacity: usize,
    pub session_history_limit: usize,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        // Missing .env is normal outside development
        let _ = dotenv::dotenv();
        Self::load()
    }

    /// Read the process environment only.
    pub fn load() -> Result<Self, AppError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let backend = match env::var("MODEL_BACKEND") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ if api_key.is_some() => ModelBackend::Gemini,
            _ => ModelBackend::RuleBased,
        };

        let gemini = match backend {
            ModelBackend::Gemini => {
                let api_key = api_key.ok_or_else(|| {
                    AppError::Config("GEMINI_API_KEY must be set for the gemini backend".into())
                })?;
                let base_url = Url::parse(&var_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL))?;
                Some(GeminiSettings {
                    api_key,
                    model: var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                    base_url,
                    timeout: Duration::from_secs(parse_var(
                        "MODEL_TIMEOUT_SECS",
                        DEFAULT_MODEL_TIMEOUT_SECS,
                    )?),
                })
            }
            ModelBackend::RuleBased => None,
        };

        Ok(Self {
            backend,
            gemini,
            max_attachment_bytes: parse_var("MAX_ATTACHMENT_BYTES", DEFAULT_MAX_ATTACHMENT_BYTES)?,
            session_capacity: parse_var("SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?,
            session_history_limit: parse_var("SESSION_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
        })
    }

    /// Construct the configured gateway. Called once at startup.
    pub fn build_gateway(&self) -> Result<Arc<dyn ModelGateway>, AppError> {
        let gateway: Arc<dyn ModelGateway> = match (self.backend, &self.gemini) {
            (ModelBackend::Gemini, Some(settings)) => {
                info!(model = %settings.model, "Using Gemini gateway");
                Arc::new(GeminiGateway::new(settings))
            }
            (ModelBackend::Gemini, None) => {
                return Err(AppError::Config(
                    "gemini backend selected without Gemini settings".into(),
                ))
            }
            (ModelBackend::RuleBased, _) => {
                info!("Using rule-based gateway");
                Arc::new(RuleBasedGateway::new())
            }
        };
        Ok(gateway)
    }

    pub fn attachment_policy(&self) -> AttachmentPolicy {
        AttachmentPolicy::with_max_bytes(self.max_attachment_bytes)
    }

    pub fn session_store(&self) -> InMemorySessionStore {
        InMemorySessionStore::new(self.session_capacity, self.session_history_limit)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", name, e))),
        _ => Ok(default),
    }
}
