//! Configuration types for the [`Harness`](super::harness::Harness).
//!
//! ```ignore
//! let config = HarnessConfig::new("o4-mini", "You investigate codebases.")
//!     .with_max_rounds(30)
//!     .with_retries(3);
//! ```

use crate::Message;
use crate::api::retry::RetryConfig;

/// Default round limit for a harness run.
pub const DEFAULT_MAX_ROUNDS: u32 = 50;

/// Configuration for a [`Harness`](super::harness::Harness) run.
///
/// `max_tokens` and `temperature` default to `0`, which omits them from the
/// request. Reasoning models such as `o4-mini` reject a non-default
/// temperature.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Model identifier (e.g. `"o4-mini"`).
    pub model: String,
    /// System prompt the run was configured with.
    pub system_prompt: Option<String>,
    /// Maximum tool-use round-trips before stopping.
    pub max_rounds: u32,
    /// Maximum completion tokens per response (`0` = provider default).
    pub max_tokens: u32,
    /// Sampling temperature (`0.0` = provider default).
    pub temperature: f32,
    /// Retry configuration for transient API failures.
    pub retry: RetryConfig,
}

impl HarnessConfig {
    /// Create a config with a model and system prompt.
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: Some(system_prompt.into()),
            ..Default::default()
        }
    }

    /// Set the maximum number of tool-use round-trips.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the maximum completion tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Enable automatic retries for transient API failures (429, 5xx,
    /// network errors). Uses exponential backoff.
    ///
    /// Pass `0` to disable retries (the default).
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retry = RetryConfig::with_retries(max_retries);
        self
    }

    /// Opening conversation: the system prompt (when set) followed by the
    /// user request.
    pub fn initial_messages(&self, request: impl Into<String>) -> Vec<Message> {
        self.system_prompt
            .iter()
            .map(Message::system)
            .chain(std::iter::once(Message::user(request)))
            .collect()
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            model: crate::DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_tokens: 0,
            temperature: 0.0,
            retry: RetryConfig::default(),
        }
    }
}
