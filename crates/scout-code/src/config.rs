//! Run configuration with defaults.
//!
//! [`ScoutConfig`] captures the settings of one agent run and converts them
//! into scout-rs types via [`build_harness_config`](ScoutConfig::build_harness_config)
//! and [`build_tool_set`](ScoutConfig::build_tool_set).

use std::path::PathBuf;
use std::time::Duration;

use scout_rs::agent::config::HarnessConfig;
use scout_rs::tools::core::{DEFAULT_MAX_RESULT_BYTES, DEFAULT_TOOL_TIMEOUT, ToolSet};
use scout_rs::tools::files::FileToolsConfig;

use crate::mode::Mode;
use crate::tools::ProjectToolsExt;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SCOUT_API_KEY";
/// Fallback API key variable.
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Optional chat completions endpoint override.
pub const API_URL_ENV: &str = "SCOUT_API_URL";

/// Default model for the rewrite pass.
pub const DEFAULT_REWRITE_MODEL: &str = "gpt-4o";

/// Configuration for one scout run.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub mode: Mode,
    /// Model identifier. Default: `"o4-mini"`.
    pub model: String,
    /// Maximum tool-use round-trips. Default: `50`.
    pub max_rounds: u32,
    /// Repository root every tool is confined to. Default: `"."`.
    pub workdir: PathBuf,
    /// Retries for transient API errors. Default: `3`.
    pub api_retries: u32,
    /// Tool results are truncated beyond this many bytes.
    pub max_result_bytes: usize,
    pub tool_timeout: Option<Duration>,
    /// Validate tool arguments against their schema before execution.
    pub validate_args: bool,
    /// Serve a placeholder for README files so the agent reads code instead.
    pub mask_readme: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            model: scout_rs::DEFAULT_MODEL.to_string(),
            max_rounds: scout_rs::agent::DEFAULT_MAX_ROUNDS,
            workdir: PathBuf::from("."),
            api_retries: 3,
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            tool_timeout: Some(DEFAULT_TOOL_TIMEOUT),
            validate_args: true,
            mask_readme: true,
        }
    }
}

impl ScoutConfig {
    /// Build a [`HarnessConfig`] with the mode's system prompt.
    pub fn build_harness_config(&self) -> HarnessConfig {
        HarnessConfig::new(self.model.clone(), self.mode.system_prompt())
            .with_max_rounds(self.max_rounds)
            .with_retries(self.api_retries)
    }

    /// Build a [`ToolSet`] with the file tools and the repository tools.
    pub fn build_tool_set(&self) -> ToolSet {
        ToolSet::new()
            .with_max_result_bytes(self.max_result_bytes)
            .with_arg_validation(self.validate_args)
            .with_default_timeout(self.tool_timeout)
            .with_file_tools_configured(
                &self.workdir,
                FileToolsConfig::default().mask_readme(self.mask_readme),
            )
            .with_project_tools(&self.workdir)
    }
}

/// Read the API key from [`API_KEY_ENV`], falling back to [`FALLBACK_API_KEY_ENV`].
pub fn api_key_from_env() -> Result<String, String> {
    [API_KEY_ENV, FALLBACK_API_KEY_ENV]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| {
            format!("{API_KEY_ENV} (or {FALLBACK_API_KEY_ENV}) environment variable is not set")
        })
}
