//! Run trace ids and cost accounting.
//!
//! Every harness run gets a `trace_id` for log correlation. Token usage is
//! priced against a small table of known models; anything outside the table
//! is reported as unknown rather than guessed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Generate a unique trace ID for an agent run.
pub fn generate_trace_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("tr-{ts:x}-{count:04x}")
}

/// Per-model pricing for cost estimation (USD per 1M tokens).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Price per 1M input tokens.
    pub input_per_million: f64,
    /// Price per 1M output tokens.
    pub output_per_million: f64,
}

impl ModelPricing {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Estimate cost for given token counts.
    pub fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (completion_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

/// Known model prices, matched on the exact model name.
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    ("o4-mini", ModelPricing::new(2.00, 8.00)),
    ("gpt-4.1", ModelPricing::new(1.10, 4.40)),
    ("o3", ModelPricing::new(10.00, 40.00)),
    ("gpt-4o", ModelPricing::new(5.00, 20.00)),
];

/// Look up pricing for a model. A provider prefix (`openai/o4-mini`) is
/// ignored. Returns `None` for models outside the table.
pub fn pricing_for_model(model: &str) -> Option<ModelPricing> {
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();
    PRICING_TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, pricing)| *pricing)
}

/// Cumulative cost tracker for a harness run.
///
/// `estimated_cost_usd` stays `None` when the model has no known pricing.
#[derive(Debug, Default)]
pub struct CostTracker {
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub estimated_cost_usd: Option<f64>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage for a round.
    pub fn record(
        &mut self,
        prompt_tokens: u32,
        completion_tokens: u32,
        pricing: Option<&ModelPricing>,
    ) {
        self.total_prompt_tokens += prompt_tokens as u64;
        self.total_completion_tokens += completion_tokens as u64;
        if let Some(p) = pricing {
            *self.estimated_cost_usd.get_or_insert(0.0) +=
                p.estimate_cost(prompt_tokens, completion_tokens);
        }
    }

    /// Total tokens consumed.
    pub fn total_tokens(&self) -> u64 {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    /// Format as a short summary string.
    pub fn summary(&self) -> String {
        let cost = match self.estimated_cost_usd {
            Some(c) => format!("${c:.4}"),
            None => "unknown".to_string(),
        };
        format!(
            "tokens: {} prompt + {} completion = {} total, est. cost: {cost}",
            self.total_prompt_tokens,
            self.total_completion_tokens,
            self.total_tokens(),
        )
    }
}
