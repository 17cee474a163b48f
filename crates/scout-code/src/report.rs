//! Token, cost and time summary printed after each agent run.

use std::fmt;
use std::time::Duration;

use scout_rs::agent::events::HarnessResult;

/// Usage aggregated over one or more harness runs of the same model.
#[derive(Debug, Clone)]
pub struct UsageReport {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// `None` once any aggregated run had no known pricing.
    pub cost_usd: Option<f64>,
    pub elapsed: Duration,
    runs: usize,
}

impl UsageReport {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            cost_usd: Some(0.0),
            elapsed: Duration::ZERO,
            runs: 0,
        }
    }

    /// Report for a single run.
    pub fn from_result(model: impl Into<String>, result: &HarnessResult) -> Self {
        let mut report = Self::new(model);
        report.add(result);
        report
    }

    pub fn add(&mut self, result: &HarnessResult) {
        self.input_tokens += u64::from(result.total_prompt_tokens);
        self.output_tokens += u64::from(result.total_completion_tokens);
        self.cost_usd = match (self.cost_usd, result.estimated_cost_usd) {
            (Some(total), Some(cost)) => Some(total + cost),
            _ => None,
        };
        self.elapsed += result.elapsed;
        self.runs += 1;
    }

    /// Replace the summed run time with a wall-clock measurement.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Usage:")?;
        writeln!(f, "  - Total input tokens: {}", self.input_tokens)?;
        writeln!(f, "  - Total output tokens: {}", self.output_tokens)?;
        match self.cost_usd {
            Some(cost) => writeln!(f, "  - Total cost: ${cost:.4}")?,
            None => writeln!(f, "  - Total cost: $Unknown model")?,
        }
        write!(
            f,
            "  - Total time taken: {:.2} seconds",
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(prompt: u32, completion: u32, cost: Option<f64>, millis: u64) -> HarnessResult {
        HarnessResult {
            trace_id: "tr-test".into(),
            messages: Vec::new(),
            text_output: vec!["done".into()],
            total_prompt_tokens: prompt,
            total_completion_tokens: completion,
            rounds_used: 1,
            tool_calls_made: 0,
            finished: true,
            estimated_cost_usd: cost,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn renders_known_cost() {
        let report = UsageReport::from_result("o4-mini", &result(1200, 300, Some(0.0048), 2500));
        assert_eq!(
            report.to_string(),
            "- Usage:\n  - Total input tokens: 1200\n  - Total output tokens: 300\n  \
             - Total cost: $0.0048\n  - Total time taken: 2.50 seconds"
        );
    }

    #[test]
    fn unknown_pricing_poisons_the_total() {
        let mut report = UsageReport::new("o4-mini");
        report.add(&result(10, 5, Some(0.01), 100));
        report.add(&result(20, 5, None, 100));
        assert_eq!(report.cost_usd, None);
        assert_eq!(report.input_tokens, 30);
        assert_eq!(report.runs(), 2);
        assert!(report.to_string().contains("  - Total cost: $Unknown model\n"));
    }

    #[test]
    fn explicit_elapsed_overrides_run_time() {
        let report = UsageReport::from_result("gpt-4o", &result(1, 1, Some(0.0), 100))
            .with_elapsed(Duration::from_millis(12_346));
        assert!(report.to_string().ends_with("Total time taken: 12.35 seconds"));
    }
}
