//! Events, handlers, and run results for the [`Harness`](super::harness::Harness).
//!
//! The harness reports progress through [`HarnessEvent`] variants covering
//! one run from round start through tool execution to completion. Callers
//! implement [`EventHandler`] to print progress, log, or collect metrics.
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`EventObserver`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use std::time::Duration;

use crate::Message;
use tracing::{debug, info, warn};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the harness during a run.
#[derive(Debug)]
pub enum HarnessEvent<'a> {
    /// A new round is starting.
    RoundStart { round: u32, max_rounds: u32 },
    /// The model returned text (may be alongside tool calls).
    Text(&'a str),
    /// The model requested tool calls this round.
    ToolCallsReceived { round: u32, count: usize },
    /// A single tool is about to be executed.
    ToolExecuting { name: &'a str, arguments: &'a str },
    /// A single tool finished executing.
    ToolResult {
        name: &'a str,
        call_id: &'a str,
        result: &'a str,
    },
    /// Token usage reported by the API for this round.
    TokenUsage {
        prompt_tokens: u32,
        completion_tokens: u32,
    },
    /// The agent finished (no more tool calls).
    Finished,
    /// The API returned no content, no tool calls, and no completion tokens.
    /// The harness retries up to `max_retries` times.
    EmptyResponse {
        round: u32,
        attempt: u32,
        max_retries: u32,
    },
    /// The agent hit the round limit without finishing.
    RoundLimitReached { max_rounds: u32 },
}

impl HarnessEvent<'_> {
    /// Total tokens of a `TokenUsage` event, `None` for all others.
    pub fn total_tokens(&self) -> Option<u64> {
        if let HarnessEvent::TokenUsage {
            prompt_tokens,
            completion_tokens,
        } = self
        {
            Some(*prompt_tokens as u64 + *completion_tokens as u64)
        } else {
            None
        }
    }
}

/// Handler for harness events.
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// impl EventHandler for Printer {
///     fn on_event(&self, event: &HarnessEvent<'_>) {
///         if let HarnessEvent::ToolExecuting { name, .. } = event {
///             eprintln!("- running {name}");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called for each event during the harness run.
    fn on_event(&self, event: &HarnessEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler that delegates to multiple inner handlers in
/// registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with_if(show_progress, ProgressHandler::new(mode));
/// ```
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler only when `condition` holds.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }

    /// Add a handler from an `Option`. `None` is a no-op.
    pub fn with_opt(self, handler: Option<impl EventHandler + 'static>) -> Self {
        match handler {
            Some(h) => self.with(h),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &HarnessEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Adapts an observing closure into an [`EventHandler`].
///
/// ```ignore
/// let handler = EventObserver::new(|event| {
///     if let HarnessEvent::Text(t) = event { println!("{t}"); }
/// });
/// ```
pub struct EventObserver<F>(F)
where
    F: Fn(&HarnessEvent<'_>) + Send + Sync;

impl<F> EventObserver<F>
where
    F: Fn(&HarnessEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for EventObserver<F>
where
    F: Fn(&HarnessEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &HarnessEvent<'_>) {
        (self.0)(event);
    }
}

/// An event handler that logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &HarnessEvent<'_>) {
        match event {
            HarnessEvent::RoundStart { round, max_rounds } => {
                info!("[round {round}/{max_rounds}]");
            }
            HarnessEvent::Text(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "LLM text: {preview}{}",
                    if text.chars().count() > 200 { "..." } else { "" }
                );
            }
            HarnessEvent::ToolCallsReceived { round, count } => {
                debug!("{count} tool call(s) in round {round}");
            }
            HarnessEvent::ToolExecuting { name, .. } => {
                debug!("Executing tool: {name}");
            }
            HarnessEvent::ToolResult { name, result, .. } => {
                debug!("Tool {name} result: {} bytes", result.len());
            }
            HarnessEvent::TokenUsage {
                prompt_tokens,
                completion_tokens,
            } => {
                debug!("Tokens: prompt={prompt_tokens}, completion={completion_tokens}");
            }
            HarnessEvent::Finished => {
                info!("Agent finished (no more tool calls)");
            }
            HarnessEvent::EmptyResponse {
                round,
                attempt,
                max_retries,
            } => {
                warn!(
                    "Empty API response at round {round} (no content, no tool calls, 0 tokens). \
                     Retrying ({attempt}/{max_retries})..."
                );
            }
            HarnessEvent::RoundLimitReached { max_rounds } => {
                warn!("Agent hit round limit ({max_rounds})");
            }
        }
    }
}

// ── Run result ─────────────────────────────────────────────────────

/// The result of a complete [`Harness::run()`](super::harness::Harness::run).
#[derive(Debug)]
pub struct HarnessResult {
    /// Unique trace ID for this run.
    pub trace_id: String,
    /// All messages exchanged during the run (including the initial ones).
    pub messages: Vec<Message>,
    /// Text output from the model, one entry per round that produced text.
    pub text_output: Vec<String>,
    pub total_prompt_tokens: u32,
    pub total_completion_tokens: u32,
    /// Number of rounds executed.
    pub rounds_used: u32,
    /// Number of tool calls executed across all rounds.
    pub tool_calls_made: u32,
    /// Whether the agent finished naturally (vs hitting the round limit).
    pub finished: bool,
    /// Estimated cost in USD, `None` when the model has no known pricing.
    pub estimated_cost_usd: Option<f64>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl HarnessResult {
    /// Concatenated text output from all rounds.
    pub fn text(&self) -> String {
        self.text_output.join("\n\n")
    }

    /// The last text the model produced, which is the answer of a finished run.
    pub fn final_output(&self) -> Option<&str> {
        self.text_output.last().map(String::as_str)
    }

    /// Total tokens (prompt + completion).
    pub fn total_tokens(&self) -> u32 {
        self.total_prompt_tokens + self.total_completion_tokens
    }
}
