//! Agent harness: the tool-use loop on top of the chat completions API.
//!
//! The [`Harness`] sends messages + tool definitions to the model, executes
//! any returned tool calls via the [`ToolSet`], appends results, and repeats
//! until the model produces a text-only response or the round limit is
//! reached. Callers observe the loop via [`EventHandler`] events.

use std::time::{Duration, Instant};

use super::config::HarnessConfig;
use super::events::{EventHandler, HarnessEvent, HarnessResult};
use super::execution::{execute_tool_calls, send_round_request};
use crate::api::pricing::{CostTracker, generate_trace_id, pricing_for_model};
use crate::tools::core::ToolSet;
use crate::{ChatClient, Message, ToolDef};
use tracing::{info, warn};

/// Maximum number of retries when the API returns an empty response
/// (no content, no tool calls, zero completion tokens).
const MAX_EMPTY_RESPONSE_RETRIES: u32 = 3;

// ── Harness ────────────────────────────────────────────────────────

/// The agentic tool-use loop.
///
/// ```ignore
/// let client = ChatClient::new(api_key)?;
/// let tools = ToolSet::new().with_file_tools(&workdir);
/// let config = HarnessConfig::new("o4-mini", system_prompt);
/// let messages = vec![Message::system(system_prompt), Message::user(request)];
///
/// let result = Harness::new(&client, &tools, config)
///     .run(messages)
///     .await?;
///
/// println!("{}", result.final_output().unwrap_or_default());
/// ```
///
/// # Lifetimes
///
/// `Harness<'a>` borrows the client, tools, and event handler. Bind the
/// handler to a `let` before building the harness so it outlives `.run()`:
///
/// ```ignore
/// let handler = CompositeEventHandler::new().with(LoggingHandler);
/// let result = Harness::new(&client, &tools, config)
///     .with_event_handler(&handler)
///     .run(messages)
///     .await?;
/// ```
pub struct Harness<'a> {
    client: &'a ChatClient,
    tools: &'a ToolSet,
    config: HarnessConfig,
    event_handler: &'a dyn EventHandler,
}

impl<'a> Harness<'a> {
    pub fn new(client: &'a ChatClient, tools: &'a ToolSet, config: HarnessConfig) -> Self {
        Self {
            client,
            tools,
            config,
            event_handler: &super::events::NoopHandler,
        }
    }

    /// Attach an event handler.
    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    /// Run the agentic loop.
    ///
    /// Takes ownership of the initial message list (system + user messages)
    /// and returns the complete [`HarnessResult`] when done. Hitting the
    /// round limit is not an error: the result has `finished == false`.
    /// API errors that survive the retry policy end the run with `Err`.
    pub async fn run(self, mut messages: Vec<Message>) -> Result<HarnessResult, String> {
        let pricing = pricing_for_model(&self.config.model);
        let started = Instant::now();

        let mut acc = RunAccumulator {
            trace_id: generate_trace_id(),
            text_output: Vec::new(),
            cost_tracker: CostTracker::new(),
            rounds_used: 0,
            tool_calls_made: 0,
            finished: false,
        };
        let mut empty_response_retries: u32 = 0;

        info!(
            "Harness run started: trace_id={}, model={}, tools={}",
            acc.trace_id,
            self.config.model,
            self.tools.len()
        );

        let tools_option = non_empty_tools(&self.tools.definitions());

        for round in 0..self.config.max_rounds {
            acc.rounds_used = round + 1;
            self.event_handler.on_event(&HarnessEvent::RoundStart {
                round: round + 1,
                max_rounds: self.config.max_rounds,
            });

            let completion =
                send_round_request(&self.config, self.client, &messages, &tools_option).await?;

            let completion_tokens = match completion.usage {
                Some(ref u) => {
                    let pt = u.prompt_tokens.unwrap_or(0);
                    let ct = u.completion_tokens.unwrap_or(0);
                    acc.cost_tracker.record(pt, ct, pricing.as_ref());
                    self.event_handler.on_event(&HarnessEvent::TokenUsage {
                        prompt_tokens: pt,
                        completion_tokens: ct,
                    });
                    ct
                }
                None => 0,
            };

            let text = completion.content.filter(|t| !t.is_empty());
            if let Some(ref text) = text {
                self.event_handler.on_event(&HarnessEvent::Text(text));
                acc.text_output.push(text.clone());
            }

            if completion.tool_calls.is_empty() {
                // HTTP 200 with nothing in it: retry instead of exiting.
                if text.is_none() && completion_tokens == 0 {
                    empty_response_retries += 1;
                    if empty_response_retries <= MAX_EMPTY_RESPONSE_RETRIES {
                        self.event_handler.on_event(&HarnessEvent::EmptyResponse {
                            round: round + 1,
                            attempt: empty_response_retries,
                            max_retries: MAX_EMPTY_RESPONSE_RETRIES,
                        });
                        tokio::time::sleep(Duration::from_millis(
                            500 * u64::from(empty_response_retries),
                        ))
                        .await;
                        continue;
                    }
                    warn!(
                        "Empty API response persisted after {MAX_EMPTY_RESPONSE_RETRIES} retries. \
                         Treating as agent completion."
                    );
                }

                if let Some(text) = text {
                    messages.push(Message::assistant_text(text));
                }
                acc.finished = true;
                self.event_handler.on_event(&HarnessEvent::Finished);
                break;
            }

            empty_response_retries = 0;

            self.event_handler.on_event(&HarnessEvent::ToolCallsReceived {
                round: round + 1,
                count: completion.tool_calls.len(),
            });

            let results =
                execute_tool_calls(self.tools, self.event_handler, &completion.tool_calls).await;
            acc.tool_calls_made += results.len() as u32;

            messages.push(Message::assistant_tool_calls(text, completion.tool_calls));
            messages.extend(results);
        }

        Ok(finalize_run(
            &self.config,
            acc,
            messages,
            started.elapsed(),
            self.event_handler,
        ))
    }
}

/// Values accumulated across rounds during a harness run.
struct RunAccumulator {
    trace_id: String,
    text_output: Vec<String>,
    cost_tracker: CostTracker,
    rounds_used: u32,
    tool_calls_made: u32,
    finished: bool,
}

/// Emit the limit event if needed and build the final [`HarnessResult`].
fn finalize_run(
    config: &HarnessConfig,
    acc: RunAccumulator,
    messages: Vec<Message>,
    elapsed: Duration,
    event_handler: &dyn EventHandler,
) -> HarnessResult {
    if !acc.finished {
        event_handler.on_event(&HarnessEvent::RoundLimitReached {
            max_rounds: config.max_rounds,
        });
    }

    info!(
        "Harness run completed: trace_id={}, rounds={}, tool_calls={}, {}",
        acc.trace_id,
        acc.rounds_used,
        acc.tool_calls_made,
        acc.cost_tracker.summary()
    );

    HarnessResult {
        trace_id: acc.trace_id,
        messages,
        text_output: acc.text_output,
        total_prompt_tokens: acc.cost_tracker.total_prompt_tokens as u32,
        total_completion_tokens: acc.cost_tracker.total_completion_tokens as u32,
        rounds_used: acc.rounds_used,
        tool_calls_made: acc.tool_calls_made,
        finished: acc.finished,
        estimated_cost_usd: acc.cost_tracker.estimated_cost_usd,
        elapsed,
    }
}

// ── Small helpers ──────────────────────────────────────────────────

/// Convert tool defs to `Option`, returning `None` if empty.
fn non_empty_tools(defs: &[ToolDef]) -> Option<Vec<ToolDef>> {
    if defs.is_empty() {
        None
    } else {
        Some(defs.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::events::EventObserver;
    use crate::tools::core::{Tool, ToolFuture};
    use crate::MessageRole;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct UpperTool;

    impl Tool for UpperTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new(
                "upper",
                "Uppercase the text",
                serde_json::json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }),
            )
        }

        fn execute(&self, arguments: &str) -> ToolFuture<'_> {
            let value: serde_json::Value = serde_json::from_str(arguments).unwrap_or_default();
            let text = value["text"].as_str().unwrap_or_default().to_uppercase();
            Box::pin(async move { text })
        }
    }

    fn tool_call_reply(id: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": id,
                        "type": "function",
                        "function": {"name": "upper", "arguments": "{\"text\": \"hi\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
        })
    }

    fn text_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": text}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 150, "completion_tokens": 30, "total_tokens": 180}
        })
    }

    fn initial_messages() -> Vec<Message> {
        vec![Message::system("You help."), Message::user("Shout hi")]
    }

    #[test]
    fn non_empty_tools_maps_empty_to_none() {
        assert!(non_empty_tools(&[]).is_none());
        let defs = ToolSet::new().with(UpperTool).definitions();
        assert_eq!(non_empty_tools(&defs).map(|d| d.len()), Some(1));
    }

    #[tokio::test]
    async fn run_executes_tool_calls_then_finishes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_reply("call_1")))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("call_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("HI it is.")))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("sk-test", server.uri()).unwrap();
        let tools = ToolSet::new().with(UpperTool);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let handler = EventObserver::new(move |event| {
            if let HarnessEvent::ToolResult { name, result, .. } = event {
                sink.lock().unwrap().push(format!("{name}={result}"));
            }
        });

        let result = Harness::new(&client, &tools, HarnessConfig::new("o4-mini", "You help."))
            .with_event_handler(&handler)
            .run(initial_messages())
            .await
            .unwrap();

        assert!(result.finished);
        assert_eq!(result.rounds_used, 2);
        assert_eq!(result.tool_calls_made, 1);
        assert_eq!(result.final_output(), Some("HI it is."));
        assert_eq!(result.total_prompt_tokens, 250);
        assert_eq!(result.total_completion_tokens, 50);
        let expected = 250.0 / 1e6 * 2.0 + 50.0 / 1e6 * 8.0;
        assert!((result.estimated_cost_usd.unwrap() - expected).abs() < 1e-12);
        assert_eq!(*events.lock().unwrap(), vec!["upper=HI".to_string()]);

        // system, user, assistant tool calls, tool result, final assistant text
        assert_eq!(result.messages.len(), 5);
        assert_eq!(result.messages[3].role, MessageRole::Tool);
        assert_eq!(result.messages[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(result.messages[3].content.as_deref(), Some("HI"));
    }

    #[tokio::test]
    async fn run_stops_at_round_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_reply("call_n")))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("sk-test", server.uri()).unwrap();
        let tools = ToolSet::new().with(UpperTool);
        let limit_hit = Arc::new(Mutex::new(false));
        let flag = limit_hit.clone();
        let handler = EventObserver::new(move |event| {
            if let HarnessEvent::RoundLimitReached { max_rounds } = event {
                assert_eq!(*max_rounds, 2);
                *flag.lock().unwrap() = true;
            }
        });

        let config = HarnessConfig::new("o4-mini", "You help.").with_max_rounds(2);
        let result = Harness::new(&client, &tools, config)
            .with_event_handler(&handler)
            .run(initial_messages())
            .await
            .unwrap();

        assert!(!result.finished);
        assert_eq!(result.rounds_used, 2);
        assert_eq!(result.tool_calls_made, 2);
        assert!(result.final_output().is_none());
        assert!(*limit_hit.lock().unwrap());
    }

    #[tokio::test]
    async fn run_retries_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": ""}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 0, "total_tokens": 10}
            })))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Done.")))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("sk-test", server.uri()).unwrap();
        let tools = ToolSet::new();
        let result = Harness::new(&client, &tools, HarnessConfig::new("o4-mini", "You help."))
            .run(initial_messages())
            .await
            .unwrap();

        assert!(result.finished);
        assert_eq!(result.rounds_used, 2);
        assert_eq!(result.final_output(), Some("Done."));
    }

    #[tokio::test]
    async fn run_omits_tools_when_set_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("\"tools\""))
            .respond_with(ResponseTemplate::new(400).set_body_string("tools not allowed"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Rewritten.")))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("sk-test", server.uri()).unwrap();
        let tools = ToolSet::new();
        let result = Harness::new(&client, &tools, HarnessConfig::new("gpt-4o", "Rewrite."))
            .run(initial_messages())
            .await
            .unwrap();
        assert_eq!(result.final_output(), Some("Rewritten."));
        assert_eq!(result.tool_calls_made, 0);
    }

    #[tokio::test]
    async fn run_propagates_permanent_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("sk-bad", server.uri()).unwrap();
        let tools = ToolSet::new().with(UpperTool);
        let config = HarnessConfig::new("o4-mini", "You help.").with_retries(3);
        let err = Harness::new(&client, &tools, config)
            .run(initial_messages())
            .await
            .unwrap_err();
        assert!(err.starts_with("API HTTP 401"), "got: {err}");
    }
}
