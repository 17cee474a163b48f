//! Request dispatch and tool execution helpers.
//!
//! Called by [`super::harness::Harness::run()`] for the per-round mechanics:
//! sending the chat completion request with retries, and executing the tool
//! calls of one round.

use super::config::HarnessConfig;
use super::events::{EventHandler, HarnessEvent};
use crate::api::retry::retry_api_call;
use crate::tools::core::ToolSet;
use crate::{ChatClient, ChatCompletion, ChatRequest, Message, ToolCall, ToolChoice, ToolDef};

// ── Send request ──────────────────────────────────────────────────

/// Build and send the chat completion request for one round.
///
/// `tool_choice` and `parallel_tool_calls` are only sent alongside tools;
/// the API rejects them otherwise.
pub(crate) async fn send_round_request(
    config: &HarnessConfig,
    client: &ChatClient,
    messages: &[Message],
    tools_option: &Option<Vec<ToolDef>>,
) -> Result<ChatCompletion, String> {
    let has_tools = tools_option.is_some();
    let body = ChatRequest {
        model: config.model.clone(),
        messages: messages.to_vec(),
        max_completion_tokens: config.max_tokens,
        temperature: config.temperature,
        tools: tools_option.clone(),
        tool_choice: has_tools.then_some(ToolChoice::Auto),
        parallel_tool_calls: has_tools.then_some(false),
    };

    retry_api_call(&config.retry, || client.chat(&body)).await
}

// ── Tool execution ────────────────────────────────────────────────

/// Execute the round's tool calls one at a time in the order the model
/// produced them, returning one `tool` message per call.
pub(crate) async fn execute_tool_calls(
    tools: &ToolSet,
    event_handler: &dyn EventHandler,
    tool_calls: &[ToolCall],
) -> Vec<Message> {
    let mut results = Vec::with_capacity(tool_calls.len());

    for call in tool_calls {
        event_handler.on_event(&HarnessEvent::ToolExecuting {
            name: &call.function.name,
            arguments: &call.function.arguments,
        });

        let result = tools
            .execute(&call.function.name, &call.function.arguments)
            .await;

        event_handler.on_event(&HarnessEvent::ToolResult {
            name: &call.function.name,
            call_id: &call.id,
            result: &result,
        });

        results.push(Message::tool_result(&call.id, result));
    }

    results
}
