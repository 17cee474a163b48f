//! Second pass that rewrites a generated document in a friendlier tone.

use scout_rs::ChatClient;
use scout_rs::agent::config::HarnessConfig;
use scout_rs::agent::events::{HarnessResult, LoggingHandler};
use scout_rs::agent::harness::Harness;
use scout_rs::tools::core::ToolSet;
use tracing::info;

use crate::output::strip_markdown_fence;
use crate::prompt::{REWRITE_SYSTEM_PROMPT, rewrite_user_prompt};

/// A tool-less run is one request; the extra rounds cover empty-response retries.
const REWRITE_MAX_ROUNDS: u32 = 4;

/// Rewrite `text` with `model` and return the fence-stripped result along
/// with the run's usage.
pub async fn rewrite_friendlier(
    client: &ChatClient,
    text: &str,
    model: &str,
) -> Result<(String, HarnessResult), String> {
    info!("Rewriting output with {model}");
    let tools = ToolSet::new();
    let config = HarnessConfig::new(model, REWRITE_SYSTEM_PROMPT)
        .with_max_rounds(REWRITE_MAX_ROUNDS)
        .with_retries(3);
    let messages = config.initial_messages(rewrite_user_prompt(text));

    let result = Harness::new(client, &tools, config)
        .with_event_handler(&LoggingHandler)
        .run(messages)
        .await?;

    let rewritten = result
        .final_output()
        .map(strip_markdown_fence)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| "Rewrite produced no output".to_string())?;
    Ok((rewritten, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": content}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 400, "completion_tokens": 90, "total_tokens": 490}
        })
    }

    #[tokio::test]
    async fn rewrites_and_strips_fence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("<original_readme>"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("```markdown\n# Shop\n\nWelcome aboard!\n```")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("test-key", server.uri()).unwrap();
        let (text, result) = rewrite_friendlier(&client, "# Shop\n\nA shop.", "gpt-4o")
            .await
            .unwrap();

        assert_eq!(text, "# Shop\n\nWelcome aboard!");
        assert_eq!(result.total_prompt_tokens, 400);
        assert_eq!(result.total_completion_tokens, 90);
        assert!(result.estimated_cost_usd.is_some());
        assert_eq!(result.tool_calls_made, 0);
    }

    #[tokio::test]
    async fn api_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("test-key", server.uri()).unwrap();
        let err = rewrite_friendlier(&client, "# Doc", "gpt-4o").await.unwrap_err();
        assert!(err.contains("401"), "got: {err}");
    }
}
