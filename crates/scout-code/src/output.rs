//! Post-processing of the agent's final answer.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use scout_rs::ChatClient;
use scout_rs::agent::events::HarnessResult;
use tracing::warn;

use crate::mode::Mode;
use crate::rewrite::rewrite_friendlier;

/// Drop a leading line opening a code fence and a trailing line closing one.
///
/// Models often wrap a whole README in a single ```` ```markdown ```` block.
pub fn strip_markdown_fence(text: &str) -> String {
    let mut lines: Vec<&str> = text.trim_end().split('\n').collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.ends_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

/// `report_{mode}_{YYYY_MM_DD_HH_MM_SS}.md`, relative to the current directory.
pub fn default_output_path(mode: Mode, now: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!(
        "report_{mode}_{}.md",
        now.format("%Y_%m_%d_%H_%M_%S")
    ))
}

// ── Finalising ─────────────────────────────────────────────────────

/// The document a run produced, after post-processing.
#[derive(Debug)]
pub struct FinalOutput {
    pub text: String,
    /// The agent stopped at the round limit; `text` is its last answer.
    pub round_limit_hit: bool,
    /// Usage of the rewrite pass, when one ran.
    pub rewrite: Option<HarnessResult>,
}

/// The agent's last text, mermaid-sanitised in mermaid mode.
///
/// A run cut off by the round limit still yields its last text. A run with
/// no text at all is an error.
pub fn finalize(mode: Mode, result: &HarnessResult) -> Result<String, String> {
    if !result.finished {
        warn!(
            "Agent stopped after {} rounds without finishing",
            result.rounds_used
        );
    }
    let text = result
        .final_output()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| "the agent produced no output".to_string())?;

    Ok(if mode == Mode::Mermaid {
        sanitize_mermaid(text)
    } else {
        text.to_string()
    })
}

/// [`finalize`], then the rewrite pass with `rewrite_model` when given.
pub async fn finalize_with_rewrite(
    client: &ChatClient,
    mode: Mode,
    result: &HarnessResult,
    rewrite_model: Option<&str>,
) -> Result<FinalOutput, String> {
    let mut text = finalize(mode, result)?;
    let mut rewrite = None;
    if let Some(model) = rewrite_model {
        eprintln!("- Rewriting output using {model}...");
        let (rewritten, rewrite_result) = rewrite_friendlier(client, &text, model).await?;
        text = rewritten;
        rewrite = Some(rewrite_result);
    }
    Ok(FinalOutput {
        text,
        round_limit_hit: !result.finished,
        rewrite,
    })
}

// ── Mermaid sanitising ─────────────────────────────────────────────

static MERMAID_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(```mermaid(?:js)?\n)(.*?)(```)").unwrap());

/// Node id followed by the opening token of a shape. Longer tokens first.
static NODE_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_](?:[A-Za-z0-9_\-]*[A-Za-z0-9_])?)(\(\[|\[\(|\(\(|\[\[|\{\{|\[|\(|\{)")
        .unwrap()
});

static ARROW_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_](?:[A-Za-z0-9_\-]*[A-Za-z0-9_])?)\s*(?:-->|---|-\.->|==>)").unwrap()
});

static ARROW_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-->|---|-\.->|==>)\s*(?:\|[^|]*\|\s*)?([A-Za-z0-9_](?:[A-Za-z0-9_\-]*[A-Za-z0-9_])?)")
        .unwrap()
});

/// Closing token for each shape opening token.
fn closing_token(open: &str) -> &'static str {
    match open {
        "([" => "])",
        "[(" => ")]",
        "((" => "))",
        "[[" => "]]",
        "{{" => "}}",
        "[" => "]",
        "(" => ")",
        _ => "}",
    }
}

/// Make node ids and labels inside mermaid blocks parseable.
///
/// Node ids keep only `[A-Za-z0-9_]` (anything else becomes `_`) and node
/// labels lose `( ) @ : < > &`. Directive, `subgraph`, `end` and comment lines
/// are left alone, as is all text outside mermaid blocks.
pub fn sanitize_mermaid(text: &str) -> String {
    MERMAID_BLOCK
        .replace_all(text, |caps: &Captures<'_>| {
            let body: Vec<String> = caps[2].split('\n').map(sanitize_mermaid_line).collect();
            format!("{}{}{}", &caps[1], body.join("\n"), &caps[3])
        })
        .into_owned()
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '@' | ':' | '<' | '>' | '&'))
        .collect()
}

/// Comment lines, or lines whose first word is a diagram keyword.
fn is_directive_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("%%")
        || matches!(
            trimmed.split_whitespace().next(),
            Some("flowchart" | "graph" | "subgraph" | "end")
        )
}

/// A replacement of `line[start..end]`.
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

fn sanitize_mermaid_line(line: &str) -> String {
    if is_directive_line(line) {
        return line.to_string();
    }

    let mut edits = node_definition_edits(line);
    let node_spans: Vec<(usize, usize)> = edits.iter().map(|e| (e.start, e.end)).collect();
    let inside_node = |start: usize, end: usize| {
        node_spans.iter().any(|&(s, e)| start < e && end > s)
    };

    let endpoints = ARROW_SOURCE
        .captures_iter(line)
        .chain(ARROW_TARGET.captures_iter(line))
        .filter_map(|caps| caps.get(1));
    for id in endpoints {
        let clean = sanitize_id(id.as_str());
        if clean != id.as_str() && !inside_node(id.start(), id.end()) {
            edits.push(Edit {
                start: id.start(),
                end: id.end(),
                text: clean,
            });
        }
    }

    apply_edits(line, edits)
}

/// Spans of `ID<open>label<close>` node definitions with their sanitised form.
fn node_definition_edits(line: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut scanned_to = 0;

    for caps in NODE_DEF.captures_iter(line) {
        let (Some(whole), Some(id), Some(open)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        // Matches inside a label we already consumed.
        if whole.start() < scanned_to {
            continue;
        }
        let close = closing_token(open.as_str());
        let Some(rest) = line.get(open.end()..) else {
            continue;
        };
        // A quoted label may contain the closing token.
        let search_from = if rest.starts_with('"') {
            rest.get(1..)
                .and_then(|r| r.find('"'))
                .map_or(0, |q| q + 2)
        } else {
            0
        };
        let Some(close_at) = rest
            .get(search_from..)
            .and_then(|r| r.find(close))
            .map(|i| i + search_from)
        else {
            continue;
        };
        let label = rest.get(..close_at).unwrap_or_default();
        let end = open.end() + close_at + close.len();

        edits.push(Edit {
            start: id.start(),
            end,
            text: format!(
                "{}{}{}{close}",
                sanitize_id(id.as_str()),
                open.as_str(),
                sanitize_label(label)
            ),
        });
        scanned_to = end;
    }

    edits
}

fn apply_edits(line: &str, mut edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return line.to_string();
    }
    edits.sort_by_key(|e| e.start);

    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor {
            continue;
        }
        out.push_str(line.get(cursor..edit.start).unwrap_or_default());
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(line.get(cursor..).unwrap_or_default());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn run_result(text: &[&str], finished: bool) -> HarnessResult {
        HarnessResult {
            trace_id: "tr-test".into(),
            messages: Vec::new(),
            text_output: text.iter().map(|t| t.to_string()).collect(),
            total_prompt_tokens: 100,
            total_completion_tokens: 20,
            rounds_used: 3,
            tool_calls_made: 2,
            finished,
            estimated_cost_usd: Some(0.001),
            elapsed: Duration::from_millis(50),
        }
    }

    #[test]
    fn finalize_keeps_last_text_at_round_limit() {
        let result = run_result(&["Looking around", "Partial answer"], false);
        assert_eq!(finalize(Mode::Code, &result).unwrap(), "Partial answer");
    }

    #[test]
    fn finalize_without_text_fails() {
        assert!(finalize(Mode::Code, &run_result(&[], false)).is_err());
        assert!(finalize(Mode::Docs, &run_result(&["  \n"], true)).is_err());
    }

    #[test]
    fn finalize_sanitizes_only_in_mermaid_mode() {
        let answer = "```mermaid\nflowchart TD\nuser-login[Login: form] --> home\n```";
        let result = run_result(&[answer], true);
        assert_eq!(
            finalize(Mode::Mermaid, &result).unwrap(),
            "```mermaid\nflowchart TD\nuser_login[Login form] --> home\n```"
        );
        assert_eq!(finalize(Mode::Code, &result).unwrap(), answer);
    }

    #[tokio::test]
    async fn finalize_with_rewrite_replaces_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Partial answer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "```\nFriendly answer\n```"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("test-key", server.uri()).unwrap();
        let result = run_result(&["Partial answer"], false);
        let out = finalize_with_rewrite(&client, Mode::Docs, &result, Some("gpt-4o"))
            .await
            .unwrap();
        assert_eq!(out.text, "Friendly answer");
        assert!(out.round_limit_hit);
        assert_eq!(out.rewrite.map(|r| r.total_prompt_tokens), Some(50));
    }

    #[tokio::test]
    async fn finalize_without_rewrite_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = ChatClient::with_endpoint("test-key", server.uri()).unwrap();
        let out = finalize_with_rewrite(&client, Mode::Code, &run_result(&["Done"], true), None)
            .await
            .unwrap();
        assert_eq!(out.text, "Done");
        assert!(!out.round_limit_hit);
        assert!(out.rewrite.is_none());
    }

    fn block(body: &str) -> String {
        format!("Intro (keep: this)\n```mermaid\n{body}\n```\nOutro")
    }

    #[test]
    fn strip_fence_removes_wrapping_block() {
        assert_eq!(strip_markdown_fence("```markdown\n# Title\nBody\n```"), "# Title\nBody");
        assert_eq!(strip_markdown_fence("```\n# Title\n```\n"), "# Title");
        assert_eq!(strip_markdown_fence("# Title\nBody"), "# Title\nBody");
    }

    #[test]
    fn strip_fence_keeps_inner_fences() {
        let text = "# Title\n```sh\ncargo run\n```\nDone";
        assert_eq!(strip_markdown_fence(text), text);
    }

    #[test]
    fn output_path_uses_mode_and_timestamp() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(
            default_output_path(Mode::Docs, now),
            PathBuf::from("report_docs_2025_03_09_14_05_07.md")
        );
    }

    #[test]
    fn node_labels_lose_forbidden_characters() {
        let out = sanitize_mermaid(&block("A[Login (POST /auth): user@site] --> B{Valid <token>?}"));
        assert_eq!(out, block("A[Login POST /auth usersite] --> B{Valid token?}"));
    }

    #[test]
    fn node_ids_with_dashes_are_replaced_everywhere() {
        let out = sanitize_mermaid(&block("user-login[Login] --> check-auth\ncheck-auth -->|ok| home-page((Home))"));
        assert_eq!(
            out,
            block("user_login[Login] --> check_auth\ncheck_auth -->|ok| home_page((Home))")
        );
    }

    #[test]
    fn shapes_with_two_character_tokens() {
        let out = sanitize_mermaid(&block("db[(Users: table)] --> q([Queue & jobs])\nsub[[Call (x)]]"));
        assert_eq!(out, block("db[(Users table)] --> q([Queue  jobs])\nsub[[Call x]]"));
    }

    #[test]
    fn quoted_labels_are_stripped() {
        let out = sanitize_mermaid(&block("A[\"Save (draft)\"] --> B"));
        assert_eq!(out, block("A[\"Save draft\"] --> B"));
    }

    #[test]
    fn directive_lines_are_untouched() {
        let body = "flowchart TD\n  %% a (comment): here\n  subgraph api-layer\n  end";
        assert_eq!(sanitize_mermaid(&block(body)), block(body));
    }

    #[test]
    fn keyword_prefixed_ids_are_sanitized() {
        let out = sanitize_mermaid(&block("flowchart TD\ngraph-api[Call: x] --> db-main\nsubgraph-x --> end-node"));
        assert_eq!(
            out,
            block("flowchart TD\ngraph_api[Call x] --> db_main\nsubgraph_x --> end_node")
        );
    }

    #[test]
    fn chained_arrows_and_dotted_links() {
        let out = sanitize_mermaid(&block("a-1 --> b-2 -.-> c-3 ==> d"));
        assert_eq!(out, block("a_1 --> b_2 -.-> c_3 ==> d"));
    }

    #[test]
    fn text_outside_blocks_is_unchanged() {
        let text = "No diagram (here): a-b --> c-d";
        assert_eq!(sanitize_mermaid(text), text);
        let js = "```mermaidjs\nx-y --> z\n```";
        assert_eq!(sanitize_mermaid(js), "```mermaidjs\nx_y --> z\n```");
    }
}
