//! Human-readable progress lines on stderr.

use scout_rs::agent::events::{EventHandler, HarnessEvent};
use scout_rs::tools::names::{CAT_FILE, GREP_FILE, LIST_FILES};
use serde_json::Value;

use crate::tools::{GET_GIT_REMOTES, GET_PROJECT_STRUCTURE};

/// Echoes each tool call as a `- ...` line on stderr.
pub struct ProgressHandler;

impl EventHandler for ProgressHandler {
    fn on_event(&self, event: &HarnessEvent<'_>) {
        if let HarnessEvent::ToolExecuting { name, arguments } = event
            && let Some(line) = describe_tool_call(name, arguments)
        {
            eprintln!("{line}");
        }
    }
}

/// Progress line for a tool call, `None` for tools without one.
///
/// Unparseable arguments still produce a line with `?` placeholders.
pub fn describe_tool_call(name: &str, arguments: &str) -> Option<String> {
    let args: Value = serde_json::from_str(arguments).unwrap_or(Value::Null);
    let field = |key: &str| args.get(key).and_then(Value::as_str).unwrap_or("?").to_string();

    let line = match name {
        LIST_FILES => {
            let recursive = args
                .get("recursive")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let suffix = if recursive { " (recursive)" } else { "" };
            format!("- Listing files in {}{suffix}", field("directory"))
        }
        CAT_FILE => format!("- Reading {}", field("file_path")),
        GREP_FILE => format!(
            "- Searching {} for '{}'",
            field("file_path"),
            field("regex_pattern")
        ),
        GET_PROJECT_STRUCTURE => "- Building project structure".to_string(),
        GET_GIT_REMOTES => "- Reading git remotes".to_string(),
        _ => return None,
    };
    Some(line)
}
