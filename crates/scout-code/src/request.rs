//! Turning CLI input into the user message of a run.

use std::io::{BufRead, Write};

use crate::mode::Mode;

/// Default request sent in docs mode.
pub const DEFAULT_DOCS_REQUEST: &str = "Please provide a GitHub style Readme.md for the codebase.";

/// Prompt shown when no request was given on the command line.
pub const ASK_PROMPT: &str = "Enter a request: ";

/// Work out the request for `mode`.
///
/// `ask` is only called in modes that need a request and only when none was
/// given. In docs mode a given request is appended to the default README
/// request as a user note, unless `no_readme` drops the default.
pub fn resolve_request(
    mode: Mode,
    request: Option<&str>,
    no_readme: bool,
    ask: impl FnOnce(&str) -> Result<String, String>,
) -> Result<String, String> {
    let request = request.map(str::trim).filter(|r| !r.is_empty());

    let resolved = match mode {
        Mode::Docs => match (no_readme, request) {
            (false, Some(note)) => format!("{DEFAULT_DOCS_REQUEST}\n\n## User note\n\n{note}"),
            (false, None) => DEFAULT_DOCS_REQUEST.to_string(),
            (true, Some(note)) => format!("\n\n## User note\n\n{note}"),
            (true, None) => String::new(),
        },
        Mode::Code | Mode::Mermaid | Mode::Testing => match request {
            Some(r) => r.to_string(),
            None => ask(ASK_PROMPT)?,
        },
    };

    let resolved = resolved.trim().to_string();
    if resolved.is_empty() {
        return Err("No request provided or inferrable from mode".to_string());
    }
    Ok(resolved)
}

/// Ask on stderr and read one line from stdin.
pub fn ask_stdin(prompt: &str) -> Result<String, String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt}").map_err(|e| format!("failed to write prompt: {e}"))?;
    stderr
        .flush()
        .map_err(|e| format!("failed to write prompt: {e}"))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read request: {e}"))?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_ask(_: &str) -> Result<String, String> {
        panic!("should not ask");
    }

    #[test]
    fn code_mode_uses_given_request() {
        let r = resolve_request(Mode::Code, Some("  fix login  "), false, never_ask).unwrap();
        assert_eq!(r, "fix login");
    }

    #[test]
    fn code_mode_asks_when_missing() {
        let r = resolve_request(Mode::Mermaid, None, false, |prompt| {
            assert_eq!(prompt, ASK_PROMPT);
            Ok("draw checkout\n".to_string())
        })
        .unwrap();
        assert_eq!(r, "draw checkout");
    }

    #[test]
    fn empty_answer_is_an_error() {
        let err = resolve_request(Mode::Testing, None, false, |_| Ok("   \n".into())).unwrap_err();
        assert_eq!(err, "No request provided or inferrable from mode");
    }

    #[test]
    fn docs_mode_defaults_to_readme() {
        let r = resolve_request(Mode::Docs, None, false, never_ask).unwrap();
        assert_eq!(r, DEFAULT_DOCS_REQUEST);
    }

    #[test]
    fn docs_mode_appends_user_note() {
        let r = resolve_request(Mode::Docs, Some("Mention the CLI."), false, never_ask).unwrap();
        assert_eq!(
            r,
            format!("{DEFAULT_DOCS_REQUEST}\n\n## User note\n\nMention the CLI.")
        );
    }

    #[test]
    fn docs_mode_without_readme() {
        let r = resolve_request(Mode::Docs, Some("Document the API"), true, never_ask).unwrap();
        assert_eq!(r, "## User note\n\nDocument the API");
        assert!(resolve_request(Mode::Docs, None, true, never_ask).is_err());
    }
}
