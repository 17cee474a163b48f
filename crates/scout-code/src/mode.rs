//! Agent modes selectable with `--mode`.

use std::fmt;

use clap::ValueEnum;

use crate::prompt;

/// What the agent is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Locate the code relevant to a request and plan the change.
    #[default]
    Code,
    /// Write README-style documentation for the repository.
    Docs,
    /// Trace a feature and draw it as a mermaid flowchart.
    Mermaid,
    /// Review test coverage and suggest missing tests.
    Testing,
}

impl Mode {
    /// Lowercase name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Code => "code",
            Mode::Docs => "docs",
            Mode::Mermaid => "mermaid",
            Mode::Testing => "testing",
        }
    }

    /// Display name of the agent running in this mode.
    pub fn agent_name(self) -> &'static str {
        match self {
            Mode::Code => "Code Agent",
            Mode::Docs => "Docs Agent",
            Mode::Mermaid => "Mermaid Agent",
            Mode::Testing => "Testing Agent",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Mode::Code => prompt::CODE_PROMPT,
            Mode::Docs => prompt::DOCS_PROMPT,
            Mode::Mermaid => prompt::MERMAID_PROMPT,
            Mode::Testing => prompt::TESTING_PROMPT,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
