//! Repository investigation agent built on scout-rs.
//!
//! `scout-code` turns a natural-language request into an agent run over a
//! local repository. The agent explores the code with five read-only tools
//! (`list_files`, `cat_file`, `grep_file`, `get_project_structure`,
//! `get_git_remotes`) and answers in one of four [`Mode`]s: code answers,
//! README generation, mermaid flowcharts and test-gap reviews.
//!
//! # Library usage
//!
//! ```ignore
//! use scout_code::{Mode, ScoutConfig};
//! use scout_rs::agent::harness::Harness;
//!
//! let config = ScoutConfig { mode: Mode::Docs, ..Default::default() };
//! let tools = config.build_tool_set();
//! let harness_config = config.build_harness_config();
//! let messages = harness_config.initial_messages("Write a README");
//! let result = Harness::new(&client, &tools, harness_config).run(messages).await?;
//! ```
//!
//! # Binary
//!
//! ```sh
//! scout --request "Where is the session cookie validated?"
//! scout --mode docs --rewrite-output --workdir ../shop
//! scout --mode mermaid --request "How does checkout work?"
//! ```

pub mod config;
pub mod logging;
pub mod mode;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod request;
pub mod rewrite;
pub mod tools;

pub use config::ScoutConfig;
pub use mode::Mode;
pub use output::{
    FinalOutput, default_output_path, finalize, finalize_with_rewrite, sanitize_mermaid,
    strip_markdown_fence,
};
pub use progress::ProgressHandler;
pub use report::UsageReport;
pub use request::resolve_request;
pub use rewrite::rewrite_friendlier;
pub use tools::ProjectToolsExt;
