//! Tool abstractions for LLM function-calling agents.
//!
//! Every agent capability is a [`Tool`] implementor. Tools are collected
//! into a [`ToolSet`] which handles dispatch, validation, truncation and
//! timeouts.
//!
//! # Submodules
//!
//! - [`core`]: [`Tool`] trait and [`ToolSet`].
//! - [`spec`]: [`ToolSpec`](spec::ToolSpec) builder for structured tool
//!   descriptions with `when_to_use` / `when_not_to_use` guidance.
//! - [`path`]: workdir confinement checks shared by every file tool.
//! - [`files`]: `list_files`, `cat_file` and `grep_file`. Register all three
//!   with [`ToolSet::with_file_tools()`].
//! - [`names`]: tool name constants.

pub mod core;
pub mod files;
pub mod names;
pub mod path;
pub mod spec;

// Re-export commonly used items at the module level.
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, DEFAULT_TOOL_TIMEOUT, Tool, ToolFuture, ToolSet, parse_tool_args,
    truncate_result, validate_tool_arguments,
};
pub use files::{CatFile, FileToolsConfig, GrepFile, ListFiles};
