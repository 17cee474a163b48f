//! Canonical tool name constants.
//!
//! Tool-name literals reference these constants so prompts, progress output
//! and registrations agree on one spelling.

pub const LIST_FILES: &str = "list_files";
pub const CAT_FILE: &str = "cat_file";
pub const GREP_FILE: &str = "grep_file";
