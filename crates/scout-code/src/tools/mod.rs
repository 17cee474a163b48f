//! Repository-level tools for the scout agent.
//!
//! Provides `get_project_structure` and `get_git_remotes` and the
//! [`ProjectToolsExt`] trait for registering them on a
//! [`ToolSet`](scout_rs::tools::core::ToolSet).

pub mod git;
pub mod project_type;
pub mod structure;

pub use git::GetGitRemotes;
pub use project_type::{ProjectType, detect_project_type};
pub use structure::{GetProjectStructure, count_listed_files, render_structure};

// ── Tool name constants ─────────────────────────────────────────────

pub const GET_PROJECT_STRUCTURE: &str = "get_project_structure";
pub const GET_GIT_REMOTES: &str = "get_git_remotes";

// ── Extension trait ─────────────────────────────────────────────────

/// Extension trait for registering the repository tools on a
/// [`ToolSet`](scout_rs::tools::core::ToolSet).
///
/// ```ignore
/// let tools = ToolSet::new()
///     .with_file_tools(&workdir)
///     .with_project_tools(&workdir);
/// ```
pub trait ProjectToolsExt {
    fn with_project_tools(self, workdir: impl Into<std::path::PathBuf>) -> Self;
}

impl ProjectToolsExt for scout_rs::tools::core::ToolSet {
    fn with_project_tools(self, workdir: impl Into<std::path::PathBuf>) -> Self {
        let wd = workdir.into();
        self.with(GetProjectStructure::new(wd.clone()))
            .with(GetGitRemotes::new(wd))
    }
}
