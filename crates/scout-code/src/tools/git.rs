//! `get_git_remotes`: the repository's git remotes, for clone instructions.

use std::path::PathBuf;

use schemars::JsonSchema;
use scout_rs::ToolDef;
use scout_rs::tools::core::{Tool, ToolFuture};
use scout_rs::tools::spec::ToolSpec;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use super::GET_GIT_REMOTES;

/// Output of a finished git command.
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run git with `args` in `workdir`.
pub async fn run_git(workdir: &std::path::Path, args: &[&str]) -> Result<GitOutput, String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .output()
        .await
        .map_err(|e| format!("Error: failed to run git: {e}"))?;

    Ok(GitOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// `get_git_remotes` takes no arguments.
#[derive(Deserialize, JsonSchema)]
pub struct GetGitRemotesArgs {}

/// List git remotes (`git remote -v`).
pub struct GetGitRemotes {
    workdir: PathBuf,
}

impl GetGitRemotes {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl Tool for GetGitRemotes {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(GET_GIT_REMOTES)
            .purpose("Get the git remotes of the repository")
            .when_to_use(
                "When writing installation instructions that need the `git clone` URL, \
                 or to learn where the project is hosted",
            )
            .when_not_to_use("When you need information about the code itself")
            .parameters_for::<GetGitRemotesArgs>()
            .example(
                "get_git_remotes()",
                "'origin\thttps://github.com/acme/shop.git (fetch)' and the push line",
            )
            .output_format("The output of `git remote -v`")
            .build()
            .to_tool_def()
    }

    fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
        let workdir = self.workdir.clone();
        Box::pin(async move {
            let output = match run_git(&workdir, &["remote", "-v"]).await {
                Ok(o) => o,
                Err(e) => return e,
            };
            if !output.success {
                debug!("git remote -v failed: {}", output.stderr.trim());
                let stderr = output.stderr.trim();
                return if stderr.is_empty() {
                    "Error: git remote -v failed".to_string()
                } else {
                    format!("Error: {stderr}")
                };
            }
            if output.stdout.trim().is_empty() {
                "No git remotes configured".to_string()
            } else {
                output.stdout
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .await
            .is_ok_and(|o| o.status.success())
    }

    #[tokio::test]
    async fn reports_configured_remotes() {
        if !git_available().await {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "-q"]).await.unwrap();
        run_git(
            dir.path(),
            &["remote", "add", "origin", "https://github.com/acme/shop.git"],
        )
        .await
        .unwrap();

        let out = GetGitRemotes::new(dir.path()).execute("{}").await;
        assert!(out.contains("origin\thttps://github.com/acme/shop.git (fetch)"), "got: {out}");
    }

    #[tokio::test]
    async fn reports_no_remotes() {
        if !git_available().await {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "-q"]).await.unwrap();
        let out = GetGitRemotes::new(dir.path()).execute("{}").await;
        assert_eq!(out, "No git remotes configured");
    }

    #[tokio::test]
    async fn missing_workdir_is_an_error_string() {
        let out = GetGitRemotes::new("/definitely/not/a/dir").execute("{}").await;
        assert!(out.starts_with("Error:"), "got: {out}");
    }
}
