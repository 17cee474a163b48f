//! `get_project_structure`: a markdown overview of the repository.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use scout_rs::ToolDef;
use scout_rs::tools::core::{Tool, ToolFuture};
use scout_rs::tools::path::is_hidden;
use scout_rs::tools::spec::ToolSpec;
use serde::Deserialize;

use super::GET_PROJECT_STRUCTURE;
use super::project_type::detect_project_type;

/// Names skipped at every level of the structure tree.
pub const STRUCTURE_EXCLUDED: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "storage",
    "build",
    "public",
    "cache",
    "logs",
];

/// `get_project_structure` takes no arguments.
#[derive(Deserialize, JsonSchema)]
pub struct GetProjectStructureArgs {}

/// Render the directory tree of the repository with file counts and the
/// estimated project type.
pub struct GetProjectStructure {
    root: PathBuf,
}

impl GetProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Tool for GetProjectStructure {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(GET_PROJECT_STRUCTURE)
            .purpose("Get the structure of the whole repository")
            .when_to_use(
                "At the start of every investigation, to see the directory layout, how many \
                 files each directory holds, the estimated language and framework, and the \
                 total file count",
            )
            .when_not_to_use(
                "When you need the files of one directory, use list_files. \
                 It does not show file contents",
            )
            .parameters_for::<GetProjectStructureArgs>()
            .example(
                "get_project_structure()",
                "'- Cargo.toml', '- src/ (3 files)', '  - bin/ (1 file)', then \
                 '## Estimated project type : Rust' and '## Total files: 5'",
            )
            .output_format(
                "Markdown list. Directories end with '/' and their direct child count; \
                 only top-level files are listed by name.",
            )
            .disambiguate(
                "Need every file below src/",
                scout_rs::tools::names::LIST_FILES,
                "list_files with recursive=true lists each path",
            )
            .build()
            .to_tool_def()
    }

    fn execute(&self, _arguments: &str) -> ToolFuture<'_> {
        let root = self.root.clone();
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || render_structure(&root)).await {
                Ok(structure) => structure,
                Err(e) => format!("Error: project structure task failed: {e}"),
            }
        })
    }
}

/// Full tool output: tree, project type and total file count.
pub fn render_structure(root: &Path) -> String {
    let mut out = build_tree(root).join("\n");
    let project_type = detect_project_type(root);
    out.push_str(&format!("\n\n## Estimated project type : {project_type}\n\n"));
    let total = count_listed_files(&out);
    out.push_str(&format!("\n\n## Total files: {total}\n\n"));
    out
}

/// Tree lines for `root`, sorted by name at each level.
pub fn build_tree(root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    walk(root, 0, &mut lines);
    lines
}

fn walk(dir: &Path, depth: usize, lines: &mut Vec<String>) {
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<(String, PathBuf, bool)> = read
        .filter_map(Result::ok)
        .map(|e| {
            // Symlinked directories are not followed.
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.file_name().to_string_lossy().to_string(), e.path(), is_dir)
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let indent = "  ".repeat(depth);
    for (name, path, is_dir) in entries {
        if is_hidden(&name) || STRUCTURE_EXCLUDED.contains(&name.as_str()) {
            continue;
        }
        if is_dir {
            let count = visible_children(&path);
            let noun = if count == 1 { "file" } else { "files" };
            lines.push(format!("{indent}- {name}/ ({count} {noun})"));
            walk(&path, depth + 1, lines);
        } else if depth == 0 {
            lines.push(format!("- {name}"));
        }
    }
}

fn visible_children(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|read| {
            read.filter_map(Result::ok)
                .filter(|e| !is_hidden(&e.file_name().to_string_lossy()))
                .count()
        })
        .unwrap_or(0)
}

/// Count the files a structure listing mentions: every `(N file...)` count
/// plus each `- name` entry that is neither a directory nor a counted line.
pub fn count_listed_files(structure: &str) -> usize {
    let mut total = 0;
    for line in structure.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(count) = parse_file_count(trimmed) {
            total += count;
        } else if trimmed.starts_with("- ") && !trimmed.ends_with('/') {
            total += 1;
        }
    }
    total
}

/// The `N` of a `... (N file)` / `(N files)` line.
fn parse_file_count(line: &str) -> Option<usize> {
    let (_, after_paren) = line.rsplit_once('(')?;
    let (number, _) = after_paren.split_once(" file")?;
    number.trim().parse().ok()
}
