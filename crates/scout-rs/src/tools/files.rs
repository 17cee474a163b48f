//! Read-only file tools confined to a repository root.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`ListFiles`] | `list_files` | List a directory, optionally recursively |
//! | [`CatFile`] | `cat_file` | Read one file |
//! | [`GrepFile`] | `grep_file` | Regex-search one file with context lines |
//!
//! Every path argument is relative to the root and goes through
//! [`path::is_path_unsafe`](super::path::is_path_unsafe) first. Rejected
//! paths return exactly `Forbidden`.
//!
//! # Example
//!
//! ```ignore
//! let tools = ToolSet::new().with_file_tools_configured(
//!     "/my/project",
//!     FileToolsConfig::default().grep_max_matches(50),
//! );
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::core::{Tool, ToolFuture, ToolSet, parse_tool_args};
use super::names::{CAT_FILE, GREP_FILE, LIST_FILES};
use super::path::{self, FORBIDDEN, is_hidden, is_valid_directory, is_valid_file, normalize};
use super::spec::ToolSpec;
use crate::ToolDef;

// ── Defaults ────────────────────────────────────────────────────────

/// Default maximum grep matches before the output is cut.
pub const DEFAULT_MAX_GREP_MATCHES: u32 = 200;

/// Directory names skipped by recursive listings.
pub const LIST_EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor", "dist", "build", "public"];

/// Returned by `cat_file` for README files while masking is on.
pub const README_PLACEHOLDER: &str = "# README\n\n- TODO\n\n";

/// Per-tool configuration for [`ToolSet::with_file_tools_configured`].
#[derive(Debug, Clone)]
pub struct FileToolsConfig {
    /// Maximum `grep_file` matches reported per call.
    pub grep_max_matches: u32,
    /// Replace README contents with [`README_PLACEHOLDER`].
    pub mask_readme: bool,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            grep_max_matches: DEFAULT_MAX_GREP_MATCHES,
            mask_readme: true,
        }
    }
}

impl FileToolsConfig {
    pub fn grep_max_matches(mut self, max: u32) -> Self {
        self.grep_max_matches = max;
        self
    }

    pub fn mask_readme(mut self, enabled: bool) -> Self {
        self.mask_readme = enabled;
        self
    }
}

impl ToolSet {
    /// Register `list_files`, `cat_file` and `grep_file` rooted at `workdir`.
    pub fn with_file_tools(self, workdir: impl Into<PathBuf>) -> Self {
        self.with_file_tools_configured(workdir, FileToolsConfig::default())
    }

    /// Register the file tools with configuration overrides.
    pub fn with_file_tools_configured(
        self,
        workdir: impl Into<PathBuf>,
        config: FileToolsConfig,
    ) -> Self {
        let root = workdir.into();
        self.with(ListFiles::new(root.clone()))
            .with(CatFile::new(root.clone()).mask_readme(config.mask_readme))
            .with(GrepFile::new(root).max_matches(config.grep_max_matches))
    }
}

// ── Typed argument structs ──────────────────────────────────────────

/// Typed arguments for `list_files`.
#[derive(Deserialize, JsonSchema)]
pub struct ListFilesArgs {
    /// Directory relative to the repository root (e.g. '.', 'src').
    pub directory: String,
    /// List every descendant instead of direct children only (default false).
    #[serde(default)]
    pub recursive: bool,
}

/// Typed arguments for `cat_file`.
#[derive(Deserialize, JsonSchema)]
pub struct CatFileArgs {
    /// File path relative to the repository root (e.g. 'src/main.rs').
    pub file_path: String,
}

/// Typed arguments for `grep_file`.
#[derive(Deserialize, JsonSchema)]
pub struct GrepFileArgs {
    /// File path relative to the repository root.
    pub file_path: String,
    /// Regular expression searched on each line (e.g. 'fn\\s+handle_').
    pub regex_pattern: String,
    /// Context lines to include before each match (default 0).
    #[serde(default)]
    pub include_before_lines: Option<u32>,
    /// Context lines to include after each match (default 0).
    #[serde(default)]
    pub include_after_lines: Option<u32>,
}

// ── ListFiles ───────────────────────────────────────────────────────

/// List entries of a directory under the root.
///
/// Hidden entries are skipped. Recursive listings also skip anything below
/// a hidden directory or one of [`LIST_EXCLUDED_DIRS`].
pub struct ListFiles {
    root: PathBuf,
}

impl ListFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Tool for ListFiles {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(LIST_FILES)
            .purpose("List the files and directories inside a repository directory")
            .when_to_use(
                "When you need to discover what exists in a specific directory, \
                 or every file below it with recursive=true",
            )
            .when_not_to_use(
                "When you need an overview of the whole repository, use get_project_structure. \
                 When you already know the file path, use cat_file",
            )
            .parameters_for::<ListFilesArgs>()
            .example(
                "list_files(directory='src', recursive=false)",
                "'src/lib.rs', 'src/tools/' one per line",
            )
            .output_format(
                "One path per line relative to the repository root, sorted. \
                 Directories end with '/'.",
            )
            .build()
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let root = self.root.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: ListFilesArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            let Some(full) = path::resolve(&root, &args.directory) else {
                return FORBIDDEN.to_string();
            };
            if !is_valid_directory(&full) {
                return format!("Not a valid directory: {}", args.directory);
            }

            let base = normalize(Path::new(&args.directory));
            let recursive = args.recursive;
            let listing =
                tokio::task::spawn_blocking(move || list_entries(&full, &base, recursive)).await;

            match listing {
                Ok(Ok(entries)) if entries.is_empty() => {
                    format!("Directory is empty: {}", args.directory)
                }
                Ok(Ok(entries)) => entries.join("\n"),
                Ok(Err(e)) => format!("Error listing {}: {e}", args.directory),
                Err(e) => format!("Error: listing task failed: {e}"),
            }
        })
    }
}

/// Collect the entries of `dir`, rendered under `base`, sorted and unique.
pub fn list_entries(dir: &Path, base: &Path, recursive: bool) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();

    if recursive {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || (!is_hidden(&name) && !LIST_EXCLUDED_DIRS.contains(&&*name))
            });
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {e}", dir.display());
                    continue;
                }
            };
            let Ok(rel) = entry.path().strip_prefix(dir) else {
                continue;
            };
            // Symlinked directories render as directories but are not descended into.
            entries.push(render_entry(base, rel, entry.path().is_dir()));
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_hidden(&name) {
                continue;
            }
            entries.push(render_entry(base, Path::new(&name), entry.path().is_dir()));
        }
    }

    entries.sort();
    entries.dedup();
    Ok(entries)
}

fn render_entry(base: &Path, rel: &Path, is_dir: bool) -> String {
    let mut rendered = base.join(rel).to_string_lossy().replace('\\', "/");
    if is_dir {
        rendered.push('/');
    }
    rendered
}

// ── CatFile ─────────────────────────────────────────────────────────

/// Read a whole file under the root.
pub struct CatFile {
    root: PathBuf,
    mask_readme: bool,
}

impl CatFile {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mask_readme: true,
        }
    }

    /// Return [`README_PLACEHOLDER`] for any path containing "readme".
    pub fn mask_readme(mut self, enabled: bool) -> Self {
        self.mask_readme = enabled;
        self
    }
}

impl Tool for CatFile {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(CAT_FILE)
            .purpose("Read the full contents of one repository file")
            .when_to_use("When you know a file's path and need to read its code or configuration")
            .when_not_to_use(
                "When you only need the lines matching a pattern in a large file, use grep_file. \
                 When you do not know the path yet, use list_files",
            )
            .parameters_for::<CatFileArgs>()
            .example(
                "cat_file(file_path='src/main.rs')",
                "the file's text",
            )
            .output_format("Raw file content as text")
            .disambiguate(
                "Need only the definition of one function in a long file",
                GREP_FILE,
                "grep_file returns just the matching lines with context",
            )
            .build()
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let root = self.root.clone();
        let mask_readme = self.mask_readme;
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: CatFileArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            let Some(full) = path::resolve(&root, &args.file_path) else {
                return FORBIDDEN.to_string();
            };
            if !is_valid_file(&full) {
                return format!("Not a valid file: {}", args.file_path);
            }
            if mask_readme && args.file_path.to_lowercase().contains("readme") {
                debug!("Masking README contents for {}", args.file_path);
                return README_PLACEHOLDER.to_string();
            }

            match tokio::fs::read(&full).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("Error reading {}: {e}", args.file_path),
            }
        })
    }
}

// ── GrepFile ────────────────────────────────────────────────────────

/// Regex search within one file, reporting numbered lines with context.
pub struct GrepFile {
    root: PathBuf,
    max_matches: u32,
}

impl GrepFile {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_matches: DEFAULT_MAX_GREP_MATCHES,
        }
    }

    pub fn max_matches(mut self, max: u32) -> Self {
        self.max_matches = max;
        self
    }
}

impl Tool for GrepFile {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(GREP_FILE)
            .purpose("Search one file for lines matching a regular expression")
            .when_to_use(
                "When you know which file to look in and need the lines that mention a \
                 symbol, route or setting, optionally with surrounding context",
            )
            .when_not_to_use(
                "When you need to understand the whole file, use cat_file. \
                 When you do not know which file to search, use list_files first",
            )
            .parameters_for::<GrepFileArgs>()
            .example(
                "grep_file(file_path='src/routes.rs', regex_pattern='fn login', \
                 include_before_lines=1, include_after_lines=3)",
                "'Line: 41 - ...' entries for lines 41-45 followed by '---'",
            )
            .output_format(
                "'Line: N - text' per line; '---' separates match groups; \
                 a 'No matches' message when nothing matched",
            )
            .disambiguate(
                "Need the full contents of a short file",
                CAT_FILE,
                "cat_file returns everything in one call",
            )
            .build()
            .to_tool_def()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let root = self.root.clone();
        let max_matches = self.max_matches;
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: GrepFileArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };
            let Some(full) = path::resolve(&root, &args.file_path) else {
                return FORBIDDEN.to_string();
            };
            if !is_valid_file(&full) {
                return format!("Not a valid file: {}", args.file_path);
            }
            let re = match Regex::new(&args.regex_pattern) {
                Ok(re) => re,
                Err(e) => {
                    return format!("Error: invalid regex '{}': {e}", args.regex_pattern);
                }
            };
            let content = match tokio::fs::read(&full).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => return format!("Error reading {}: {e}", args.file_path),
            };

            let found = grep_lines(
                &content,
                &re,
                args.include_before_lines.unwrap_or(0) as usize,
                args.include_after_lines.unwrap_or(0) as usize,
                max_matches as usize,
            );
            if found.is_empty() {
                format!(
                    "No matches for '{}' in {}",
                    args.regex_pattern, args.file_path
                )
            } else {
                found
            }
        })
    }
}

/// Render every line of `content` matching `re` with its context window.
///
/// Each match emits lines `[i - before, i + after]` clamped to the file as
/// `Line: N - text`, followed by `---` unless the window reaches the last
/// line. Windows of nearby matches may overlap. Returns an empty string
/// when nothing matches.
pub fn grep_lines(
    content: &str,
    re: &Regex,
    before: usize,
    after: usize,
    max_matches: usize,
) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut matches = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !re.is_match(line) {
            continue;
        }
        if matches == max_matches {
            out.push(format!("[match limit reached: {max_matches}]"));
            break;
        }
        matches += 1;

        let start = i.saturating_sub(before);
        let end = (i + after + 1).min(lines.len());
        for (n, text) in lines.iter().enumerate().take(end).skip(start) {
            out.push(format!("Line: {} - {text}", n + 1));
        }
        if end < lines.len() {
            out.push("---".to_string());
        }
    }

    out.join("\n")
}

// ── Tests ───────────────────────────────────────────────────────────
