//! Project language and framework detection from manifest files.
//!
//! Each language is recognised by the manifests it keeps at the repository
//! root. The framework is the first rule whose dependency marker appears in
//! one of those manifests. Matching is case-insensitive.

use std::fmt;
use std::path::Path;

use tracing::debug;

/// Estimated language and framework of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectType {
    pub language: String,
    pub framework: Option<String>,
}

impl ProjectType {
    pub fn unknown() -> Self {
        Self {
            language: "Unknown".to_string(),
            framework: None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.framework {
            Some(framework) => write!(f, "{} / {framework}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

struct FrameworkRule {
    name: &'static str,
    /// Any of these (lowercased) substrings in a manifest selects the framework.
    markers: &'static [&'static str],
}

struct LanguageRule {
    language: &'static str,
    manifests: &'static [&'static str],
    /// Manifest matched by file extension (e.g. `csproj`).
    manifest_extension: Option<&'static str>,
    frameworks: &'static [FrameworkRule],
}

const fn fw(name: &'static str, markers: &'static [&'static str]) -> FrameworkRule {
    FrameworkRule { name, markers }
}

// Order matters: PHP before JavaScript (Laravel ships a package.json), and
// within a language the more specific framework comes first.
const LANGUAGE_RULES: &[LanguageRule] = &[
    LanguageRule {
        language: "Rust",
        manifests: &["Cargo.toml"],
        manifest_extension: None,
        frameworks: &[
            fw("Actix", &["actix-web"]),
            fw("Axum", &["axum"]),
            fw("Rocket", &["rocket"]),
            fw("Tauri", &["tauri"]),
        ],
    },
    LanguageRule {
        language: "PHP",
        manifests: &["composer.json"],
        manifest_extension: None,
        frameworks: &[
            fw("Laravel", &["laravel/framework"]),
            fw("Symfony", &["symfony/framework-bundle"]),
            fw("Slim", &["slim/slim"]),
        ],
    },
    LanguageRule {
        language: "Python",
        manifests: &["pyproject.toml", "requirements.txt", "setup.py", "Pipfile"],
        manifest_extension: None,
        frameworks: &[
            fw("Django", &["django"]),
            fw("FastAPI", &["fastapi"]),
            fw("Flask", &["flask"]),
        ],
    },
    LanguageRule {
        language: "Go",
        manifests: &["go.mod"],
        manifest_extension: None,
        frameworks: &[
            fw("Gin", &["github.com/gin-gonic/gin"]),
            fw("Echo", &["github.com/labstack/echo"]),
            fw("Fiber", &["github.com/gofiber/fiber"]),
        ],
    },
    LanguageRule {
        language: "Java",
        manifests: &["pom.xml", "build.gradle", "build.gradle.kts"],
        manifest_extension: None,
        frameworks: &[
            fw("Spring Boot", &["spring-boot"]),
            fw("Quarkus", &["quarkus"]),
            fw("Micronaut", &["micronaut"]),
        ],
    },
    LanguageRule {
        language: "Ruby",
        manifests: &["Gemfile"],
        manifest_extension: None,
        frameworks: &[
            fw("Rails", &["'rails'", "\"rails\""]),
            fw("Sinatra", &["sinatra"]),
        ],
    },
    LanguageRule {
        language: "Elixir",
        manifests: &["mix.exs"],
        manifest_extension: None,
        frameworks: &[fw("Phoenix", &[":phoenix,", ":phoenix "])],
    },
    LanguageRule {
        language: "C#",
        manifests: &[],
        manifest_extension: Some("csproj"),
        frameworks: &[fw("ASP.NET Core", &["microsoft.net.sdk.web", "microsoft.aspnetcore"])],
    },
    LanguageRule {
        language: "JavaScript",
        manifests: &["package.json"],
        manifest_extension: None,
        frameworks: &[
            fw("Next.js", &["\"next\""]),
            fw("Nuxt", &["\"nuxt\""]),
            fw("NestJS", &["@nestjs/core"]),
            fw("Angular", &["@angular/core"]),
            fw("Svelte", &["\"svelte\""]),
            fw("React", &["\"react\""]),
            fw("Vue", &["\"vue\""]),
            fw("Express", &["\"express\""]),
            fw("Fastify", &["\"fastify\""]),
        ],
    },
];

/// Estimate the project type of the repository at `root`.
pub fn detect_project_type(root: &Path) -> ProjectType {
    for rule in LANGUAGE_RULES {
        let contents = manifest_contents(root, rule);
        if contents.is_empty() {
            continue;
        }

        let framework = rule
            .frameworks
            .iter()
            .find(|f| {
                contents
                    .iter()
                    .any(|c| f.markers.iter().any(|m| c.contains(m)))
            })
            .map(|f| f.name.to_string());

        let language = if rule.language == "JavaScript" && is_typescript(root, &contents) {
            "TypeScript"
        } else {
            rule.language
        };

        debug!(
            "Detected project type {language} / {}",
            framework.as_deref().unwrap_or("-")
        );
        return ProjectType {
            language: language.to_string(),
            framework,
        };
    }

    ProjectType::unknown()
}

/// Lowercased contents of every manifest of `rule` present at `root`.
/// Unreadable manifests count as present with empty content.
fn manifest_contents(root: &Path, rule: &LanguageRule) -> Vec<String> {
    let mut found: Vec<std::path::PathBuf> = rule
        .manifests
        .iter()
        .map(|m| root.join(m))
        .filter(|p| p.is_file())
        .collect();

    if let Some(ext) = rule.manifest_extension
        && let Ok(entries) = std::fs::read_dir(root)
    {
        found.extend(
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == ext)),
        );
    }

    found
        .iter()
        .map(|p| {
            std::fs::read(p)
                .map(|bytes| String::from_utf8_lossy(&bytes).to_lowercase())
                .unwrap_or_default()
        })
        .collect()
}

fn is_typescript(root: &Path, manifests: &[String]) -> bool {
    root.join("tsconfig.json").is_file() || manifests.iter().any(|c| c.contains("\"typescript\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn rust_with_axum() {
        let dir = repo(&[(
            "Cargo.toml",
            "[package]\nname = \"svc\"\n[dependencies]\naxum = \"0.8\"\n",
        )]);
        let pt = detect_project_type(dir.path());
        assert_eq!(pt.to_string(), "Rust / Axum");
    }

    #[test]
    fn laravel_wins_over_package_json() {
        let dir = repo(&[
            ("composer.json", r#"{"require": {"laravel/framework": "^11.0"}}"#),
            ("package.json", r#"{"devDependencies": {"vite": "^5"}}"#),
        ]);
        let pt = detect_project_type(dir.path());
        assert_eq!(pt.language, "PHP");
        assert_eq!(pt.framework.as_deref(), Some("Laravel"));
    }

    #[test]
    fn next_before_react_and_typescript() {
        let dir = repo(&[
            (
                "package.json",
                r#"{"dependencies": {"next": "14", "react": "18"}}"#,
            ),
            ("tsconfig.json", "{}"),
        ]);
        assert_eq!(detect_project_type(dir.path()).to_string(), "TypeScript / Next.js");
    }

    #[test]
    fn python_requirements_case_insensitive() {
        let dir = repo(&[("requirements.txt", "Flask==3.0\nrequests\n")]);
        assert_eq!(detect_project_type(dir.path()).to_string(), "Python / Flask");
    }

    #[test]
    fn language_without_framework() {
        let dir = repo(&[("go.mod", "module example.com/tool\n\ngo 1.22\n")]);
        let pt = detect_project_type(dir.path());
        assert_eq!(pt, ProjectType {
            language: "Go".into(),
            framework: None
        });
        assert_eq!(pt.to_string(), "Go");
    }

    #[test]
    fn csproj_by_extension() {
        let dir = repo(&[(
            "Api.csproj",
            r#"<Project Sdk="Microsoft.NET.Sdk.Web"></Project>"#,
        )]);
        assert_eq!(detect_project_type(dir.path()).to_string(), "C# / ASP.NET Core");
    }

    #[test]
    fn unknown_when_no_manifest() {
        let dir = repo(&[("notes.txt", "hello")]);
        assert_eq!(detect_project_type(dir.path()), ProjectType::unknown());
    }
}
