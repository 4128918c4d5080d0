//! Per-language analyzer table
//!
//! Each [`Linter`] knows its binary, how to build its argument list, which
//! output format it emits and which exit codes still mean a usable run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::source::LanguageClass;

/// Structured output format emitted by an analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON, possibly surrounded by log noise
    Json,
    /// Checkstyle XML report
    CheckstyleXml,
}

/// Which exit codes still count as a completed analyzer run
///
/// Linters commonly exit non-zero just because they found issues, so a
/// non-zero code alone never means failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCodePolicy {
    /// The listed codes are always accepted, any other code only with output
    ///
    /// Output from an unlisted code is handed to the normalizer, which
    /// decides whether it holds a report.
    CleanOrOutput(&'static [i32]),
    /// Any code is accepted as long as the analyzer wrote something
    AnyWithOutput,
}

impl ExitCodePolicy {
    /// Whether a run with this exit code may have produced a usable report
    pub fn accepts(&self, exit_code: i32, has_output: bool) -> bool {
        match self {
            Self::CleanOrOutput(codes) => codes.contains(&exit_code) || has_output,
            Self::AnyWithOutput => exit_code == 0 || has_output,
        }
    }
}

/// Supported analyzers, one per analyzed language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linter {
    /// ESLint via npx, for TypeScript
    EsLint,
    /// golangci-lint, for Go
    GolangCiLint,
    /// flake8, for Python
    Flake8,
    /// Checkstyle, for Java
    Checkstyle,
}

impl Linter {
    /// The analyzer responsible for a language
    pub fn for_language(language: LanguageClass) -> Option<Self> {
        match language {
            LanguageClass::TypeScript => Some(Self::EsLint),
            LanguageClass::Go => Some(Self::GolangCiLint),
            LanguageClass::Python => Some(Self::Flake8),
            LanguageClass::Java => Some(Self::Checkstyle),
            LanguageClass::Unknown => None,
        }
    }

    /// Language this analyzer handles
    pub fn language(&self) -> LanguageClass {
        match self {
            Self::EsLint => LanguageClass::TypeScript,
            Self::GolangCiLint => LanguageClass::Go,
            Self::Flake8 => LanguageClass::Python,
            Self::Checkstyle => LanguageClass::Java,
        }
    }

    /// Name recorded as the `source` of every issue
    pub fn name(&self) -> &'static str {
        match self {
            Self::EsLint => "ESLint",
            Self::GolangCiLint => "GolangCILint",
            Self::Flake8 => "Flake8",
            Self::Checkstyle => "Checkstyle",
        }
    }

    /// Binary looked up on the search path
    pub fn program(&self) -> &'static str {
        match self {
            Self::EsLint => "npx",
            Self::GolangCiLint => "golangci-lint",
            Self::Flake8 => "flake8",
            Self::Checkstyle => "checkstyle",
        }
    }

    /// Fixed locations tried when the binary is not on the search path
    pub fn fallback_paths(&self) -> &'static [&'static str] {
        match self {
            Self::GolangCiLint => &["/snap/bin/golangci-lint"],
            _ => &[],
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Checkstyle => OutputFormat::CheckstyleXml,
            _ => OutputFormat::Json,
        }
    }

    pub fn exit_policy(&self) -> ExitCodePolicy {
        match self {
            // 1 = findings reported; 2+ = configuration error, or findings with warnings
            Self::EsLint | Self::GolangCiLint | Self::Flake8 => {
                ExitCodePolicy::CleanOrOutput(&[0, 1])
            }
            // exit code is the number of errors found
            Self::Checkstyle => ExitCodePolicy::AnyWithOutput,
        }
    }

    /// Arguments for analyzing `files` with the config at `config_path`
    pub fn args(&self, config_path: &Path, files: &[PathBuf]) -> Vec<OsString> {
        let config = config_path.as_os_str().to_os_string();
        let mut args: Vec<OsString> = match self {
            Self::EsLint => vec![
                "eslint".into(),
                "--format".into(),
                "json".into(),
                "--config".into(),
                config,
            ],
            Self::GolangCiLint => vec![
                "run".into(),
                "--config".into(),
                config,
                "--output.json.path".into(),
                "stdout".into(),
            ],
            Self::Flake8 => vec!["--format=json".into(), "--config".into(), config],
            Self::Checkstyle => vec!["-f".into(), "xml".into(), "-c".into(), config],
        };
        args.extend(files.iter().map(|f| f.as_os_str().to_os_string()));
        args
    }

    /// Locate the analyzer binary
    ///
    /// An explicitly configured path wins. Otherwise the search path is
    /// consulted, then the fixed fallback locations.
    pub fn resolve(&self, configured: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = configured {
            let path_buf = PathBuf::from(path);
            if path_buf.exists() {
                return Some(path_buf);
            }
            if let Ok(found) = which::which(path) {
                return Some(found);
            }
            warn!(
                tool = self.name(),
                path = %path,
                "Configured analyzer path not found, trying auto-detection"
            );
        }

        if let Ok(found) = which::which(self.program()) {
            debug!(tool = self.name(), path = %found.display(), "Analyzer detected");
            return Some(found);
        }

        self.fallback_paths()
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl std::fmt::Display for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
