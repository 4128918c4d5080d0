//! Changed files handed to the analyzer and their language classification

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A changed file from a pull request, already fetched by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file in the repository
    pub path: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Language class derived from the file extension
    pub fn language(&self) -> LanguageClass {
        LanguageClass::from_path(&self.path)
    }

    /// Final path component, used as the staged file name
    pub fn base_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.path)
    }
}

/// Source language of a file, selecting which analyzer runs on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageClass {
    Go,
    TypeScript,
    Python,
    Java,
    /// Anything else; never analyzed
    Unknown,
}

impl LanguageClass {
    /// Analyzable languages in the order their tools are invoked
    pub const ANALYZED: [LanguageClass; 4] = [
        LanguageClass::TypeScript,
        LanguageClass::Go,
        LanguageClass::Python,
        LanguageClass::Java,
    ];

    /// Classify a path by its extension
    ///
    /// Matching is a case-sensitive suffix match, so `main.GO` is `Unknown`.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".go") {
            Self::Go
        } else if path.ends_with(".ts") {
            Self::TypeScript
        } else if path.ends_with(".py") {
            Self::Python
        } else if path.ends_with(".java") {
            Self::Java
        } else {
            Self::Unknown
        }
    }

    /// Whether files of this class are analyzed
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Go => "Go",
            Self::TypeScript => "TypeScript",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for LanguageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
