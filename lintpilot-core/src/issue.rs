//! Canonical review issue that every analyzer finding is normalized into

use serde::{Deserialize, Serialize};

/// Severity of a review issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Map a tool-reported severity string
    ///
    /// The input is lower-cased first. Empty or unrecognized strings become
    /// `Warning`, the level linters report findings at by default.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" | "fatal" => Self::Error,
            "warning" | "warn" => Self::Warning,
            "info" | "ignore" | "note" => Self::Info,
            _ => Self::Warning,
        }
    }

    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single review issue reported by an analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// File the issue was reported against, as the tool reported it
    pub path: String,
    /// 1-based line, 0 when the tool gave none
    pub line: u32,
    /// 1-based column, 0 when the tool gave none
    pub column: u32,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    /// Name of the tool that reported the issue
    pub source: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: [{}] {}",
            self.path, self.line, self.column, self.severity, self.title
        )?;
        if !self.suggestion.is_empty() {
            write!(f, " (suggestion: {})", self.suggestion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_is_lowercased() {
        assert_eq!(Severity::parse_lenient("ERROR"), Severity::Error);
        assert_eq!(Severity::parse_lenient("Warning"), Severity::Warning);
        assert_eq!(Severity::parse_lenient("info"), Severity::Info);
        assert_eq!(Severity::parse_lenient("ignore"), Severity::Info);
    }

    #[test]
    fn test_severity_unknown_defaults_to_warning() {
        assert_eq!(Severity::parse_lenient(""), Severity::Warning);
        assert_eq!(Severity::parse_lenient("convention"), Severity::Warning);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue {
            path: "a.go".to_string(),
            line: 3,
            column: 7,
            severity: Severity::Error,
            title: "GolangCILint Issue: unused variable".to_string(),
            description: "unused variable".to_string(),
            suggestion: String::new(),
            source: "GolangCILint".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "a.go:3:7: [error] GolangCILint Issue: unused variable"
        );
    }
}
