//! Analysis results and the aggregator that builds them

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, Severity};
use crate::source::LanguageClass;
use crate::Error;

/// How an analyzer's run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The analyzer ran and its report was understood
    Completed { issues: usize },
    /// The analyzer did not run
    Skipped { reason: String },
    /// The analyzer ran but contributed nothing
    Failed { reason: String },
}

/// What happened to one language's analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReport {
    pub tool: String,
    pub language: LanguageClass,
    pub outcome: ToolOutcome,
}

/// Everything one analysis run found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Issues in the order their analyzers were invoked
    pub issues: Vec<Issue>,
    /// Analyzable languages with no file in the change set
    pub missing_languages: Vec<LanguageClass>,
    /// One report per language that had files
    pub reports: Vec<ToolReport>,
    /// Hint shown when nothing could be analyzed
    pub advisory: Option<String>,
}

impl AnalysisResult {
    /// Result for a change set without any analyzable file
    pub fn nothing_to_analyze() -> Self {
        Self {
            missing_languages: LanguageClass::ANALYZED.to_vec(),
            advisory: Some(
                "Add either a Go, TypeScript, Python or Java file to your PR".to_string(),
            ),
            ..Self::default()
        }
    }

    /// Combined issue count across all analyzers
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Issue count for one severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// "Add a <Lang> code file to your PR" for each missing language
    pub fn missing_language_hints(&self) -> Vec<String> {
        self.missing_languages
            .iter()
            .map(|language| format!("Add a {} code file to your PR", language))
            .collect()
    }

    /// Reports of analyzers that were skipped or failed
    pub fn degraded(&self) -> impl Iterator<Item = &ToolReport> {
        self.reports
            .iter()
            .filter(|report| !matches!(report.outcome, ToolOutcome::Completed { .. }))
    }

    /// Short summary line
    pub fn summary(&self) -> String {
        if self.reports.is_empty() {
            return "No analyzable files".to_string();
        }
        format!(
            "{} issues ({} errors, {} warnings, {} info) from {} analyzers",
            self.issue_count(),
            self.count_by_severity(Severity::Error),
            self.count_by_severity(Severity::Warning),
            self.count_by_severity(Severity::Info),
            self.reports.len()
        )
    }
}

/// Collects per-analyzer contributions into one [`AnalysisResult`]
///
/// Contributions are appended in the order they are recorded and never
/// modified afterwards.
#[derive(Debug, Default)]
pub struct IssueAggregator {
    issues: Vec<Issue>,
    reports: Vec<ToolReport>,
}

impl IssueAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analyzer run
    pub fn completed(&mut self, language: LanguageClass, tool: &str, issues: Vec<Issue>) {
        self.reports.push(ToolReport {
            tool: tool.to_string(),
            language,
            outcome: ToolOutcome::Completed {
                issues: issues.len(),
            },
        });
        self.issues.extend(issues);
    }

    /// Record an analyzer that did not run
    pub fn skipped(&mut self, language: LanguageClass, tool: &str, reason: impl Into<String>) {
        self.reports.push(ToolReport {
            tool: tool.to_string(),
            language,
            outcome: ToolOutcome::Skipped {
                reason: reason.into(),
            },
        });
    }

    /// Record an analyzer whose contribution was lost to `error`
    pub fn failed(&mut self, language: LanguageClass, tool: &str, error: &Error) {
        let outcome = match error {
            Error::ToolUnavailable { .. } => ToolOutcome::Skipped {
                reason: error.to_string(),
            },
            _ => ToolOutcome::Failed {
                reason: error.to_string(),
            },
        };
        self.reports.push(ToolReport {
            tool: tool.to_string(),
            language,
            outcome,
        });
    }

    /// Record the outcome of an analyzer run
    pub fn record(
        &mut self,
        language: LanguageClass,
        tool: &str,
        outcome: crate::Result<Vec<Issue>>,
    ) {
        match outcome {
            Ok(issues) => self.completed(language, tool, issues),
            Err(e) => self.failed(language, tool, &e),
        }
    }

    /// Issues collected so far
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Build the result
    pub fn finish(self, missing_languages: Vec<LanguageClass>) -> AnalysisResult {
        AnalysisResult {
            issues: self.issues,
            missing_languages,
            reports: self.reports,
            advisory: None,
        }
    }
}
