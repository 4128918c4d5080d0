//! JSON report schemas
//!
//! Three shapes are understood, sniffed from the parsed payload:
//! - lint reports with an `Issues` array (golangci-lint and compatible tools)
//! - ESLint's native array of per-file results
//! - flake8-json's object mapping file names to violations

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::issue::{Issue, Severity};
use crate::{Error, Result};

/// Message emitted for files outside the analyzer's configuration; not a finding
pub const IGNORED_FILE_MESSAGE: &str =
    "File ignored because no matching configuration was supplied.";

const SUGGESTION: &str = "Consider fixing this issue based on the linter's feedback.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LintReport {
    #[serde(default)]
    issues: Option<Vec<LintIssue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LintIssue {
    #[serde(default)]
    text: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    pos: Position,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Position {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintFileResult {
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    severity: u8,
    #[serde(default)]
    message: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

#[derive(Debug, Deserialize)]
struct Flake8Violation {
    #[serde(default)]
    code: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    line_number: u32,
    #[serde(default)]
    column_number: u32,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportShape {
    LintReport,
    Eslint,
    Flake8,
}

fn sniff(payload: &Value) -> std::result::Result<ReportShape, &'static str> {
    match payload {
        Value::Object(map) if map.contains_key("Issues") => Ok(ReportShape::LintReport),
        Value::Array(_) => Ok(ReportShape::Eslint),
        Value::Object(map) if map.values().all(Value::is_array) => Ok(ReportShape::Flake8),
        other => Err(shape_of(other)),
    }
}

/// Convert a parsed JSON payload into issues attributed to `tool`
pub fn parse_report(tool: &str, payload: Value) -> Result<Vec<Issue>> {
    let shape = sniff(&payload)
        .map_err(|shape| Error::parse(tool, format!("unrecognized report shape: {}", shape)))?;

    match shape {
        ReportShape::LintReport => {
            let report: LintReport = serde_json::from_value(payload)
                .map_err(|e| Error::parse(tool, format!("invalid lint report: {}", e)))?;
            Ok(from_lint_report(tool, report))
        }
        ReportShape::Eslint => {
            let results: Vec<EslintFileResult> = serde_json::from_value(payload)
                .map_err(|e| Error::parse(tool, format!("invalid ESLint report: {}", e)))?;
            Ok(from_eslint(tool, results))
        }
        ReportShape::Flake8 => {
            let report: BTreeMap<String, Vec<Flake8Violation>> = serde_json::from_value(payload)
                .map_err(|e| Error::parse(tool, format!("invalid flake8 report: {}", e)))?;
            Ok(from_flake8(tool, report))
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn from_lint_report(tool: &str, report: LintReport) -> Vec<Issue> {
    report
        .issues
        .unwrap_or_default()
        .into_iter()
        .filter(|issue| issue.text != IGNORED_FILE_MESSAGE)
        .map(|issue| Issue {
            path: issue.pos.filename,
            line: issue.pos.line,
            column: issue.pos.column,
            severity: Severity::parse_lenient(&issue.severity),
            title: format!("{} Issue: {}", tool, issue.text),
            description: issue.text,
            suggestion: SUGGESTION.to_string(),
            source: tool.to_string(),
        })
        .collect()
}

fn eslint_severity(level: u8) -> Severity {
    match level {
        1 => Severity::Warning,
        2 => Severity::Error,
        _ => Severity::Info,
    }
}

fn from_eslint(tool: &str, results: Vec<EslintFileResult>) -> Vec<Issue> {
    let mut issues = Vec::new();
    for file in results {
        for message in file.messages {
            if message.message == IGNORED_FILE_MESSAGE {
                continue;
            }
            let description = match message.rule_id {
                Some(ref rule) => format!("{} ({})", message.message, rule),
                None => message.message.clone(),
            };
            issues.push(Issue {
                path: file.file_path.clone(),
                line: message.line,
                column: message.column,
                severity: eslint_severity(message.severity),
                title: format!("{} Issue: {}", tool, message.message),
                description,
                suggestion: SUGGESTION.to_string(),
                source: tool.to_string(),
            });
        }
    }
    issues
}

fn flake8_severity(code: &str) -> Severity {
    if code.starts_with('F') || code.starts_with("E9") {
        Severity::Error
    } else {
        Severity::Warning
    }
}

fn from_flake8(tool: &str, report: BTreeMap<String, Vec<Flake8Violation>>) -> Vec<Issue> {
    report
        .into_iter()
        .flat_map(|(file, violations)| {
            violations.into_iter().map(move |violation| Issue {
                path: violation.filename.unwrap_or_else(|| file.clone()),
                line: violation.line_number,
                column: violation.column_number,
                severity: flake8_severity(&violation.code),
                title: format!("{} Issue: {} {}", tool, violation.code, violation.text),
                description: violation.text,
                suggestion: SUGGESTION.to_string(),
                source: tool.to_string(),
            })
        })
        .collect()
}
