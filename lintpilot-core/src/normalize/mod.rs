//! Output normalization
//!
//! Turns raw analyzer output into canonical [`Issue`]s. Output is untrusted:
//! anything that cannot be understood costs that analyzer its issues and
//! nothing more.

pub mod checkstyle;
pub mod extract;
pub mod json;

use tracing::{debug, warn};

use crate::issue::Issue;
use crate::tools::{OutputFormat, RawToolOutput};
use crate::{Error, Result};

pub use extract::{extract_json, extract_xml, json_candidates};
pub use json::IGNORED_FILE_MESSAGE;

/// Number of bracket positions tried before giving up on a JSON payload
const MAX_JSON_CANDIDATES: usize = 8;

/// Normalize raw output, reporting why it could not be understood
pub fn try_normalize(raw: &RawToolOutput, format: OutputFormat) -> Result<Vec<Issue>> {
    if raw.is_empty() {
        debug!(tool = %raw.tool, "Analyzer output is empty");
        return Ok(Vec::new());
    }

    // stderr logs may carry stray brackets, so stdout is read on its own first
    if !raw.stdout.trim().is_empty() && !raw.stderr.trim().is_empty() {
        match parse_output(&raw.tool, &raw.stdout, format) {
            Ok(issues) => return Ok(issues),
            Err(e) => debug!(tool = %raw.tool, error = %e, "No report on stdout alone"),
        }
    }

    parse_output(&raw.tool, &raw.combined(), format)
}

fn parse_output(tool: &str, output: &str, format: OutputFormat) -> Result<Vec<Issue>> {
    match format {
        OutputFormat::Json => normalize_json(tool, output),
        OutputFormat::CheckstyleXml => {
            let xml =
                extract_xml(output).ok_or_else(|| Error::parse(tool, "no XML document found"))?;
            checkstyle::parse_report(tool, xml)
        }
    }
}

/// Normalize raw output, degrading to no issues when it cannot be understood
pub fn normalize(raw: &RawToolOutput, format: OutputFormat) -> Vec<Issue> {
    match try_normalize(raw, format) {
        Ok(issues) => issues,
        Err(e) => {
            warn!(tool = %raw.tool, error = %e, "Ignoring analyzer output");
            Vec::new()
        }
    }
}

fn normalize_json(tool: &str, output: &str) -> Result<Vec<Issue>> {
    let mut last_error = None;

    for candidate in json_candidates(output).take(MAX_JSON_CANDIDATES) {
        match serde_json::from_str(&candidate) {
            Ok(payload) => return json::parse_report(tool, payload),
            Err(e) => {
                debug!(tool, error = %e, "JSON candidate rejected");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => Error::parse(tool, format!("invalid JSON: {}", e)),
        None => Error::parse(tool, "no JSON payload found"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    fn raw(tool: &str, stdout: &str) -> RawToolOutput {
        RawToolOutput {
            tool: tool.to_string(),
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 1,
        }
    }

    #[test]
    fn test_ignored_file_sentinel_yields_nothing() {
        let output = r#"{"Issues":[{"FromLinter":"x","Text":"File ignored because no matching configuration was supplied.","Severity":"warning","Pos":{"Filename":"a.go","Line":1,"Column":1}}]}"#;
        let issues = try_normalize(&raw("GolangCILint", output), OutputFormat::Json).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_json_with_log_noise() {
        let output = "level=info msg=\"[runner] linters took 1.2s\"\n\
            {\"Issues\":[{\"FromLinter\":\"govet\",\"Text\":\"unreachable code\",\"Severity\":\"Warning\",\
            \"Pos\":{\"Filename\":\"main.go\",\"Line\":8,\"Column\":2}}],}\n";
        let issues = try_normalize(&raw("GolangCILint", output), OutputFormat::Json).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].title, "GolangCILint Issue: unreachable code");
    }

    #[test]
    fn test_json_after_bracketed_prefix() {
        let output = "[WARN] deprecated option\n{\"Issues\":[{\"Text\":\"t\",\"Severity\":\"error\",\"Pos\":{\"Filename\":\"x.go\",\"Line\":1,\"Column\":1}}]}";
        let issues = try_normalize(&raw("GolangCILint", output), OutputFormat::Json).unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_json_in_stderr() {
        let mut output = raw("Flake8", "");
        output.stderr = "{\"a.py\": [{\"code\": \"W291\", \"line_number\": 2, \"column_number\": 5, \"text\": \"trailing whitespace\"}]}".to_string();
        let issues = try_normalize(&output, OutputFormat::Json).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "a.py");
    }

    #[test]
    fn test_brackets_in_stderr_do_not_hide_stdout_report() {
        let mut output = raw(
            "GolangCILint",
            r#"{"Issues":[{"Text":"unchecked error","Severity":"error","Pos":{"Filename":"main.go","Line":5,"Column":3}}]}"#,
        );
        output.stderr = "level=error msg=\"[linters_context] typechecking error: \
            util.go:9:1: expected '}', found 'EOF'\"\n"
            .to_string();

        let issues = try_normalize(&output, OutputFormat::Json).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "main.go");
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_stderr_is_used_when_stdout_has_no_report() {
        let mut output = raw("Flake8", "flake8: 1 file checked");
        output.stderr = r#"{"a.py": []}"#.to_string();
        assert!(try_normalize(&output, OutputFormat::Json).unwrap().is_empty());

        let mut output = raw("Checkstyle", "Starting audit...");
        output.stderr = "<checkstyle><file name=\"A.java\"/></checkstyle>".to_string();
        assert!(try_normalize(&output, OutputFormat::CheckstyleXml).unwrap().is_empty());
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = try_normalize(&raw("ESLint", "Oops! Something went wrong"), OutputFormat::Json)
            .unwrap_err();
        assert!(matches!(err, Error::OutputParse { .. }));
        assert!(normalize(&raw("ESLint", "Oops!"), OutputFormat::Json).is_empty());
    }

    #[test]
    fn test_malformed_json_degrades() {
        let output = raw("GolangCILint", "{\"Issues\": [ {\"Text\": }");
        let issues = normalize(&output, OutputFormat::Json);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_output_is_not_an_error() {
        let issues = try_normalize(&raw("Flake8", "  \n"), OutputFormat::Json).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_checkstyle_with_surrounding_noise() {
        let output = "Starting audit...\n<?xml version=\"1.0\"?>\n<checkstyle>\n\
            <file name=\"Foo.java\"><error line=\"10\" column=\"2\" severity=\"error\" message=\"bad\" source=\"com.pkg.RuleX\"/></file>\n\
            </checkstyle>\nAudit done.\n";
        let issues =
            try_normalize(&raw("Checkstyle", output), OutputFormat::CheckstyleXml).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Checkstyle Issue: RuleX");
    }

    #[test]
    fn test_checkstyle_malformed_degrades() {
        let issues = normalize(
            &raw("Checkstyle", "<checkstyle><file"),
            OutputFormat::CheckstyleXml,
        );
        assert!(issues.is_empty());
        let err = try_normalize(&raw("Checkstyle", "plain text"), OutputFormat::CheckstyleXml)
            .unwrap_err();
        assert!(matches!(err, Error::OutputParse { .. }));
    }
}
