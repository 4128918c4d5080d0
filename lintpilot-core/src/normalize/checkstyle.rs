//! Checkstyle XML reports

use crate::issue::{Issue, Severity};
use crate::{Error, Result};

const SUGGESTION: &str = "Fix according to Checkstyle rule.";

/// Parse a `<checkstyle>` document into issues attributed to `tool`
///
/// Every `<error>` inside a `<file name>` element becomes one issue.
pub fn parse_report(tool: &str, xml: &str) -> Result<Vec<Issue>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::parse(tool, format!("invalid XML: {}", e)))?;

    let mut issues = Vec::new();
    for file in doc.descendants().filter(|n| n.has_tag_name("file")) {
        let path = file.attribute("name").unwrap_or_default();

        for error in file.children().filter(|n| n.has_tag_name("error")) {
            let source = error.attribute("source").unwrap_or_default();
            issues.push(Issue {
                path: path.to_string(),
                line: numeric_attribute(&error, "line"),
                column: numeric_attribute(&error, "column"),
                severity: Severity::parse_lenient(error.attribute("severity").unwrap_or_default()),
                title: format!("{} Issue: {}", tool, rule_name(source)),
                description: error.attribute("message").unwrap_or_default().to_string(),
                suggestion: SUGGESTION.to_string(),
                source: tool.to_string(),
            });
        }
    }

    Ok(issues)
}

fn numeric_attribute(node: &roxmltree::Node<'_, '_>, name: &str) -> u32 {
    node.attribute(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Last segment of a fully qualified check name
fn rule_name(source: &str) -> &str {
    source.rsplit(['.', '/']).next().unwrap_or(source)
}
