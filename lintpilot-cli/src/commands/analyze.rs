//! Analyze command - run the analyzers over local files

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use lintpilot_core::analysis::ToolOutcome;
use lintpilot_core::{AnalysisResult, Analyzer, Config, SourceFile};
use tokio_util::sync::CancellationToken;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per issue, followed by a summary
    #[default]
    Text,
    /// The full result as JSON
    Json,
}

/// Analyze files with the matching static analyzers
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Files to analyze
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let files = self.read_files().await?;

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling running analyzers");
                ctrl_c.cancel();
            }
        });

        let result = Analyzer::new(config)
            .analyze(&files, &cancel)
            .await
            .context("Analysis failed")?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => print_text(&result),
        }

        Ok(())
    }

    async fn read_files(&self) -> anyhow::Result<Vec<SourceFile>> {
        let mut files = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            files.push(SourceFile::new(path.to_string_lossy(), content));
        }
        Ok(files)
    }
}

fn print_text(result: &AnalysisResult) {
    if let Some(advisory) = &result.advisory {
        println!("{}", advisory);
        return;
    }

    for issue in &result.issues {
        println!("{}", issue);
    }
    if !result.issues.is_empty() {
        println!();
    }

    for report in &result.reports {
        match &report.outcome {
            ToolOutcome::Completed { issues } => {
                println!("  {} ({}): {} issues", report.tool, report.language, issues)
            }
            ToolOutcome::Skipped { reason } => {
                println!("  {} ({}): skipped, {}", report.tool, report.language, reason)
            }
            ToolOutcome::Failed { reason } => {
                println!("  {} ({}): failed, {}", report.tool, report.language, reason)
            }
        }
    }

    for hint in result.missing_language_hints() {
        println!("  hint: {}", hint);
    }

    println!();
    println!("{}", result.summary());
}
