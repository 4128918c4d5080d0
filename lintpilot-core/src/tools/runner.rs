//! Analyzer invocation
//!
//! [`ToolRunner`] takes one language's staged files through binary lookup,
//! config synthesis, environment preparation and execution. The actual
//! process launch sits behind the [`ToolBackend`] trait so orchestration can
//! be exercised without real analyzers installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::config::ensure_config;
use super::linter::Linter;
use super::prepare::EnvironmentPreparer;
use super::process::run_with_deadline;
use crate::source::LanguageClass;
use crate::{Error, Result};

/// One analyzer run over one language's staged files
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub linter: Linter,
    pub language: LanguageClass,
    /// Resolved analyzer binary
    pub program: PathBuf,
    pub files: Vec<PathBuf>,
    pub config_path: PathBuf,
    /// Workspace root, used as the working directory
    pub workdir: PathBuf,
    pub timeout: Duration,
}

impl ToolInvocation {
    /// Name of the analyzer
    pub fn tool(&self) -> &'static str {
        self.linter.name()
    }

    /// Build the command for this invocation
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.linter.args(&self.config_path, &self.files))
            .current_dir(&self.workdir);
        cmd
    }
}

/// Captured output of a finished analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToolOutput {
    pub tool: String,
    pub stdout: String,
    pub stderr: String,
    /// Exit code, -1 when the process was killed by a signal
    pub exit_code: i32,
}

impl RawToolOutput {
    /// Standard output followed by standard error
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    /// Whether the analyzer wrote nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty() && self.stderr.trim().is_empty()
    }
}

/// Launches analyzers
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Locate the analyzer binary, `None` if it is not installed
    fn resolve(&self, linter: Linter, configured: Option<&str>) -> Option<PathBuf> {
        linter.resolve(configured)
    }

    /// Run an invocation to completion
    async fn execute(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<RawToolOutput>;
}

/// Runs analyzers as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessBackend;

#[async_trait]
impl ToolBackend for ProcessBackend {
    async fn execute(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancellationToken,
    ) -> Result<RawToolOutput> {
        debug!(
            tool = invocation.tool(),
            program = %invocation.program.display(),
            files = invocation.files.len(),
            "Running analyzer"
        );

        let output = run_with_deadline(
            invocation.command(),
            invocation.tool(),
            invocation.timeout,
            cancel,
        )
        .await?;

        Ok(RawToolOutput {
            tool: invocation.tool().to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Per-run options for one analyzer
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit binary path from configuration
    pub configured_path: Option<String>,
    pub timeout: Duration,
}

/// Drives one analyzer from binary lookup to raw output
#[derive(Clone)]
pub struct ToolRunner {
    backend: Arc<dyn ToolBackend>,
    preparer: Arc<dyn EnvironmentPreparer>,
}

impl ToolRunner {
    pub fn new(backend: Arc<dyn ToolBackend>, preparer: Arc<dyn EnvironmentPreparer>) -> Self {
        Self { backend, preparer }
    }

    /// Run `linter` over `files` staged in `workdir`
    ///
    /// Errors are tool-level: [`Error::ToolUnavailable`] when the binary is
    /// missing, [`Error::ToolExecution`] for everything that stops the
    /// analyzer from producing a usable report.
    pub async fn run(
        &self,
        linter: Linter,
        workdir: &Path,
        files: &[PathBuf],
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<RawToolOutput> {
        let program = self
            .backend
            .resolve(linter, options.configured_path.as_deref())
            .ok_or_else(|| Error::ToolUnavailable {
                tool: linter.name().to_string(),
            })?;

        let config_path = ensure_config(linter, workdir)?;

        let invocation = ToolInvocation {
            linter,
            language: linter.language(),
            program,
            files: files.to_vec(),
            config_path,
            workdir: workdir.to_path_buf(),
            timeout: options.timeout,
        };

        self.preparer.prepare(&invocation, cancel).await?;

        let raw = self.backend.execute(&invocation, cancel).await?;

        if !linter.exit_policy().accepts(raw.exit_code, !raw.is_empty()) {
            let detail = raw.stderr.trim();
            return Err(Error::execution(
                linter.name(),
                if detail.is_empty() {
                    format!("exited with status {}", raw.exit_code)
                } else {
                    format!("exited with status {}: {}", raw.exit_code, detail)
                },
            ));
        }

        Ok(raw)
    }
}
