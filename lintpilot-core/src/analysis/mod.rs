//! Analysis orchestration
//!
//! [`Analyzer::analyze`] stages the change set, runs one analyzer per
//! language that has files, normalizes each report and aggregates the
//! issues. Analyzer failures are isolated: they are logged and recorded in
//! the result, and never abort the run.

mod result;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::issue::Issue;
use crate::normalize;
use crate::source::{LanguageClass, SourceFile};
use crate::tools::{
    EnvironmentPreparer, Linter, NoopPreparer, NpmPluginInstaller, ProcessBackend, RunOptions,
    ToolBackend, ToolRunner,
};
use crate::workspace::Workspace;
use crate::{Error, Result};

pub use result::{AnalysisResult, IssueAggregator, ToolOutcome, ToolReport};

/// One planned analyzer run
struct Job {
    language: LanguageClass,
    linter: Linter,
    enabled: bool,
    files: Vec<PathBuf>,
    options: RunOptions,
}

/// Runs the analyzers for a change set
#[derive(Clone)]
pub struct Analyzer {
    config: Config,
    backend: Arc<dyn ToolBackend>,
    preparer: Arc<dyn EnvironmentPreparer>,
    /// Parent of the per-run workspace, the system temp dir when `None`
    staging_dir: Option<PathBuf>,
}

impl Analyzer {
    /// Create an analyzer that launches real processes
    pub fn new(config: Config) -> Self {
        let preparer: Arc<dyn EnvironmentPreparer> = if config.analysis.install_dependencies {
            Arc::new(NpmPluginInstaller::new())
        } else {
            Arc::new(NoopPreparer)
        };

        Self {
            config,
            backend: Arc::new(ProcessBackend),
            preparer,
            staging_dir: None,
        }
    }

    /// Replace the process backend
    pub fn with_backend(mut self, backend: Arc<dyn ToolBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the environment preparer
    pub fn with_preparer(mut self, preparer: Arc<dyn EnvironmentPreparer>) -> Self {
        self.preparer = preparer;
        self
    }

    /// Create each run's workspace under `dir`
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a change set
    ///
    /// Only a staging failure is returned as an error. Every analyzer
    /// problem (missing binary, timeout, unreadable output) is recorded in
    /// [`AnalysisResult::reports`] and the remaining analyzers still run.
    pub async fn analyze(
        &self,
        files: &[SourceFile],
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let layout = self.config.analysis.staging_layout;
        let workspace = match &self.staging_dir {
            Some(dir) => Workspace::stage_in(dir, files, layout)?,
            None => Workspace::stage(files, layout)?,
        };

        if workspace.is_empty() {
            info!(files = files.len(), "No analyzable files in change set");
            close_workspace(workspace);
            return Ok(AnalysisResult::nothing_to_analyze());
        }

        let missing = workspace.missing_languages();
        for language in &missing {
            info!(language = %language, "No files for language in change set");
        }

        let jobs: Vec<Job> = workspace
            .languages()
            .into_iter()
            .filter_map(|language| {
                let linter = Linter::for_language(language)?;
                let tool = self.config.tools.get(language).cloned().unwrap_or_default();
                Some(Job {
                    language,
                    linter,
                    enabled: tool.enabled,
                    files: workspace.files(language).to_vec(),
                    options: RunOptions {
                        configured_path: tool.path,
                        timeout: self.config.timeout_for(language),
                    },
                })
            })
            .collect();
        let runnable: Vec<&Job> = jobs.iter().filter(|job| job.enabled).collect();

        let runner = ToolRunner::new(self.backend.clone(), self.preparer.clone());
        let outcomes = if self.config.analysis.concurrent {
            run_concurrent(&runner, workspace.path(), &runnable, cancel).await
        } else {
            run_sequential(&runner, workspace.path(), &runnable, cancel).await
        };

        let mut aggregator = IssueAggregator::new();
        let mut outcomes = outcomes.into_iter();
        for job in &jobs {
            if !job.enabled {
                debug!(tool = job.linter.name(), "Analyzer disabled");
                aggregator.skipped(job.language, job.linter.name(), "disabled in configuration");
                continue;
            }
            let Some(outcome) = outcomes.next() else {
                break;
            };
            if let Err(ref e) = outcome {
                warn!(
                    tool = job.linter.name(),
                    language = %job.language,
                    error = %e,
                    "Analyzer contributed no issues"
                );
            }
            aggregator.record(job.language, job.linter.name(), outcome);
        }

        close_workspace(workspace);

        let result = aggregator.finish(missing);
        info!(
            issues = result.issue_count(),
            analyzers = result.reports.len(),
            "Analysis complete"
        );
        Ok(result)
    }
}

async fn run_job(
    runner: ToolRunner,
    workdir: PathBuf,
    linter: Linter,
    files: Vec<PathBuf>,
    options: RunOptions,
    cancel: CancellationToken,
) -> Result<Vec<Issue>> {
    if cancel.is_cancelled() {
        return Err(Error::execution(linter.name(), "cancelled"));
    }

    let raw = runner.run(linter, &workdir, &files, &options, &cancel).await?;
    let issues = normalize::try_normalize(&raw, linter.format())?;
    debug!(tool = linter.name(), issues = issues.len(), "Analyzer report normalized");
    Ok(issues)
}

async fn run_sequential(
    runner: &ToolRunner,
    workdir: &Path,
    jobs: &[&Job],
    cancel: &CancellationToken,
) -> Vec<Result<Vec<Issue>>> {
    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in jobs {
        outcomes.push(
            run_job(
                runner.clone(),
                workdir.to_path_buf(),
                job.linter,
                job.files.clone(),
                job.options.clone(),
                cancel.clone(),
            )
            .await,
        );
    }
    outcomes
}

/// Run all jobs at once, returning outcomes in job order
async fn run_concurrent(
    runner: &ToolRunner,
    workdir: &Path,
    jobs: &[&Job],
    cancel: &CancellationToken,
) -> Vec<Result<Vec<Issue>>> {
    let handles: Vec<_> = jobs
        .iter()
        .map(|job| {
            tokio::spawn(run_job(
                runner.clone(),
                workdir.to_path_buf(),
                job.linter,
                job.files.clone(),
                job.options.clone(),
                cancel.clone(),
            ))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    // handles are awaited in spawn order, so a panic is attributed by index
    for (job, handle) in jobs.iter().zip(handles) {
        outcomes.push(match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(tool = job.linter.name(), error = %e, "Analyzer task panicked");
                Err(Error::execution(
                    job.linter.name(),
                    format!("analyzer task panicked: {}", e),
                ))
            }
        });
    }
    outcomes
}

fn close_workspace(workspace: Workspace) {
    if let Err(e) = workspace.close() {
        warn!(error = %e, "Failed to remove workspace");
    }
}
