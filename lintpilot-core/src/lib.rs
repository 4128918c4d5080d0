//! LintPilot Core - static analysis orchestration for pull requests
//!
//! This crate stages the files of a change set into a scratch workspace,
//! runs the matching external analyzer for each language, and normalizes
//! their reports into a single list of [`Issue`]s.

pub mod analysis;
pub mod config;
pub mod error;
pub mod issue;
pub mod normalize;
pub mod source;
pub mod tools;
pub mod workspace;

pub use analysis::{AnalysisResult, Analyzer, IssueAggregator, ToolOutcome, ToolReport};
pub use config::{CliOverrides, Config};
pub use error::{Error, Result};
pub use issue::{Issue, Severity};
pub use source::{LanguageClass, SourceFile};
pub use workspace::{StagingLayout, Workspace};
