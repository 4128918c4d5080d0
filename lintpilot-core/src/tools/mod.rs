//! External analyzers: lookup, configuration, preparation and execution

pub mod config;
mod linter;
mod prepare;
mod process;
mod runner;

pub use config::{ensure_config, ConfigArtifact};
pub use linter::{ExitCodePolicy, Linter, OutputFormat};
pub use prepare::{EnvironmentPreparer, NoopPreparer, NpmPluginInstaller};
pub use runner::{
    ProcessBackend, RawToolOutput, RunOptions, ToolBackend, ToolInvocation, ToolRunner,
};
