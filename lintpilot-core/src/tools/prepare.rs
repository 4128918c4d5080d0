//! Environment preparation before an analyzer runs
//!
//! ESLint needs its `@eslint/js` plugin installed next to the staged files.
//! Installing it touches the network, so the step is a capability injected
//! into the runner and replaced by [`NoopPreparer`] in tests or offline runs.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::linter::Linter;
use super::process::run_with_deadline;
use super::runner::ToolInvocation;
use crate::{Error, Result};

/// Prepares the workspace for an analyzer
#[async_trait]
pub trait EnvironmentPreparer: Send + Sync {
    /// Make the environment ready for `invocation`
    ///
    /// An error costs this analyzer its run and nothing else.
    async fn prepare(&self, invocation: &ToolInvocation, cancel: &CancellationToken) -> Result<()>;
}

/// Leaves the environment untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreparer;

#[async_trait]
impl EnvironmentPreparer for NoopPreparer {
    async fn prepare(
        &self,
        _invocation: &ToolInvocation,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}

/// Installs the ESLint plugin with npm when a dependency probe fails
#[derive(Debug, Clone)]
pub struct NpmPluginInstaller {
    npm_path: String,
    plugin: String,
}

impl NpmPluginInstaller {
    /// Create an installer for `@eslint/js` using `npm` from the search path
    pub fn new() -> Self {
        Self {
            npm_path: "npm".to_string(),
            plugin: "@eslint/js".to_string(),
        }
    }

    /// Use a custom npm executable
    pub fn with_npm_path(mut self, path: impl Into<String>) -> Self {
        self.npm_path = path.into();
        self
    }

    /// Install a different plugin
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    fn npm(&self, invocation: &ToolInvocation, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.npm_path);
        cmd.args(args).current_dir(&invocation.workdir);
        cmd
    }

    async fn is_installed(
        &self,
        invocation: &ToolInvocation,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let probe = self.npm(invocation, &["list", self.plugin.as_str()]);
        match run_with_deadline(probe, invocation.tool(), timeout, cancel).await {
            Ok(output) => Ok(output.status.success()),
            Err(_) if cancel.is_cancelled() => {
                Err(Error::execution(invocation.tool(), "cancelled"))
            }
            // a probe that cannot run counts as "not installed"; the install reports the real error
            Err(_) => Ok(false),
        }
    }
}

impl Default for NpmPluginInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnvironmentPreparer for NpmPluginInstaller {
    async fn prepare(&self, invocation: &ToolInvocation, cancel: &CancellationToken) -> Result<()> {
        if invocation.linter != Linter::EsLint {
            return Ok(());
        }

        if self.is_installed(invocation, invocation.timeout, cancel).await? {
            debug!(plugin = %self.plugin, "ESLint plugin already installed");
            return Ok(());
        }

        info!(plugin = %self.plugin, "Installing ESLint plugin");
        let install = self.npm(invocation, &["install", "--save-dev", self.plugin.as_str()]);
        let output =
            run_with_deadline(install, invocation.tool(), invocation.timeout, cancel).await?;

        if !output.status.success() {
            return Err(Error::execution(
                invocation.tool(),
                format!(
                    "failed to install {}: {}",
                    self.plugin,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LanguageClass;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn invocation(linter: Linter, workdir: PathBuf) -> ToolInvocation {
        ToolInvocation {
            linter,
            language: linter.language(),
            program: PathBuf::from("npx"),
            files: vec![],
            config_path: workdir.join("eslint.config.js"),
            workdir,
            timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_noop_preparer() {
        let dir = TempDir::new().unwrap();
        let inv = invocation(Linter::EsLint, dir.path().to_path_buf());
        assert!(NoopPreparer.prepare(&inv, &CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_installer_ignores_other_linters() {
        let dir = TempDir::new().unwrap();
        let installer = NpmPluginInstaller::new().with_npm_path("/nonexistent/npm-12345");
        let inv = invocation(Linter::GolangCiLint, dir.path().to_path_buf());
        assert_eq!(inv.language, LanguageClass::Go);
        assert!(installer.prepare(&inv, &CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_installer_without_npm_fails_eslint_only() {
        let dir = TempDir::new().unwrap();
        let installer = NpmPluginInstaller::new().with_npm_path("/nonexistent/npm-12345");
        let inv = invocation(Linter::EsLint, dir.path().to_path_buf());
        let err = installer
            .prepare(&inv, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolExecution { ref tool, .. } if tool == "ESLint"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installer_skips_install_when_probe_succeeds() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let npm = dir.path().join("npm");
        let log = dir.path().join("npm.log");
        std::fs::write(
            &npm,
            format!("#!/bin/sh\necho \"$1\" >> {}\nexit 0\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&npm, std::fs::Permissions::from_mode(0o755)).unwrap();

        let installer = NpmPluginInstaller::new().with_npm_path(npm.to_string_lossy());
        let inv = invocation(Linter::EsLint, dir.path().to_path_buf());
        installer.prepare(&inv, &CancellationToken::new()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "list\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installer_installs_when_probe_fails() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let npm = dir.path().join("npm");
        let log = dir.path().join("npm.log");
        std::fs::write(
            &npm,
            format!(
                "#!/bin/sh\necho \"$1\" >> {}\n[ \"$1\" = install ]\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&npm, std::fs::Permissions::from_mode(0o755)).unwrap();

        let installer = NpmPluginInstaller::new().with_npm_path(npm.to_string_lossy());
        let inv = invocation(Linter::EsLint, dir.path().to_path_buf());
        installer.prepare(&inv, &CancellationToken::new()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "list\ninstall\n");
    }
}
