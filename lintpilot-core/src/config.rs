//! Configuration management for LintPilot
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (LINTPILOT_*)
//! 3. Config file (~/.config/lintpilot/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::LanguageClass;
use crate::workspace::StagingLayout;
use crate::{Error, Result};

/// Run-wide analysis settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Deadline for a single tool invocation
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Run tool invocations concurrently instead of one after another
    pub concurrent: bool,

    /// How staged files are named inside the workspace
    pub staging_layout: StagingLayout,

    /// Allow installing missing analyzer plugins (npm) before running
    pub install_dependencies: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            concurrent: false,
            staging_layout: StagingLayout::default(),
            install_dependencies: true,
        }
    }
}

/// Per-language analyzer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Whether the analyzer for this language runs at all
    pub enabled: bool,

    /// Explicit path to the analyzer binary
    pub path: Option<String>,

    /// Overrides `analysis.timeout` for this analyzer
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            timeout: None,
        }
    }
}

/// Analyzer settings keyed by language
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub go: ToolConfig,
    pub typescript: ToolConfig,
    pub python: ToolConfig,
    pub java: ToolConfig,
}

impl ToolsConfig {
    /// Settings for a language, `None` for `Unknown`
    pub fn get(&self, language: LanguageClass) -> Option<&ToolConfig> {
        match language {
            LanguageClass::Go => Some(&self.go),
            LanguageClass::TypeScript => Some(&self.typescript),
            LanguageClass::Python => Some(&self.python),
            LanguageClass::Java => Some(&self.java),
            LanguageClass::Unknown => None,
        }
    }

    fn get_mut(&mut self, language: LanguageClass) -> Option<&mut ToolConfig> {
        match language {
            LanguageClass::Go => Some(&mut self.go),
            LanguageClass::TypeScript => Some(&mut self.typescript),
            LanguageClass::Python => Some(&mut self.python),
            LanguageClass::Java => Some(&mut self.java),
            LanguageClass::Unknown => None,
        }
    }
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub timeout: Option<Duration>,
    pub concurrent: bool,
    pub skip_install: bool,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Analysis settings
    pub analysis: AnalysisConfig,

    /// Analyzer settings
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/lintpilot/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lintpilot").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - LINTPILOT_TIMEOUT: per-tool deadline, e.g. `90s` or `2m`
    /// - LINTPILOT_CONCURRENT: run analyzers concurrently (`1` or `true`)
    /// - LINTPILOT_SKIP_INSTALL: never install analyzer plugins
    /// - LINTPILOT_GO_PATH, LINTPILOT_TYPESCRIPT_PATH, LINTPILOT_PYTHON_PATH,
    ///   LINTPILOT_JAVA_PATH: analyzer binaries
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(timeout) = var("LINTPILOT_TIMEOUT") {
            self.analysis.timeout = humantime_serde::re::humantime::parse_duration(&timeout)
                .map_err(|e| {
                    Error::Config(format!("Invalid LINTPILOT_TIMEOUT '{}': {}", timeout, e))
                })?;
        }

        if let Some(concurrent) = var("LINTPILOT_CONCURRENT") {
            self.analysis.concurrent = is_truthy(&concurrent);
        }

        if var("LINTPILOT_SKIP_INSTALL").is_some_and(|v| is_truthy(&v)) {
            self.analysis.install_dependencies = false;
        }

        for language in LanguageClass::ANALYZED {
            let key = format!("LINTPILOT_{}_PATH", language.name().to_uppercase());
            if let (Some(path), Some(tool)) = (var(&key), self.tools.get_mut(language)) {
                tool.path = Some(path);
            }
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: &CliOverrides) -> Self {
        if let Some(timeout) = overrides.timeout {
            self.analysis.timeout = timeout;
        }

        if overrides.concurrent {
            self.analysis.concurrent = true;
        }

        if overrides.skip_install {
            self.analysis.install_dependencies = false;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: &CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(overrides))
    }

    /// Effective deadline for the analyzer of a language
    pub fn timeout_for(&self, language: LanguageClass) -> Duration {
        self.tools
            .get(language)
            .and_then(|tool| tool.timeout)
            .unwrap_or(self.analysis.timeout)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
