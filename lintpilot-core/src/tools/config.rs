//! Minimal analyzer configuration written into the workspace
//!
//! Every artifact is written only when absent; a configuration already present
//! in the workspace is never overwritten.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::linter::Linter;
use crate::{Error, Result};

const GOLANGCI_CONFIG: &str = r#"version: "2"
linters:
  enable:
    - govet
    - staticcheck
    - errcheck
    - ineffassign
    - unused
    - misspell
    - gocritic
"#;

const ESLINT_CONFIG: &str = r#"export default [
  {
    ignores: [],
    files: ["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"],
    languageOptions: {
      parserOptions: {
        ecmaVersion: "latest",
        sourceType: "module",
      },
    },
    rules: {
      "no-unused-vars": "warn",
      "no-console": "warn",
    },
  },
];
"#;

const ESLINT_PACKAGE: &str = "{\"type\": \"module\"}\n";

const FLAKE8_CONFIG: &str = "[flake8]
max-line-length = 120
extend-ignore = E203, W503
";

const CHECKSTYLE_CONFIG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE module PUBLIC
    "-//Checkstyle//DTD Checkstyle Configuration 1.3//EN"
    "https://checkstyle.org/dtds/configuration_1_3.dtd">
<module name="Checker">
  <module name="TreeWalker">
    <module name="AvoidStarImport"/>
    <module name="ConstantName"/>
    <module name="UnusedImports"/>
  </module>
</module>
"#;

/// A file the analyzer needs in its working directory
#[derive(Debug, Clone, Copy)]
pub struct ConfigArtifact {
    pub file_name: &'static str,
    pub contents: &'static str,
}

impl Linter {
    /// Default artifacts, the analyzer's own config file first
    pub fn config_artifacts(&self) -> &'static [ConfigArtifact] {
        match self {
            Self::GolangCiLint => &[ConfigArtifact {
                file_name: ".golangci.yml",
                contents: GOLANGCI_CONFIG,
            }],
            Self::EsLint => &[
                ConfigArtifact {
                    file_name: "eslint.config.js",
                    contents: ESLINT_CONFIG,
                },
                ConfigArtifact {
                    file_name: "package.json",
                    contents: ESLINT_PACKAGE,
                },
            ],
            Self::Flake8 => &[ConfigArtifact {
                file_name: ".flake8",
                contents: FLAKE8_CONFIG,
            }],
            Self::Checkstyle => &[ConfigArtifact {
                file_name: "checkstyle.xml",
                contents: CHECKSTYLE_CONFIG,
            }],
        }
    }
}

/// Make sure the analyzer's configuration exists in `dir`
///
/// Returns the path of the analyzer's config file. A failure to write is a
/// tool-level error: it costs this analyzer its run, nothing else.
pub fn ensure_config(linter: Linter, dir: &Path) -> Result<PathBuf> {
    let artifacts = linter.config_artifacts();
    for artifact in artifacts {
        write_if_absent(&dir.join(artifact.file_name), artifact.contents).map_err(|e| {
            Error::execution(
                linter.name(),
                format!("failed to write {}: {}", artifact.file_name, e),
            )
        })?;
    }
    Ok(dir.join(artifacts[0].file_name))
}

fn write_if_absent(path: &Path, contents: &str) -> std::io::Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(contents.as_bytes())?;
            debug!(path = %path.display(), "Wrote default analyzer config");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Keeping existing analyzer config");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_writes_defaults_for_each_linter() {
        let dir = TempDir::new().unwrap();
        for linter in [
            Linter::GolangCiLint,
            Linter::EsLint,
            Linter::Flake8,
            Linter::Checkstyle,
        ] {
            let path = ensure_config(linter, dir.path()).unwrap();
            assert!(path.exists(), "{} config missing", linter);
        }

        let flake8 = fs::read_to_string(dir.path().join(".flake8")).unwrap();
        assert!(flake8.contains("max-line-length = 120"));
        let package = fs::read_to_string(dir.path().join("package.json")).unwrap();
        assert!(package.contains("\"module\""));
        let checkstyle = fs::read_to_string(dir.path().join("checkstyle.xml")).unwrap();
        assert!(checkstyle.contains("AvoidStarImport"));
        assert!(checkstyle.contains("UnusedImports"));
    }

    #[test]
    fn test_eslint_config_path_is_primary_artifact() {
        let dir = TempDir::new().unwrap();
        let path = ensure_config(Linter::EsLint, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("eslint.config.js"));
        assert!(dir.path().join("package.json").exists());
    }

    #[test]
    fn test_never_overwrites_existing_config() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join(".golangci.yml");
        fs::write(&existing, "linters:\n  enable: [govet]\n").unwrap();

        let path = ensure_config(Linter::GolangCiLint, dir.path()).unwrap();
        assert_eq!(path, existing);
        assert_eq!(
            fs::read_to_string(&existing).unwrap(),
            "linters:\n  enable: [govet]\n"
        );
    }

    #[test]
    fn test_keeps_existing_package_json_but_adds_eslint_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{\"name\": \"app\"}").unwrap();

        ensure_config(Linter::EsLint, dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{\"name\": \"app\"}"
        );
        assert!(dir.path().join("eslint.config.js").exists());
    }

    #[test]
    fn test_unwritable_dir_is_tool_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let err = ensure_config(Linter::Flake8, &missing).unwrap_err();
        assert!(matches!(err, Error::ToolExecution { .. }));
        assert!(!err.is_fatal());
    }
}
