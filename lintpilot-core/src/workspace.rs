//! Scratch workspace holding staged copies of the files under analysis
//!
//! A [`Workspace`] is created fresh for every analysis run and removed when it
//! is dropped, so teardown happens on every exit path including early errors.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::source::{LanguageClass, SourceFile};
use crate::{Error, Result};

const WORKSPACE_PREFIX: &str = "lintpilot-review-";
const PATH_HASH_LEN: usize = 12;

/// How staged files are named inside the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagingLayout {
    /// `<workspace>/<base name>`; files sharing a base name overwrite each other
    #[default]
    BaseName,
    /// `<workspace>/<hash of original path>/<base name>`
    PathHash,
}

/// An ephemeral directory with staged source files
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    staged: BTreeMap<LanguageClass, Vec<PathBuf>>,
}

impl Workspace {
    /// Stage files into a new directory under the system temp dir
    pub fn stage(files: &[SourceFile], layout: StagingLayout) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|e| Error::staging(std::env::temp_dir(), e))?;
        Self::populate(dir, files, layout)
    }

    /// Stage files into a new directory under `parent`
    pub fn stage_in(parent: &Path, files: &[SourceFile], layout: StagingLayout) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| Error::staging(parent, e))?;
        Self::populate(dir, files, layout)
    }

    fn populate(dir: TempDir, files: &[SourceFile], layout: StagingLayout) -> Result<Self> {
        let mut staged: BTreeMap<LanguageClass, Vec<PathBuf>> = BTreeMap::new();
        let mut origins: HashMap<PathBuf, &str> = HashMap::new();

        for file in files {
            let language = file.language();
            if !language.is_known() {
                debug!(path = %file.path, "Skipping file with unrecognized extension");
                continue;
            }

            let target = match layout {
                StagingLayout::BaseName => dir.path().join(file.base_name()),
                StagingLayout::PathHash => {
                    let bucket = dir.path().join(path_hash(&file.path));
                    std::fs::create_dir_all(&bucket).map_err(|e| Error::staging(&bucket, e))?;
                    bucket.join(file.base_name())
                }
            };

            std::fs::write(&target, &file.content).map_err(|e| Error::staging(&target, e))?;

            match origins.insert(target.clone(), &file.path) {
                Some(previous) if previous != file.path => {
                    warn!(
                        staged = %target.display(),
                        previous = %previous,
                        current = %file.path,
                        "Staged file name collision, keeping the last file"
                    );
                }
                Some(_) => {}
                None => staged.entry(language).or_default().push(target),
            }
        }

        debug!(
            workspace = %dir.path().display(),
            files = origins.len(),
            "Workspace staged"
        );

        Ok(Self { dir, staged })
    }

    /// Root directory of the workspace
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Staged files for a language
    pub fn files(&self, language: LanguageClass) -> &[PathBuf] {
        self.staged.get(&language).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Languages with at least one staged file, in invocation order
    pub fn languages(&self) -> Vec<LanguageClass> {
        LanguageClass::ANALYZED
            .into_iter()
            .filter(|language| !self.files(*language).is_empty())
            .collect()
    }

    /// Analyzable languages with no staged file, in invocation order
    pub fn missing_languages(&self) -> Vec<LanguageClass> {
        LanguageClass::ANALYZED
            .into_iter()
            .filter(|language| self.files(*language).is_empty())
            .collect()
    }

    /// Number of distinct staged files
    pub fn staged_count(&self) -> usize {
        self.staged.values().map(Vec::len).sum()
    }

    /// Whether nothing was staged
    pub fn is_empty(&self) -> bool {
        self.staged_count() == 0
    }

    /// Remove the workspace, reporting failures instead of ignoring them
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| Error::staging(path, e))
    }
}

fn path_hash(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
        .chars()
        .take(PATH_HASH_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_skips_unknown_files() {
        let files = vec![
            SourceFile::new("cmd/main.go", "package main"),
            SourceFile::new("notes.unknownext", "ignore me"),
        ];
        let workspace = Workspace::stage(&files, StagingLayout::BaseName).unwrap();

        assert_eq!(workspace.staged_count(), 1);
        assert_eq!(workspace.languages(), vec![LanguageClass::Go]);
        assert!(workspace.path().join("main.go").exists());
        assert!(!workspace.path().join("notes.unknownext").exists());
    }

    #[test]
    fn test_stage_writes_content_and_groups_by_language() {
        let files = vec![
            SourceFile::new("web/app.ts", "export const a = 1;"),
            SourceFile::new("svc/util.py", "import os\n"),
            SourceFile::new("svc/other.py", "x = 1\n"),
            SourceFile::new("src/Foo.java", "class Foo {}"),
        ];
        let workspace = Workspace::stage(&files, StagingLayout::BaseName).unwrap();

        assert_eq!(workspace.files(LanguageClass::Python).len(), 2);
        assert_eq!(workspace.files(LanguageClass::Go).len(), 0);
        assert_eq!(
            workspace.languages(),
            vec![LanguageClass::TypeScript, LanguageClass::Python, LanguageClass::Java]
        );
        assert_eq!(workspace.missing_languages(), vec![LanguageClass::Go]);

        let staged = std::fs::read_to_string(workspace.path().join("app.ts")).unwrap();
        assert_eq!(staged, "export const a = 1;");
    }

    #[test]
    fn test_base_name_collision_last_write_wins() {
        let files = vec![
            SourceFile::new("a/handler.go", "package a"),
            SourceFile::new("b/handler.go", "package b"),
        ];
        let workspace = Workspace::stage(&files, StagingLayout::BaseName).unwrap();

        assert_eq!(workspace.files(LanguageClass::Go).len(), 1);
        let staged = std::fs::read_to_string(workspace.path().join("handler.go")).unwrap();
        assert_eq!(staged, "package b");
    }

    #[test]
    fn test_path_hash_layout_keeps_both_files() {
        let files = vec![
            SourceFile::new("a/handler.go", "package a"),
            SourceFile::new("b/handler.go", "package b"),
        ];
        let workspace = Workspace::stage(&files, StagingLayout::PathHash).unwrap();

        let staged = workspace.files(LanguageClass::Go);
        assert_eq!(staged.len(), 2);
        assert_ne!(staged[0], staged[1]);
        assert_eq!(std::fs::read_to_string(&staged[0]).unwrap(), "package a");
        assert_eq!(std::fs::read_to_string(&staged[1]).unwrap(), "package b");
    }

    #[test]
    fn test_path_hash_is_stable() {
        assert_eq!(path_hash("a/handler.go"), path_hash("a/handler.go"));
        assert_ne!(path_hash("a/handler.go"), path_hash("b/handler.go"));
        assert_eq!(path_hash("x").len(), PATH_HASH_LEN);
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let files = vec![SourceFile::new("main.go", "package main")];
        let workspace = Workspace::stage(&files, StagingLayout::BaseName).unwrap();
        let root = workspace.path().to_path_buf();
        assert!(root.exists());

        drop(workspace);
        assert!(!root.exists());
    }

    #[test]
    fn test_workspace_close() {
        let workspace = Workspace::stage(&[], StagingLayout::BaseName).unwrap();
        let root = workspace.path().to_path_buf();
        assert!(workspace.is_empty());

        workspace.close().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_stage_in_missing_parent_is_staging_error() {
        let parent = TempDir::new().unwrap();
        let missing = parent.path().join("does-not-exist");
        let result = Workspace::stage_in(&missing, &[], StagingLayout::BaseName);
        assert!(matches!(result, Err(Error::Staging { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_write_removes_workspace() {
        let parent = TempDir::new().unwrap();
        let files = vec![
            SourceFile::new("ok.go", "package ok"),
            // NUL is never valid in a file name
            SourceFile::new("x/\0bad.go", "package bad"),
        ];

        let result = Workspace::stage_in(parent.path(), &files, StagingLayout::BaseName);
        assert!(matches!(result, Err(Error::Staging { .. })));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
