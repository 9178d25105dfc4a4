use crate::error::{AppError, Result};
use crate::file_set::FileSet;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::fs;
use std::io;
use std::path::{Component, Path};

pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Gitignore rules from the project root, compiled once per run.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    gitignore: Gitignore,
}

impl IgnoreFilter {
    /// Reads `<project_root>/.gitignore`. A missing file gives an empty ruleset.
    pub fn load(project_root: &Path) -> Result<Self> {
        let ignore_path = project_root.join(IGNORE_FILE_NAME);
        match fs::read_to_string(&ignore_path) {
            Ok(rules) => {
                log::debug!("Loading ignore rules from {}", ignore_path.display());
                Self::from_rules(project_root, &rules)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No {} found, nothing will be ignored.", IGNORE_FILE_NAME);
                Ok(Self::empty())
            }
            Err(e) => Err(AppError::FileRead {
                path: ignore_path,
                source: e,
            }),
        }
    }

    pub fn from_rules(project_root: &Path, rules: &str) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(project_root);
        for line in rules.lines() {
            builder.add_line(None, line)?;
        }
        let gitignore = builder.build()?;
        log::trace!("Compiled {} ignore rules", gitignore.len());
        Ok(Self { gitignore })
    }

    pub fn empty() -> Self {
        Self {
            gitignore: Gitignore::empty(),
        }
    }

    /// True if the path, or any directory above it, is ignored.
    ///
    /// Directories are checked from the root down and an ignored directory
    /// cannot be re-included from below. Within one level the last matching
    /// rule decides, so a later `!pattern` re-includes.
    pub fn is_ignored(&self, path: &str) -> bool {
        if self.gitignore.is_empty() {
            return false;
        }
        let path = Path::new(path);
        if path.is_absolute() && !path.starts_with(self.gitignore.path()) {
            return false;
        }
        if path.components().any(|c| c == Component::ParentDir) {
            return false;
        }
        let relative = path.strip_prefix(self.gitignore.path()).unwrap_or(path);

        let mut parents: Vec<&Path> = relative
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        parents.reverse();
        if let Some(dir) = parents
            .into_iter()
            .find(|dir| self.gitignore.matched(dir, true).is_ignore())
        {
            log::trace!("Parent directory {} is ignored", dir.display());
            return true;
        }

        self.gitignore.matched(relative, false).is_ignore()
    }

    pub fn filter(&self, mut paths: FileSet) -> FileSet {
        paths.retain(|path| {
            let ignored = self.is_ignored(path);
            if ignored {
                log::trace!("Ignored by {}: {}", IGNORE_FILE_NAME, path);
            }
            !ignored
        });
        paths
    }
}
