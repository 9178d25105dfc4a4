use crate::error::{AppError, Result};
use log;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".gpt.json";
pub const DEFAULT_OPTIONAL_PATTERN: &str = "./**";

/// Contents of a project's `.gpt.json`. Every field is optional.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct ProjectFile {
    #[serde(default)]
    pub out: Option<PathBuf>,
    #[serde(default, rename = "in")]
    pub input: Option<Vec<String>>,
    #[serde(default)]
    pub optional: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

impl ProjectFile {
    /// Reads `<project_root>/.gpt.json`.
    ///
    /// A missing file yields the empty default; a file that exists but does
    /// not parse is an error.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        let json_content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "No project config found at {}, using defaults.",
                    config_path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::FileRead {
                    path: config_path,
                    source: e,
                });
            }
        };
        log::info!("Loading configuration from: {}", config_path.display());
        Self::parse(&json_content, &config_path)
    }

    fn parse(json_content: &str, config_path: &Path) -> Result<Self> {
        serde_json::from_str::<ProjectFile>(json_content).map_err(|e| AppError::ConfigParse {
            path: config_path.to_path_buf(),
            message: format!("{}. Check JSON syntax and field types.", e),
        })
    }
}

/// Values taken from the command line, before merging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOptions {
    pub out: Option<PathBuf>,
    pub input: Vec<String>,
    /// `None` when `--optional` was not given at all.
    pub optional: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

/// The effective configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub out: Option<PathBuf>,
    pub input_patterns: Vec<String>,
    pub optional_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config::merge(ProjectFile::default(), CliOptions::default())
    }
}

impl Config {
    /// File values come first in every pattern list; `--out` beats the
    /// file's `out`.
    pub fn merge(file: ProjectFile, cli: CliOptions) -> Self {
        log::trace!("Merging project file {:?} with CLI options {:?}", file, cli);

        let input_patterns = concat(file.input, Some(cli.input));
        let exclude_patterns = concat(file.exclude, Some(cli.exclude));
        let optional_patterns = if file.optional.is_none() && cli.optional.is_none() {
            vec![DEFAULT_OPTIONAL_PATTERN.to_string()]
        } else {
            concat(file.optional, cli.optional)
        };

        let config = Config {
            out: cli.out.or(file.out),
            input_patterns,
            optional_patterns,
            exclude_patterns,
        };
        log::debug!("Effective configuration: {:?}", config);
        config
    }

    pub fn load(project_root: &Path, cli: CliOptions) -> Result<Self> {
        let file = ProjectFile::load(project_root)?;
        Ok(Self::merge(file, cli))
    }
}

fn concat(first: Option<Vec<String>>, second: Option<Vec<String>>) -> Vec<String> {
    first
        .into_iter()
        .flatten()
        .chain(second.into_iter().flatten())
        .collect()
}
