pub mod config;
pub mod error;
pub mod file_set;
pub mod gather;
pub mod ignore_filter;
pub mod prompt;

pub use config::{CONFIG_FILE_NAME, CliOptions, Config, DEFAULT_OPTIONAL_PATTERN, ProjectFile};
pub use error::{AppError, Result};
pub use file_set::FileSet;
pub use gather::{expand_pattern, expand_patterns, resolve_against_root, resolve_files};
pub use ignore_filter::{IGNORE_FILE_NAME, IgnoreFilter};
pub use prompt::{PromptDocument, assemble_prompt, mentions_file, render_block};
