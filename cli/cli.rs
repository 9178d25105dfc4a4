mod cli_args;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use log;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::Cli;
use gptt_core::{AppError, CONFIG_FILE_NAME, Config, IGNORE_FILE_NAME, IgnoreFilter};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(&cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::ConfigParse { .. }) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(AppError::Ignore(_)) => 2,
                Some(AppError::Glob(_)) => 2,
                Some(_) => 1,
                None => 1,
            };
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: &Cli) -> Result<()> {
    let project_root = determine_project_root(cli.project_root.as_deref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = Config::load(&project_root, cli.cli_options())
        .with_context(|| format!("Failed to load {}", CONFIG_FILE_NAME))?;
    let ignore = IgnoreFilter::load(&project_root)
        .with_context(|| format!("Failed to load {}", IGNORE_FILE_NAME))?;

    let input_files = gptt_core::resolve_files(
        &project_root,
        &config.input_patterns,
        &config.exclude_patterns,
        &ignore,
    )
    .context("Failed to resolve input files")?;
    let optional_files = gptt_core::resolve_files(
        &project_root,
        &config.optional_patterns,
        &config.exclude_patterns,
        &ignore,
    )
    .context("Failed to resolve optional files")?;
    log::info!(
        "Resolved {} input and {} optional files",
        input_files.len(),
        optional_files.len()
    );

    let user_prompt = cli.user_prompt();
    let document =
        gptt_core::assemble_prompt(&project_root, &user_prompt, &input_files, &optional_files)
            .context("Failed to assemble prompt")?;

    output::print_prompt_or_save(&document, &config, &project_root, &user_prompt, cli.quiet)
}

fn determine_project_root(cli_project_root: Option<&Path>) -> Result<PathBuf> {
    match cli_project_root {
        Some(path) => {
            let root = path
                .canonicalize()
                .with_context(|| format!("Project root '{}' is not accessible", path.display()))?;
            if !root.is_dir() {
                bail!("Project root '{}' is not a directory", root.display());
            }
            Ok(root)
        }
        None => Ok(env::current_dir().map_err(AppError::Io)?),
    }
}
