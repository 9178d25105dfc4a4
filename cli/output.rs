use anyhow::{Context, Result};
use colored::*;
use gptt_core::{AppError, Config, PromptDocument, resolve_against_root};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Writes the prompt to `config.out` (with a short report) or to stdout.
pub fn print_prompt_or_save(
    document: &PromptDocument,
    config: &Config,
    project_root: &Path,
    user_prompt: &str,
    quiet: bool,
) -> Result<()> {
    match &config.out {
        Some(out) => {
            let path = resolve_against_root(project_root, out);
            write_to_file(&path, &document.text)?;
            log::info!("Prompt saved to {}", path.display());
            if !quiet {
                print_save_report(out, document, user_prompt);
            }
        }
        None => {
            write_to_stdout(&document.text)?;
        }
    }
    Ok(())
}

fn print_save_report(out: &Path, document: &PromptDocument, user_prompt: &str) {
    println!(
        "{} Prompt written to {}",
        "✅".green(),
        out.display().to_string().blue()
    );
    println!("{}", "Included files:".green());
    if document.included.is_empty() {
        println!("  {}", "(none)".yellow());
    } else {
        for path in document.included.iter() {
            println!("  - {}", path.cyan());
        }
    }
    println!("{} {}", "Prompt:".green(), user_prompt);
}

fn write_to_file(path: &Path, content: &str) -> Result<()> {
    // Parent directories are not created; a missing directory is a write error.
    fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    handle
        .write_all(b"\n")
        .context("Failed to write newline to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
