use crate::error::{AppError, Result};
use crate::file_set::FileSet;
use log;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;

/// The assembled prompt and the files that ended up in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDocument {
    pub text: String,
    /// Input files first, then the optional files the prompt mentioned.
    pub included: FileSet,
}

/// Builds the prompt: header, input blocks, mentioned optional blocks, footer.
///
/// Input files are read in parallel but rendered in set order. Optional
/// files already present in `inputs` are skipped.
pub fn assemble_prompt(
    project_root: &Path,
    user_prompt: &str,
    inputs: &FileSet,
    optionals: &FileSet,
) -> Result<PromptDocument> {
    let mut text = format!("## User Request:\n{}\n\n---\n", user_prompt);

    let input_paths: Vec<&str> = inputs.iter().collect();
    let input_blocks = input_paths
        .par_iter()
        .map(|path| read_block(project_root, path))
        .collect::<Result<Vec<_>>>()?;

    let mut included = FileSet::new();
    for (path, block) in input_paths.iter().zip(&input_blocks) {
        if let Some(block) = block {
            text.push_str(block);
            included.insert(*path);
        }
    }
    log::debug!("Rendered {} of {} input files", included.len(), inputs.len());

    for path in optionals.iter() {
        if inputs.contains(path) {
            continue;
        }
        if !mentions_file(user_prompt, path) {
            log::trace!("Optional file not mentioned in prompt: {}", path);
            continue;
        }
        log::debug!("Including optional file mentioned in prompt: {}", path);
        if let Some(block) = read_block(project_root, path)? {
            text.push_str(&block);
            included.insert(path);
        }
    }

    text.push_str(&format!("\n\n---\n## Instructions:\n{}", user_prompt));

    Ok(PromptDocument { text, included })
}

/// Case-sensitive check for the file's base name anywhere in the prompt.
pub fn mentions_file(user_prompt: &str, path: &str) -> bool {
    Path::new(path)
        .file_name()
        .is_some_and(|name| user_prompt.contains(&*name.to_string_lossy()))
}

/// Reads and renders one file. `None` means the file vanished since
/// resolution; it contributes nothing and is not counted as included.
pub fn read_block(project_root: &Path, path: &str) -> Result<Option<String>> {
    let full_path = project_root.join(path);
    match fs::read(&full_path) {
        Ok(bytes) => {
            let content = String::from_utf8_lossy(&bytes);
            Ok(Some(render_block(path, &content)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("File disappeared before it could be read: {}", path);
            Ok(None)
        }
        Err(e) => Err(AppError::FileRead {
            path: full_path,
            source: e,
        }),
    }
}

pub fn render_block(path: &str, content: &str) -> String {
    let trimmed = content.trim();
    let end_marker = format!("\n[End of {}]\n", path);
    if is_markdown(path) {
        format!("\n\n### File: {}\n\n{}\n\n{}", path, trimmed, end_marker)
    } else {
        format!(
            "\n\n### File: {}\n```\n{}\n```\n\n{}",
            path, trimmed, end_marker
        )
    }
}

fn is_markdown(path: &str) -> bool {
    Path::new(path).extension().is_some_and(|ext| ext == "md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn set(items: &[&str]) -> FileSet {
        items.iter().copied().collect()
    }

    #[test]
    fn empty_document_has_exact_shape() {
        let dir = tempdir().expect("Failed to create temp dir");
        let doc = assemble_prompt(
            dir.path(),
            "This is a user request",
            &FileSet::new(),
            &FileSet::new(),
        )
        .unwrap();
        assert_eq!(
            doc.text,
            "## User Request:\nThis is a user request\n\n---\n\n\n---\n## Instructions:\nThis is a user request"
        );
        assert!(doc.included.is_empty());
    }

    #[test]
    fn code_files_are_fenced_and_markdown_is_not() {
        assert_eq!(
            render_block("src/a.ts", "  const a = 1;\n\n"),
            "\n\n### File: src/a.ts\n```\nconst a = 1;\n```\n\n\n[End of src/a.ts]\n"
        );
        assert_eq!(
            render_block("docs/guide.md", "\n# Guide\n"),
            "\n\n### File: docs/guide.md\n\n# Guide\n\n\n[End of docs/guide.md]\n"
        );
        assert!(render_block("notes.MD", "x").contains("```"));
    }

    #[test]
    fn mentions_use_base_name_only() {
        assert!(mentions_file("please fix file2.ts", "src/file2.ts"));
        assert!(mentions_file("please fix file2.ts", "lib/other/file2.ts"));
        assert!(!mentions_file("please fix src", "src/file2.ts"));
        assert!(!mentions_file("please fix FILE2.ts", "src/file2.ts"));
    }

    #[test]
    fn includes_inputs_and_mentioned_optionals() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/file1.ts"), "const foo = \"bar\";").unwrap();
        fs::write(dir.path().join("src/file2.ts"), "const bar = \"baz\";").unwrap();
        fs::write(dir.path().join("src/file3.ts"), "const john = \"doo\";").unwrap();

        let doc = assemble_prompt(
            dir.path(),
            "file2.ts",
            &set(&["src/file1.ts"]),
            &set(&["src/file1.ts", "src/file2.ts", "src/file3.ts"]),
        )
        .unwrap();

        assert!(doc.text.contains("const foo = \"bar\";"));
        assert!(doc.text.contains("const bar = \"baz\";"));
        assert!(!doc.text.contains("const john = \"doo\";"));
        assert_eq!(doc.text.matches("### File: src/file1.ts").count(), 1);
        assert_eq!(doc.included.to_vec(), vec!["src/file1.ts", "src/file2.ts"]);
        assert!(doc.text.starts_with("## User Request:\nfile2.ts\n\n---\n"));
        assert!(doc.text.ends_with("\n\n---\n## Instructions:\nfile2.ts"));
    }

    #[test]
    fn input_blocks_follow_set_order() {
        let dir = tempdir().expect("Failed to create temp dir");
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let inputs = set(&["c.txt", "a.txt", "b.txt"]);
        let doc = assemble_prompt(dir.path(), "", &inputs, &FileSet::new()).unwrap();
        let c = doc.text.find("### File: c.txt").unwrap();
        let a = doc.text.find("### File: a.txt").unwrap();
        let b = doc.text.find("### File: b.txt").unwrap();
        assert!(c < a && a < b);

        let again = assemble_prompt(dir.path(), "", &inputs, &FileSet::new()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn vanished_file_renders_empty_and_is_not_included() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert_eq!(read_block(dir.path(), "gone.ts").unwrap(), None);
        fs::write(dir.path().join("here.ts"), "const here = 1;").unwrap();

        let doc = assemble_prompt(
            dir.path(),
            "req gone2.ts",
            &set(&["gone.ts", "here.ts"]),
            &set(&["gone2.ts"]),
        )
        .unwrap();
        assert!(!doc.text.contains("### File: gone"));
        assert!(doc.text.contains("const here = 1;"));
        assert_eq!(doc.included.to_vec(), vec!["here.ts"]);

        let empty = assemble_prompt(dir.path(), "req", &set(&["gone.ts"]), &FileSet::new()).unwrap();
        assert_eq!(
            empty.text,
            "## User Request:\nreq\n\n---\n\n\n---\n## Instructions:\nreq"
        );
        assert!(empty.included.is_empty());
    }
}
