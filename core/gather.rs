use crate::error::Result;
use crate::file_set::FileSet;
use crate::ignore_filter::IgnoreFilter;
use globset::{GlobBuilder, GlobMatcher};
use log;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const GLOB_META_CHARS: &[char] = &['*', '?', '[', '{'];

/// Expands `patterns`, drops anything matched by `exclude_patterns`, then
/// drops anything the ignore rules match.
pub fn resolve_files(
    project_root: &Path,
    patterns: &[String],
    exclude_patterns: &[String],
    ignore: &IgnoreFilter,
) -> Result<FileSet> {
    let mut files = expand_patterns(project_root, patterns)?;
    let matched = files.len();

    if !exclude_patterns.is_empty() {
        let excluded = expand_patterns(project_root, exclude_patterns)?;
        files.retain(|path| {
            let keep = !excluded.contains(path);
            if !keep {
                log::trace!("Excluded by pattern: {}", path);
            }
            keep
        });
    }

    let files = ignore.filter(files);
    log::debug!(
        "Resolved {} of {} matched files for patterns {:?}",
        files.len(),
        matched,
        patterns
    );
    Ok(files)
}

/// Expands every pattern in parallel and unions the results in pattern order.
pub fn expand_patterns(project_root: &Path, patterns: &[String]) -> Result<FileSet> {
    let expansions = patterns
        .par_iter()
        .map(|pattern| expand_pattern(project_root, pattern))
        .collect::<Result<Vec<_>>>()?;
    Ok(expansions.into_iter().flatten().collect())
}

/// Regular files matching one glob pattern, relative to `project_root`.
///
/// Only the literal directory prefix of the pattern is walked. A base that
/// does not exist yields no files rather than an error.
pub fn expand_pattern(project_root: &Path, pattern: &str) -> Result<Vec<String>> {
    let normalized = normalize_pattern(pattern);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let Some(base) = glob_base(&normalized) else {
        let path = project_root.join(&normalized);
        return Ok(if path.is_file() {
            log::trace!("Literal pattern matched file: {}", normalized);
            vec![normalized.clone()]
        } else {
            log::trace!("Literal pattern matched nothing: {}", normalized);
            Vec::new()
        });
    };

    let matcher = build_matcher(&normalized)?;
    let walk_root = if base.is_empty() {
        project_root.to_path_buf()
    } else {
        project_root.join(base)
    };
    if !walk_root.is_dir() {
        log::trace!(
            "Pattern base {} is not a directory, no matches for {}",
            walk_root.display(),
            normalized
        );
        return Ok(Vec::new());
    }

    let include_hidden = names_hidden_component(&normalized);
    let walker = WalkDir::new(&walk_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry));

    let mut matches = Vec::new();
    for entry_result in walker {
        let entry = entry_result?;
        if !is_regular_file(&entry) {
            continue;
        }
        let relative = pathdiff::diff_paths(entry.path(), &walk_root)
            .unwrap_or_else(|| entry.path().to_path_buf());
        let candidate = join_display(base, &relative);
        if matcher.is_match(&candidate) {
            matches.push(candidate);
        }
    }
    log::debug!("Pattern '{}' matched {} files", pattern, matches.len());
    Ok(matches)
}

fn normalize_pattern(pattern: &str) -> String {
    let mut trimmed = pattern.trim();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    if trimmed == "." {
        return String::new();
    }
    trimmed.to_string()
}

/// Directory prefix before the first component containing glob syntax, or
/// `None` when the pattern has no glob syntax at all.
fn glob_base(pattern: &str) -> Option<&str> {
    let meta_at = pattern.find(GLOB_META_CHARS)?;
    Some(match pattern[..meta_at].rfind('/') {
        Some(0) => "/",
        Some(slash) => &pattern[..slash],
        None => "",
    })
}

fn build_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            log::error!("Invalid glob pattern \"{}\": {}", pattern, e);
            e
        })?;
    Ok(glob.compile_matcher())
}

fn names_hidden_component(pattern: &str) -> bool {
    pattern
        .split('/')
        .any(|segment| segment.starts_with('.') && segment != "." && segment != "..")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

fn join_display(base: &str, relative: &Path) -> String {
    let relative = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    match base {
        "" => relative,
        b if b.ends_with('/') => format!("{}{}", b, relative),
        b => format!("{}/{}", b, relative),
    }
}

/// Resolves a possibly-relative output path against the project root.
pub fn resolve_against_root(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn fixture() -> TempDir {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        for (path, content) in [
            ("src/file1.ts", "const foo = \"bar\";"),
            ("src/file2.ts", "const bar = \"baz\";"),
            ("src/file3.ts", "const john = \"doo\";"),
            ("src/nested/deep.ts", "export const deep = 1;"),
            ("src/dir.ts/inner.txt", "not a ts file"),
            ("node_modules/package/index.js", "const pkg = \"ignored\";"),
            (".hidden/secret.ts", "hidden"),
            ("README.md", "# Readme"),
        ] {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).expect("mkdir");
            fs::write(full, content).expect("write fixture");
        }
        dir
    }

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn star_does_not_cross_directories_and_skips_dirs() {
        let dir = fixture();
        let files = expand_pattern(dir.path(), "src/*.ts").unwrap();
        assert_eq!(files, vec!["src/file1.ts", "src/file2.ts", "src/file3.ts"]);
    }

    #[test]
    fn double_star_recurses() {
        let dir = fixture();
        let files = expand_pattern(dir.path(), "./src/**").unwrap();
        assert!(files.contains(&"src/nested/deep.ts".to_string()));
        assert!(files.contains(&"src/dir.ts/inner.txt".to_string()));
        assert!(!files.iter().any(|f| f == "src/dir.ts"));
    }

    #[test]
    fn match_all_skips_dot_entries_unless_named() {
        let dir = fixture();
        let all = expand_pattern(dir.path(), "./**").unwrap();
        assert!(all.contains(&"README.md".to_string()));
        assert!(all.contains(&"node_modules/package/index.js".to_string()));
        assert!(!all.iter().any(|f| f.starts_with(".hidden")));

        let hidden = expand_pattern(dir.path(), ".hidden/*.ts").unwrap();
        assert_eq!(hidden, vec![".hidden/secret.ts"]);
    }

    #[test]
    fn literal_patterns_match_existing_files_only() {
        let dir = fixture();
        assert_eq!(
            expand_pattern(dir.path(), "src/file1.ts").unwrap(),
            vec!["src/file1.ts"]
        );
        assert!(expand_pattern(dir.path(), "invalid/file.ts").unwrap().is_empty());
        assert!(expand_pattern(dir.path(), "src/nested").unwrap().is_empty());
        assert!(expand_pattern(dir.path(), "missing/**").unwrap().is_empty());
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let dir = fixture();
        let err = expand_pattern(dir.path(), "src/[").unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }

    #[test]
    fn union_keeps_pattern_order_without_duplicates() {
        let dir = fixture();
        let files =
            expand_patterns(dir.path(), &patterns(&["src/file3.ts", "src/*.ts"])).unwrap();
        assert_eq!(
            files.to_vec(),
            vec!["src/file3.ts", "src/file1.ts", "src/file2.ts"]
        );
    }

    #[test]
    fn exclude_patterns_remove_matches() {
        let dir = fixture();
        let files = resolve_files(
            dir.path(),
            &patterns(&["src/*.ts"]),
            &patterns(&["src/file2.ts"]),
            &IgnoreFilter::empty(),
        )
        .unwrap();
        assert_eq!(files.to_vec(), vec!["src/file1.ts", "src/file3.ts"]);
    }

    #[test]
    fn ignore_rules_apply_after_expansion() {
        let dir = fixture();
        let ignore = IgnoreFilter::from_rules(dir.path(), "node_modules\n").unwrap();
        let files = resolve_files(
            dir.path(),
            &patterns(&["node_modules/**", "README.md"]),
            &[],
            &ignore,
        )
        .unwrap();
        assert_eq!(files.to_vec(), vec!["README.md"]);
    }

    #[test]
    fn output_paths_resolve_against_root() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_against_root(root, Path::new("out.txt")),
            PathBuf::from("/project/out.txt")
        );
        assert_eq!(
            resolve_against_root(root, Path::new("/tmp/out.txt")),
            PathBuf::from("/tmp/out.txt")
        );
    }
}
