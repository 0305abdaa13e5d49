use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;
use crate::core::scan::{ScanWarning, SourceFile};

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Ignore rules applied to paths relative to the source root.
///
/// Literal entries ignore everything under that path; entries with
/// wildcards are matched as glob patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    literal_paths: Vec<PathBuf>,
    glob_patterns: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new(ignores: &[String], ignore_test_files: bool) -> Self {
        let mut rules = IgnoreRules::default();

        for p in ignores {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => rules.glob_patterns.push(pattern),
                    Err(e) => tracing::warn!(pattern = %p, error = %e, "invalid ignore pattern"),
                }
            } else {
                rules
                    .literal_paths
                    .push(PathBuf::from(p.trim_start_matches("./")));
            }
        }

        // Test file patterns are always globs
        if ignore_test_files {
            rules
                .glob_patterns
                .extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
        }

        rules
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let path = Path::new(relative_path);
        self.literal_paths.iter().any(|ignored| path.starts_with(ignored))
            || self.glob_patterns.iter().any(|p| p.matches(relative_path))
    }
}

/// Files found under the source root, as sorted `/`-separated relative paths.
#[derive(Debug, Default)]
pub struct WalkResult {
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Walk `root` (or the `includes` below it) and collect every file whose
/// extension is in `extensions` and which the ignore rules let through.
pub fn walk_source_files(
    root: &Path,
    includes: &[String],
    rules: &IgnoreRules,
    extensions: &[String],
) -> WalkResult {
    let mut files: BTreeSet<String> = BTreeSet::new();
    let mut skipped_count = 0;

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![root.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                // Glob mode: expand pattern to matching directories
                let full_pattern = root.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|entry| entry.is_dir())),
                    Err(e) => tracing::warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else {
                let path = root.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    tracing::warn!(path = %path.display(), "include path does not exist");
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        let walker = WalkDir::new(&dir)
            .into_iter()
            .filter_entry(|entry| !rules.is_ignored(&relative_path(root, entry.path())));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    tracing::warn!(error = %e, "cannot access path");
                    continue;
                }
            };

            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                files.insert(relative_path(root, entry.path()));
            }
        }
    }

    WalkResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

/// Read the walked files in parallel. Unreadable files become warnings.
pub fn read_sources(root: &Path, files: &[String]) -> (Vec<SourceFile>, Vec<ScanWarning>) {
    let results: Vec<Result<SourceFile, ScanWarning>> = files
        .par_iter()
        .map(|file| {
            fs::read(root.join(file))
                .map(|bytes| SourceFile::new(file.as_str(), bytes))
                .map_err(|e| ScanWarning {
                    file_path: file.clone(),
                    error: format!("cannot read file: {}", e),
                })
        })
        .collect();

    let mut sources = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(source) => sources.push(source),
            Err(warning) => warnings.push(warning),
        }
    }
    (sources, warnings)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}
