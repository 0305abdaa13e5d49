//! Persistence of language trees under the messages root.
//!
//! Two layouts are recognised per language:
//! - `<root>/<lang>.json`: the whole tree in one file
//! - `<root>/<lang>/<namespace>.json`: one file per top-level namespace
//!
//! Files are written back as 2-space pretty JSON with a trailing newline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::error::StoreError;
use crate::core::language::LanguageSet;
use crate::core::tree::{Node, TranslationTree};

/// How one language is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    File,
    Directory,
}

/// Languages read from the messages root.
#[derive(Debug)]
pub struct LoadedLanguages {
    pub set: LanguageSet,
    pub layouts: BTreeMap<String, Layout>,
    /// Non-reference languages that could not be read, and why.
    pub skipped: Vec<(String, StoreError)>,
}

impl LoadedLanguages {
    /// Layout for `language`; new languages follow the reference.
    pub fn layout(&self, language: &str) -> Layout {
        self.layouts
            .get(language)
            .or_else(|| self.layouts.get(self.set.reference()))
            .copied()
            .unwrap_or(Layout::File)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    pub sort_keys: bool,
}

/// Read every language under `root`.
///
/// Entry names are split on `separator`, so flat (`"home.title"`) and nested
/// files load to the same tree. A language that fails to load is skipped with
/// a warning, except the reference language, whose failure is returned as an
/// error.
pub fn load_languages(root: &Path, reference: &str, separator: &str) -> Result<LoadedLanguages, StoreError> {
    if !root.exists() {
        return Err(StoreError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(StoreError::NotADirectory(root.to_path_buf()));
    }

    let mut found: BTreeMap<String, (Layout, PathBuf)> = BTreeMap::new();
    let entries = fs::read_dir(root).map_err(|source| StoreError::Read {
        path: root.to_path_buf(),
        source,
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if json_files(&path).is_empty() {
                continue;
            }
            if found.contains_key(&name) {
                tracing::warn!(language = %name, "both a file and a directory found; using the file");
                continue;
            }
            found.insert(name, (Layout::Directory, path));
        } else if let Some(language) = name.strip_suffix(".json") {
            if let Some((Layout::Directory, _)) = found.get(language) {
                tracing::warn!(language, "both a file and a directory found; using the file");
            }
            found.insert(language.to_string(), (Layout::File, path));
        }
    }

    let mut loaded = LoadedLanguages {
        set: LanguageSet::new(reference),
        layouts: BTreeMap::new(),
        skipped: Vec::new(),
    };
    for (language, (layout, path)) in found {
        let tree = match layout {
            Layout::File => read_tree(&path, separator),
            Layout::Directory => read_directory(&path, separator),
        };
        match tree {
            Ok(tree) => {
                tracing::debug!(language = %language, leaves = tree.leaf_count(), "loaded language");
                loaded.set.insert(language.clone(), tree);
                loaded.layouts.insert(language, layout);
            }
            Err(e) if language == reference => return Err(e),
            Err(e) => {
                tracing::warn!(language = %language, error = %e, "skipping language");
                loaded.skipped.push((language, e));
            }
        }
    }

    Ok(loaded)
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .filter(|p| !p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.')))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

fn read_tree(path: &Path, separator: &str) -> Result<TranslationTree, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => {
            TranslationTree::from_json_split(&map, separator).map_err(|source| StoreError::Shape {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(StoreError::NotAnObject(path.to_path_buf())),
    }
}

/// Each `*.json` file of the directory becomes a namespace named after its stem.
fn read_directory(dir: &Path, separator: &str) -> Result<TranslationTree, StoreError> {
    let mut tree = TranslationTree::new();
    for path in json_files(dir) {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let namespace = read_tree(&path, separator)?;
        let key = crate::core::key::TranslationKey::from_tree_path(&[stem]);
        // A fresh single-segment key can't conflict
        let _ = tree.replace(&key, Node::Namespace(namespace));
    }
    Ok(tree)
}

/// Serialize a tree the way language files are written.
pub fn to_pretty_json(tree: &TranslationTree, options: &SaveOptions) -> Result<String, serde_json::Error> {
    let value = if options.sort_keys {
        tree.sorted().to_json()
    } else {
        tree.to_json()
    };
    Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
}

/// Write one language. Returns the files written.
pub fn save_language(
    root: &Path,
    language: &str,
    tree: &TranslationTree,
    layout: Layout,
    options: &SaveOptions,
) -> Result<Vec<PathBuf>, StoreError> {
    match layout {
        Layout::File => {
            let path = root.join(format!("{}.json", language));
            write_json(&path, language, tree, options)?;
            Ok(vec![path])
        }
        Layout::Directory => save_directory(root, language, tree, options),
    }
}

fn save_directory(
    root: &Path,
    language: &str,
    tree: &TranslationTree,
    options: &SaveOptions,
) -> Result<Vec<PathBuf>, StoreError> {
    let dir = root.join(language);
    let mut written = Vec::new();

    for (name, node) in tree.iter() {
        match node {
            Node::Namespace(namespace) => {
                let path = dir.join(format!("{}.json", name));
                write_json(&path, language, namespace, options)?;
                written.push(path);
            }
            Node::Leaf(_) => {
                return Err(StoreError::TopLevelLeaf {
                    language: language.to_string(),
                    key: name.to_string(),
                });
            }
        }
    }

    // Namespaces removed from the tree leave stale files behind
    for path in json_files(&dir) {
        if !written.contains(&path) {
            fs::remove_file(&path).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(file = %path.display(), "removed empty namespace file");
        }
    }

    Ok(written)
}

fn write_json(
    path: &Path,
    language: &str,
    tree: &TranslationTree,
    options: &SaveOptions,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = to_pretty_json(tree, options).map_err(|source| StoreError::Serialize {
        language: language.to_string(),
        source,
    })?;
    fs::write(path, content).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write each of `languages`, continuing past failures.
///
/// Returns the languages that failed, with their errors.
pub fn save_languages<'a, I>(
    root: &Path,
    loaded: &LoadedLanguages,
    languages: I,
    options: &SaveOptions,
) -> Vec<(String, StoreError)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut failures = Vec::new();
    for language in languages {
        let Some(tree) = loaded.set.get(language) else {
            continue;
        };
        match save_language(root, language, tree, loaded.layout(language), options) {
            Ok(paths) => tracing::debug!(language, files = paths.len(), "saved language"),
            Err(e) => {
                tracing::warn!(language, error = %e, "failed to save language");
                failures.push((language.to_string(), e));
            }
        }
    }
    failures
}
