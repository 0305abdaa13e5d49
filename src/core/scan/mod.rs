//! Key Scanner: discovers translation-key references in source text.
//!
//! ## Module Structure
//!
//! - `files`: walks the source root and applies include/ignore rules
//! - `script`: swc-based extractor for JS/TS sources
//! - `pattern`: regex-based extractor for every other scanned file type
//!
//! Files are extracted in parallel; results are merged into path → line →
//! column order, so reports never depend on which worker finished first.

pub mod files;
pub mod pattern;
pub mod script;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

use crate::core::key::{DEFAULT_SEPARATOR, TranslationKey};

pub use files::{IgnoreRules, WalkResult, read_sources, walk_source_files};
pub use pattern::PatternExtractor;
pub use script::ScriptExtractor;

/// Extensions handled by the swc extractor.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Translation functions recognised when none are configured.
pub const DEFAULT_FUNCTIONS: &[&str] = &["t", "$t", "i18n.t", "i18next.t"];

/// One source file handed to the scanner. Contents are raw bytes so that
/// encoding problems surface as scan warnings instead of read failures.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: contents.into(),
        }
    }

    fn extension(&self) -> Option<&str> {
        Path::new(&self.path).extension().and_then(|e| e.to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.col)
    }
}

/// A used key and every place it is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsedKeyRecord {
    pub key: TranslationKey,
    pub locations: BTreeSet<SourceLocation>,
}

/// Why a reference could not be turned into a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "detail")]
pub enum UnresolvedReason {
    /// `t(keyName)`
    Variable,
    /// `` t(`errors.${code}`) ``
    TemplateWithExpr,
    /// `t("errors." + code)`
    Concatenation,
    /// Any other non-literal argument.
    Expression,
    /// `t()`
    MissingArgument,
    /// A literal that is not a valid key (`t("")`, `t("a..b")`).
    InvalidKey(String),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::Variable => write!(f, "variable key"),
            UnresolvedReason::TemplateWithExpr => write!(f, "template with expression"),
            UnresolvedReason::Concatenation => write!(f, "string concatenation"),
            UnresolvedReason::Expression => write!(f, "non-literal expression"),
            UnresolvedReason::MissingArgument => write!(f, "missing key argument"),
            UnresolvedReason::InvalidKey(raw) => write!(f, "invalid key \"{}\"", raw),
        }
    }
}

/// A reference whose key cannot be determined statically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnresolvedReference {
    pub location: SourceLocation,
    pub reason: UnresolvedReason,
    /// Static text before the dynamic part (`errors.` for `` `errors.${code}` ``).
    pub static_prefix: Option<String>,
}

impl UnresolvedReference {
    /// A dynamic reference with no static prefix could resolve to any key.
    pub fn is_unbounded(&self) -> bool {
        self.static_prefix.is_none() && !matches!(self.reason, UnresolvedReason::InvalidKey(_))
    }
}

/// A file the scanner had to skip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ScanWarning {
    pub file_path: String,
    pub error: String,
}

/// First argument of a translation call, as seen by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyArgument {
    Literal(String),
    Dynamic {
        reason: UnresolvedReason,
        prefix: Option<String>,
    },
}

impl KeyArgument {
    pub(crate) fn dynamic(reason: UnresolvedReason, prefix: Option<String>) -> Self {
        KeyArgument::Dynamic {
            reason,
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }
}

/// A translation call found by an extractor (1-based line and column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub line: usize,
    pub col: usize,
    pub argument: KeyArgument,
}

/// Extracts translation calls from the text of one file.
pub trait KeyExtractor: Sync {
    fn extract(&self, path: &str, source: &str) -> Result<Vec<RawReference>>;
}

/// The set of keys referenced in code, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedKeys {
    records: BTreeMap<TranslationKey, UsedKeyRecord>,
}

impl UsedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TranslationKey, location: SourceLocation) {
        self.records
            .entry(key.clone())
            .or_insert_with(|| UsedKeyRecord {
                key,
                locations: BTreeSet::new(),
            })
            .locations
            .insert(location);
    }

    pub fn contains(&self, key: &TranslationKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &TranslationKey) -> Option<&UsedKeyRecord> {
        self.records.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TranslationKey> {
        self.records.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &UsedKeyRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<TranslationKey> for UsedKeys {
    /// Keys without source locations, mostly useful for tests and imports.
    fn from_iter<I: IntoIterator<Item = TranslationKey>>(iter: I) -> Self {
        let mut used = UsedKeys::new();
        for key in iter {
            used.records.entry(key.clone()).or_insert_with(|| UsedKeyRecord {
                key,
                locations: BTreeSet::new(),
            });
        }
        used
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub used: UsedKeys,
    pub unresolved: Vec<UnresolvedReference>,
    pub warnings: Vec<ScanWarning>,
    pub files_scanned: usize,
    pub files_ignored: usize,
}

impl ScanResult {
    /// Static prefixes of unresolvable references, deduplicated and sorted.
    pub fn dynamic_prefixes(&self) -> Vec<String> {
        let prefixes: BTreeSet<String> = self
            .unresolved
            .iter()
            .filter_map(|r| r.static_prefix.clone())
            .collect();
        prefixes.into_iter().collect()
    }

    /// Number of unresolvable references that have no static prefix and
    /// could therefore point at any key.
    pub fn unbounded_dynamic_count(&self) -> usize {
        self.unresolved.iter().filter(|r| r.is_unbounded()).count()
    }
}

/// Scanner settings derived from the configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Function names treated as translation accessors (`t`, `i18n.t`, `$t`).
    pub functions: Vec<String>,
    pub separator: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            functions: DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

enum FileOutcome {
    Ignored,
    Skipped(ScanWarning),
    Scanned(Vec<RawReference>),
}

/// Scanner holding the compiled extractors for one run.
pub struct Scanner {
    script: ScriptExtractor,
    pattern: PatternExtractor,
    separator: String,
}

impl Scanner {
    pub fn new(options: &ScanOptions) -> Result<Self> {
        Ok(Self {
            script: ScriptExtractor::new(&options.functions),
            pattern: PatternExtractor::new(&options.functions)?,
            separator: options.separator.clone(),
        })
    }

    /// Scan `sources`, skipping every path for which `ignore` returns true.
    pub fn scan<F>(&self, sources: &[SourceFile], ignore: F) -> ScanResult
    where
        F: Fn(&str) -> bool + Sync,
    {
        let mut ordered: Vec<&SourceFile> = sources.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(&b.path));

        let outcomes: Vec<(&SourceFile, FileOutcome)> = ordered
            .par_iter()
            .map(|source| {
                let outcome = if ignore(&source.path) {
                    FileOutcome::Ignored
                } else {
                    self.scan_file(source)
                };
                (*source, outcome)
            })
            .collect();

        let mut result = ScanResult::default();
        for (source, outcome) in outcomes {
            match outcome {
                FileOutcome::Ignored => result.files_ignored += 1,
                FileOutcome::Skipped(warning) => {
                    tracing::warn!(file = %warning.file_path, error = %warning.error, "skipping file");
                    result.warnings.push(warning);
                }
                FileOutcome::Scanned(references) => {
                    result.files_scanned += 1;
                    tracing::debug!(file = %source.path, references = references.len(), "scanned");
                    self.merge(&source.path, references, &mut result);
                }
            }
        }

        result.unresolved.sort();
        result.warnings.sort();
        result
    }

    fn scan_file(&self, source: &SourceFile) -> FileOutcome {
        let text = match std::str::from_utf8(&source.bytes) {
            Ok(text) => text,
            Err(e) => {
                return FileOutcome::Skipped(ScanWarning {
                    file_path: source.path.clone(),
                    error: format!("file is not valid UTF-8: {}", e),
                });
            }
        };

        let is_script = source
            .extension()
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));
        let extracted = if is_script {
            self.script.extract(&source.path, text)
        } else {
            self.pattern.extract(&source.path, text)
        };

        match extracted {
            Ok(references) => FileOutcome::Scanned(references),
            Err(e) => FileOutcome::Skipped(ScanWarning {
                file_path: source.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    fn merge(&self, path: &str, references: Vec<RawReference>, result: &mut ScanResult) {
        for reference in references {
            let location = SourceLocation::new(path, reference.line, reference.col);
            match reference.argument {
                KeyArgument::Literal(raw) => match TranslationKey::parse(&raw, &self.separator) {
                    Ok(key) => result.used.insert(key, location),
                    Err(_) => result.unresolved.push(UnresolvedReference {
                        location,
                        reason: UnresolvedReason::InvalidKey(raw),
                        static_prefix: None,
                    }),
                },
                KeyArgument::Dynamic { reason, prefix } => {
                    result.unresolved.push(UnresolvedReference {
                        location,
                        reason,
                        static_prefix: prefix,
                    });
                }
            }
        }
    }
}

/// Scan source texts for translation keys in one call.
pub fn scan_sources<F>(sources: &[SourceFile], options: &ScanOptions, ignore: F) -> Result<ScanResult>
where
    F: Fn(&str) -> bool + Sync,
{
    Ok(Scanner::new(options)?.scan(sources, ignore))
}
