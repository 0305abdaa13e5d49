//! Analyzer: compares used keys against every language tree.
//!
//! For each language it produces three disjoint sets:
//! - `missing`: used in code, no leaf in this language
//! - `orphan`: a leaf in this language, never used (minus reserved keys)
//! - `mismatched`: top-most paths whose node kind differs from the reference

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::error::AnalyzeError;
use crate::core::key::{DEFAULT_SEPARATOR, TranslationKey};
use crate::core::language::LanguageSet;
use crate::core::scan::{ScanResult, ScanWarning, UnresolvedReference, UsedKeys};
use crate::core::tree::{NodeKind, TranslationTree};
use crate::core::utils::{KeyPattern, matches_any};

/// Plural forms recognised when none are configured (CLDR categories).
pub const DEFAULT_PLURAL_SUFFIXES: &[&str] = &["_zero", "_one", "_two", "_few", "_many", "_other"];

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub plural_suffixes: Vec<String>,
    /// Leaves matching any of these are never reported as orphans.
    pub reserved_keys: Vec<KeyPattern>,
    /// Keep leaves under the static prefix of a dynamic reference out of `orphan`.
    pub protect_dynamic_prefixes: bool,
    pub separator: String,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            plural_suffixes: DEFAULT_PLURAL_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            reserved_keys: Vec::new(),
            protect_dynamic_prefixes: true,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// A path whose node kind differs between the reference and a language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ShapeMismatch {
    pub key: TranslationKey,
    pub reference: NodeKind,
    pub found: NodeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageDiff {
    pub missing: BTreeSet<TranslationKey>,
    pub orphan: BTreeSet<TranslationKey>,
    pub mismatched: Vec<ShapeMismatch>,
    /// Orphans hidden because the scan found no keys at all.
    pub orphan_suppressed: usize,
    /// Orphans left out because they lie under a mismatched path.
    #[serde(skip)]
    pub shadowed_orphans: BTreeSet<TranslationKey>,
}

impl LanguageDiff {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphan.is_empty() && self.mismatched.is_empty()
    }

    /// True if `key` equals, contains or lies under a mismatched path.
    pub fn is_covered_by_mismatch(&self, key: &TranslationKey) -> bool {
        self.mismatched.iter().any(|m| m.key.overlaps(key))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub reference: String,
    pub languages: BTreeMap<String, LanguageDiff>,
    pub used_count: usize,
    pub files_scanned: usize,
    pub unresolved: Vec<UnresolvedReference>,
    /// Dynamic references with no static prefix; they may target any key.
    pub unbounded_dynamic: usize,
    pub scan_warnings: Vec<ScanWarning>,
    /// No keys were found in the scanned sources.
    pub degenerate: bool,
    #[serde(skip)]
    pub used: UsedKeys,
    #[serde(skip)]
    pub plural_suffixes: Vec<String>,
}

impl Analysis {
    pub fn diff(&self, language: &str) -> Option<&LanguageDiff> {
        self.languages.get(language)
    }

    pub fn total_missing(&self) -> usize {
        self.languages.values().map(|d| d.missing.len()).sum()
    }

    pub fn total_orphan(&self) -> usize {
        self.languages.values().map(|d| d.orphan.len()).sum()
    }

    pub fn total_mismatched(&self) -> usize {
        self.languages.values().map(|d| d.mismatched.len()).sum()
    }

    pub fn total_orphan_suppressed(&self) -> usize {
        self.languages.values().map(|d| d.orphan_suppressed).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.languages.values().all(LanguageDiff::is_clean)
    }
}

/// Compare the scan result against every language of `languages`.
///
/// Fails only when the reference language is not part of the set.
pub fn analyze(
    scan: &ScanResult,
    languages: &LanguageSet,
    options: &AnalyzeOptions,
) -> Result<Analysis, AnalyzeError> {
    let reference_tree = languages
        .reference_tree()
        .ok_or_else(|| AnalyzeError::MissingReference {
            reference: languages.reference().to_string(),
            available: available_languages(languages),
        })?;

    let reference_paths = reference_tree.node_paths();
    let dynamic_prefixes = if options.protect_dynamic_prefixes {
        scan.dynamic_prefixes()
    } else {
        Vec::new()
    };
    let degenerate = scan.used.is_empty();

    let mut diffs = BTreeMap::new();
    for (language, tree) in languages.iter() {
        let mut diff = LanguageDiff {
            mismatched: find_mismatches(&reference_paths, tree),
            missing: find_missing(&scan.used, tree, options),
            orphan: find_orphans(&scan.used, tree, &dynamic_prefixes, options),
            orphan_suppressed: 0,
            shadowed_orphans: BTreeSet::new(),
        };

        if !diff.mismatched.is_empty() {
            let mismatched = diff.mismatched.clone();
            let covered = |key: &TranslationKey| mismatched.iter().any(|m| m.key.overlaps(key));
            diff.missing.retain(|key| !covered(key));
            let (shadowed, orphan) = std::mem::take(&mut diff.orphan)
                .into_iter()
                .partition(|key| covered(key));
            diff.shadowed_orphans = shadowed;
            diff.orphan = orphan;
        }

        if degenerate {
            diff.orphan_suppressed = diff.orphan.len();
            diff.orphan.clear();
            diff.shadowed_orphans.clear();
        }

        tracing::debug!(
            language,
            missing = diff.missing.len(),
            orphan = diff.orphan.len(),
            mismatched = diff.mismatched.len(),
            "analyzed language"
        );
        diffs.insert(language.to_string(), diff);
    }

    if degenerate {
        tracing::warn!(files = scan.files_scanned, "no translation keys found in scanned sources");
    }

    Ok(Analysis {
        reference: languages.reference().to_string(),
        languages: diffs,
        used_count: scan.used.len(),
        files_scanned: scan.files_scanned,
        unresolved: scan.unresolved.clone(),
        unbounded_dynamic: scan.unbounded_dynamic_count(),
        scan_warnings: scan.warnings.clone(),
        degenerate,
        used: scan.used.clone(),
        plural_suffixes: options.plural_suffixes.clone(),
    })
}

fn available_languages(languages: &LanguageSet) -> String {
    if languages.is_empty() {
        "none".to_string()
    } else {
        languages.languages().collect::<Vec<_>>().join(", ")
    }
}

/// Walk the reference paths in depth-first order; once a path conflicts,
/// nothing below it is reported again.
fn find_mismatches(
    reference_paths: &[(TranslationKey, NodeKind)],
    tree: &TranslationTree,
) -> Vec<ShapeMismatch> {
    let mut mismatches: Vec<ShapeMismatch> = Vec::new();
    for (key, reference_kind) in reference_paths {
        if mismatches.iter().any(|m| key.starts_with(&m.key)) {
            continue;
        }
        if let Some(found) = tree.get(key).kind()
            && found != *reference_kind
        {
            mismatches.push(ShapeMismatch {
                key: key.clone(),
                reference: *reference_kind,
                found,
            });
        }
    }
    mismatches.sort();
    mismatches
}

fn find_missing(
    used: &UsedKeys,
    tree: &TranslationTree,
    options: &AnalyzeOptions,
) -> BTreeSet<TranslationKey> {
    used.keys()
        .filter(|key| !has_leaf_or_plural(key, tree, &options.plural_suffixes))
        .cloned()
        .collect()
}

/// True if `key` is a leaf of `tree`, or one of its plural forms is.
pub(crate) fn has_leaf_or_plural(key: &TranslationKey, tree: &TranslationTree, suffixes: &[String]) -> bool {
    tree.get(key).is_leaf()
        || suffixes.iter().any(|suffix| {
            let plural = key.with_leaf_name(format!("{}{}", key.leaf_name(), suffix));
            tree.get(&plural).is_leaf()
        })
}

fn find_orphans(
    used: &UsedKeys,
    tree: &TranslationTree,
    dynamic_prefixes: &[String],
    options: &AnalyzeOptions,
) -> BTreeSet<TranslationKey> {
    tree.leaf_paths()
        .into_iter()
        .filter(|key| !used.contains(key))
        .filter(|key| !matches_any(&options.reserved_keys, key))
        .filter(|key| !is_plural_of_used(key, used, options))
        .filter(|key| {
            !dynamic_prefixes
                .iter()
                .any(|prefix| under_dynamic_prefix(key, prefix, &options.separator))
        })
        .collect()
}

/// Segment-wise prefix match. Complete segments of `prefix` must equal the
/// key's leading segments; a trailing partial segment (`"errors"` from
/// `"errors" + code`) only has to start the next key segment, since the
/// runtime value may continue it (`errorsLegacy`).
fn under_dynamic_prefix(key: &TranslationKey, prefix: &str, separator: &str) -> bool {
    if separator.is_empty() {
        return key.join(separator).starts_with(prefix);
    }
    let mut parts: Vec<&str> = prefix.split(separator).collect();
    let partial = parts.pop().unwrap_or_default();
    let segments = key.segments();
    if segments.len() <= parts.len() {
        return false;
    }
    parts.iter().zip(segments).all(|(part, segment)| *part == segment)
        && segments[parts.len()].starts_with(partial)
}

fn is_plural_of_used(key: &TranslationKey, used: &UsedKeys, options: &AnalyzeOptions) -> bool {
    let leaf = key.leaf_name();
    options.plural_suffixes.iter().any(|suffix| {
        leaf.strip_suffix(suffix.as_str())
            .filter(|base| !base.is_empty())
            .is_some_and(|base| used.contains(&key.with_leaf_name(base)))
    })
}
