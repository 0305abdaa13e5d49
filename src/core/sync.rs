//! Synchronizer: turns an analysis into a per-language change plan and
//! applies it to the trees.
//!
//! Planning runs every change against a scratch copy of the tree, so a plan
//! never contains two changes that contradict each other and re-planning on
//! the applied trees yields no changes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::analyze::{Analysis, LanguageDiff, has_leaf_or_plural};
use crate::core::key::{DEFAULT_SEPARATOR, TranslationKey};
use crate::core::language::LanguageSet;
use crate::core::tree::{Lookup, Node, NodeKind, TranslationTree};

/// What to do with paths whose node kind differs from the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchPolicy {
    /// Replace the node with the reference's shape, discarding its values.
    ReferenceWins,
    #[default]
    Skip,
}

/// Value given to newly added leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placeholder {
    /// The key itself (`home.title`).
    #[default]
    Key,
    Empty,
    /// The reference language's string, or the key when it has none.
    Reference,
    /// Free text with `{key}` and `{lang}` substituted.
    Template(String),
}

#[derive(Debug, Clone)]
pub struct SyncPolicy {
    pub add_missing: bool,
    pub remove_orphans: bool,
    pub fix_mismatches: MismatchPolicy,
    pub placeholder: Placeholder,
    /// Allow removals even though dynamic references could target any key.
    pub prune_with_dynamic_keys: bool,
    /// Separator used when a key is written into a placeholder.
    pub separator: String,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            add_missing: true,
            remove_orphans: false,
            fix_mismatches: MismatchPolicy::Skip,
            placeholder: Placeholder::Key,
            prune_with_dynamic_keys: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addition {
    pub key: TranslationKey,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscardedValue {
    pub key: TranslationKey,
    pub value: String,
}

/// Replace the node at `key` with the reference's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Restructure {
    pub key: TranslationKey,
    pub from: NodeKind,
    pub to: NodeKind,
    /// Values of this language that the replacement drops.
    pub discarded: Vec<DiscardedValue>,
    #[serde(skip)]
    pub replacement: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Remove,
    Restructure,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "add"),
            ChangeKind::Remove => write!(f, "remove"),
            ChangeKind::Restructure => write!(f, "restructure"),
        }
    }
}

/// A change the plan refused to make, or that failed at apply time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SkippedChange {
    pub key: TranslationKey,
    pub change: ChangeKind,
    pub reason: String,
}

impl SkippedChange {
    fn new(key: &TranslationKey, change: ChangeKind, reason: impl Into<String>) -> Self {
        Self {
            key: key.clone(),
            change,
            reason: reason.into(),
        }
    }
}

/// Changes for one language, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguagePlan {
    pub restructures: Vec<Restructure>,
    pub removals: Vec<TranslationKey>,
    pub additions: Vec<Addition>,
    pub skipped: Vec<SkippedChange>,
}

impl LanguagePlan {
    /// No change to make. Skipped entries don't count.
    pub fn is_empty(&self) -> bool {
        self.restructures.is_empty() && self.removals.is_empty() && self.additions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub languages: BTreeMap<String, LanguagePlan>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.languages.values().all(LanguagePlan::is_empty)
    }

    pub fn get(&self, language: &str) -> Option<&LanguagePlan> {
        self.languages.get(language)
    }

    pub fn total_additions(&self) -> usize {
        self.languages.values().map(|p| p.additions.len()).sum()
    }

    pub fn total_removals(&self) -> usize {
        self.languages.values().map(|p| p.removals.len()).sum()
    }

    pub fn total_restructures(&self) -> usize {
        self.languages.values().map(|p| p.restructures.len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.languages.values().map(|p| p.skipped.len()).sum()
    }
}

/// Build the change plan for every analyzed language.
///
/// The reference language is planned first. Other languages take their
/// shape from the reference as it will look once its own plan is applied,
/// so a restructure never copies a reference key that is being removed.
pub fn plan(analysis: &Analysis, languages: &LanguageSet, policy: &SyncPolicy) -> SyncPlan {
    let reference = languages.reference();
    let mut target = languages.reference_tree().cloned().unwrap_or_default();
    let dynamic_keys = analysis.unbounded_dynamic;

    let mut plan = SyncPlan::default();
    if let (Some(tree), Some(diff)) = (languages.get(reference), analysis.diff(reference)) {
        let context = PlanContext {
            language: reference,
            reference: tree,
            policy,
        };
        let reference_plan = context.plan_language(tree, diff, analysis, dynamic_keys);
        apply_language(reference, &mut target, &reference_plan, &mut LanguageOutcome::default());
        log_plan(reference, &reference_plan);
        plan.languages.insert(reference.to_string(), reference_plan);
    }

    for (language, diff) in &analysis.languages {
        if language == reference {
            continue;
        }
        let Some(tree) = languages.get(language) else {
            continue;
        };
        let context = PlanContext {
            language,
            reference: &target,
            policy,
        };
        let language_plan = context.plan_language(tree, diff, analysis, dynamic_keys);
        log_plan(language, &language_plan);
        plan.languages.insert(language.clone(), language_plan);
    }
    plan
}

fn log_plan(language: &str, plan: &LanguagePlan) {
    tracing::debug!(
        language,
        additions = plan.additions.len(),
        removals = plan.removals.len(),
        restructures = plan.restructures.len(),
        skipped = plan.skipped.len(),
        "planned language"
    );
}

struct PlanContext<'a> {
    language: &'a str,
    reference: &'a TranslationTree,
    policy: &'a SyncPolicy,
}

impl PlanContext<'_> {
    fn plan_language(
        &self,
        tree: &TranslationTree,
        diff: &LanguageDiff,
        analysis: &Analysis,
        dynamic_keys: usize,
    ) -> LanguagePlan {
        let mut out = LanguagePlan::default();
        let mut scratch = tree.clone();
        let mut orphans = diff.orphan.clone();

        // 1. Shape fixes
        for mismatch in &diff.mismatched {
            if self.reference.get(&mismatch.key).kind().is_none() {
                // The reference drops this path; what sits under it here is orphaned
                orphans.extend(
                    diff.shadowed_orphans
                        .iter()
                        .filter(|key| mismatch.key.overlaps(key))
                        .cloned(),
                );
                continue;
            }
            match self.policy.fix_mismatches {
                MismatchPolicy::Skip => out.skipped.push(SkippedChange::new(
                    &mismatch.key,
                    ChangeKind::Restructure,
                    format!(
                        "{} in this language, {} in the reference",
                        mismatch.found, mismatch.reference
                    ),
                )),
                MismatchPolicy::ReferenceWins => {
                    let restructure = self.restructure(tree, &mismatch.key, mismatch.found);
                    match scratch.replace(&restructure.key, restructure.replacement.clone()) {
                        Ok(_) => out.restructures.push(restructure),
                        Err(e) => out.skipped.push(SkippedChange::new(
                            &mismatch.key,
                            ChangeKind::Restructure,
                            e.to_string(),
                        )),
                    }
                }
            }
        }

        // 2. Removals
        if self.policy.remove_orphans {
            if dynamic_keys > 0 && !self.policy.prune_with_dynamic_keys {
                let reason = format!(
                    "{} dynamic key reference(s) could use this key",
                    dynamic_keys
                );
                out.skipped.extend(
                    orphans
                        .iter()
                        .map(|key| SkippedChange::new(key, ChangeKind::Remove, reason.clone())),
                );
            } else {
                for key in &orphans {
                    if scratch.delete(key).is_some() {
                        out.removals.push(key.clone());
                    }
                }
            }
        }

        // 3. Additions, against the tree as it looks after 1 and 2
        if self.policy.add_missing {
            let unfixed_mismatches = self.policy.fix_mismatches == MismatchPolicy::Skip;
            for key in analysis.used.keys() {
                if has_leaf_or_plural(key, &scratch, &analysis.plural_suffixes) {
                    continue;
                }
                if unfixed_mismatches && diff.is_covered_by_mismatch(key) {
                    continue;
                }
                if let Some(reason) = self.conflicts_with_reference(key) {
                    out.skipped.push(SkippedChange::new(key, ChangeKind::Add, reason));
                    continue;
                }
                let value = self.placeholder(key);
                match scratch.set(key, value.clone()) {
                    Ok(_) => out.additions.push(Addition {
                        key: key.clone(),
                        value,
                    }),
                    Err(e) => out.skipped.push(SkippedChange::new(key, ChangeKind::Add, e.to_string())),
                }
            }
        }

        out.restructures.sort_by(|a, b| a.key.cmp(&b.key));
        out.removals.sort();
        out.additions.sort_by(|a, b| a.key.cmp(&b.key));
        out.skipped.sort();
        out
    }

    fn restructure(&self, tree: &TranslationTree, key: &TranslationKey, found: NodeKind) -> Restructure {
        let discarded = match tree.get(key) {
            Lookup::Leaf(value) => vec![DiscardedValue {
                key: key.clone(),
                value: value.to_string(),
            }],
            Lookup::Namespace(child) => child
                .leaves()
                .map(|(sub, value)| DiscardedValue {
                    key: join_keys(key, &sub),
                    value: value.to_string(),
                })
                .collect(),
            Lookup::Absent => Vec::new(),
        };

        let (to, replacement) = match self.reference.get(key) {
            Lookup::Namespace(reference_child) => {
                let mut filled = TranslationTree::new();
                for (sub, _) in reference_child.leaves() {
                    let full = join_keys(key, &sub);
                    // Fresh tree built from another tree's leaves: no conflicts possible
                    let _ = filled.set(&sub, self.placeholder(&full));
                }
                (NodeKind::Namespace, Node::Namespace(filled))
            }
            _ => (NodeKind::Leaf, Node::Leaf(self.placeholder(key))),
        };

        Restructure {
            key: key.clone(),
            from: found,
            to,
            discarded,
            replacement,
        }
    }

    /// An addition must not create a new shape mismatch with the reference.
    fn conflicts_with_reference(&self, key: &TranslationKey) -> Option<String> {
        if let Lookup::Namespace(_) = self.reference.get(key) {
            return Some("a namespace in the reference language".to_string());
        }
        let mut prefix = key.parent();
        while let Some(current) = prefix {
            if self.reference.get(&current).is_leaf() {
                return Some(format!("'{}' is a leaf in the reference language", current));
            }
            prefix = current.parent();
        }
        None
    }

    fn placeholder(&self, key: &TranslationKey) -> String {
        let display = key.join(&self.policy.separator);
        match &self.policy.placeholder {
            Placeholder::Key => display,
            Placeholder::Empty => String::new(),
            Placeholder::Reference => match self.reference.get(key) {
                Lookup::Leaf(value) => value.to_string(),
                _ => display,
            },
            Placeholder::Template(template) => template
                .replace("{key}", &display)
                .replace("{lang}", self.language),
        }
    }
}

fn join_keys(prefix: &TranslationKey, suffix: &TranslationKey) -> TranslationKey {
    suffix
        .segments()
        .iter()
        .fold(prefix.clone(), |key, segment| key.child(segment.clone()))
}

/// Result of applying a plan to one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageOutcome {
    pub added: usize,
    pub removed: usize,
    pub restructured: usize,
    pub discarded: Vec<DiscardedValue>,
    pub conflicts: Vec<SkippedChange>,
}

impl LanguageOutcome {
    pub fn changed(&self) -> bool {
        self.added + self.removed + self.restructured > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub languages: BTreeMap<String, LanguageOutcome>,
}

impl ApplyOutcome {
    /// Languages whose tree was modified, in code order.
    pub fn changed_languages(&self) -> Vec<&str> {
        self.languages
            .iter()
            .filter(|(_, outcome)| outcome.changed())
            .map(|(language, _)| language.as_str())
            .collect()
    }

    pub fn total_conflicts(&self) -> usize {
        self.languages.values().map(|o| o.conflicts.len()).sum()
    }
}

/// Apply `plan` tree by tree. A change that no longer fits the tree is
/// recorded as a conflict for that language; other changes still apply.
pub fn apply(languages: &mut LanguageSet, plan: &SyncPlan) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for (language, language_plan) in &plan.languages {
        if language_plan.is_empty() {
            continue;
        }
        let mut result = LanguageOutcome::default();
        match languages.get_mut(language) {
            Some(tree) => {
                apply_language(language, tree, language_plan, &mut result);
                tracing::debug!(
                    language = %language,
                    added = result.added,
                    removed = result.removed,
                    restructured = result.restructured,
                    conflicts = result.conflicts.len(),
                    "applied plan"
                );
            }
            None => result.conflicts.push(SkippedChange {
                key: TranslationKey::from_tree_path(&[language.as_str()]),
                change: ChangeKind::Add,
                reason: format!("language '{}' is not loaded", language),
            }),
        }
        outcome.languages.insert(language.clone(), result);
    }

    outcome
}

fn apply_language(
    language: &str,
    tree: &mut TranslationTree,
    plan: &LanguagePlan,
    result: &mut LanguageOutcome,
) {
    for restructure in &plan.restructures {
        match tree.replace(&restructure.key, restructure.replacement.clone()) {
            Ok(_) => {
                for discarded in &restructure.discarded {
                    tracing::warn!(
                        language,
                        key = %discarded.key,
                        value = %discarded.value,
                        "discarding value to match reference shape"
                    );
                }
                result.discarded.extend(restructure.discarded.iter().cloned());
                result.restructured += 1;
            }
            Err(e) => result.conflicts.push(SkippedChange::new(
                &restructure.key,
                ChangeKind::Restructure,
                e.to_string(),
            )),
        }
    }

    for key in &plan.removals {
        match tree.delete(key) {
            Some(_) => result.removed += 1,
            None => result
                .conflicts
                .push(SkippedChange::new(key, ChangeKind::Remove, "no leaf at this key")),
        }
    }

    for addition in &plan.additions {
        if tree.get(&addition.key).is_leaf() {
            continue;
        }
        match tree.set(&addition.key, addition.value.clone()) {
            Ok(_) => result.added += 1,
            Err(e) => result.conflicts.push(SkippedChange::new(
                &addition.key,
                ChangeKind::Add,
                e.to_string(),
            )),
        }
    }
}
