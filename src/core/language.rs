//! The set of language trees being compared.

use std::collections::BTreeMap;

use crate::core::tree::TranslationTree;

/// Language code → tree, with one language designated as the reference
/// (the source of truth for key shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    reference: String,
    trees: BTreeMap<String, TranslationTree>,
}

impl LanguageSet {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            trees: BTreeMap::new(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn reference_tree(&self) -> Option<&TranslationTree> {
        self.trees.get(&self.reference)
    }

    pub fn insert(&mut self, language: impl Into<String>, tree: TranslationTree) -> Option<TranslationTree> {
        self.trees.insert(language.into(), tree)
    }

    pub fn get(&self, language: &str) -> Option<&TranslationTree> {
        self.trees.get(language)
    }

    pub fn get_mut(&mut self, language: &str) -> Option<&mut TranslationTree> {
        self.trees.get_mut(language)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.trees.contains_key(language)
    }

    /// Language codes in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Reference language first, the rest sorted.
    pub fn languages_reference_first(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.trees.len());
        if self.contains(&self.reference) {
            out.push(&self.reference);
        }
        out.extend(self.languages().filter(|lang| *lang != self.reference));
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationTree)> {
        self.trees.iter().map(|(lang, tree)| (lang.as_str(), tree))
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
