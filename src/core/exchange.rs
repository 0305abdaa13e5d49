//! Flat export and import of language trees.
//!
//! Two formats are supported:
//! - CSV with a `key` column followed by one column per language
//! - flat JSON, `{ "<lang>": { "<key>": "<value>" } }`
//!
//! In CSV an unquoted empty cell means the key is absent in that language,
//! while a quoted empty cell (`""`) is an empty string.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::ExchangeError;
use crate::core::key::TranslationKey;
use crate::core::language::LanguageSet;
use crate::core::tree::{Lookup, TranslationTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for Format {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(ExchangeError::UnknownFormat(other.to_string())),
        }
    }
}

// ============================================================
// Export
// ============================================================

/// Leaf keys of every language: reference keys in tree order first, then
/// keys only other languages have, in the order they are met.
fn row_keys(set: &LanguageSet) -> Vec<TranslationKey> {
    let mut keys: IndexMap<TranslationKey, ()> = IndexMap::new();
    for language in set.languages_reference_first() {
        if let Some(tree) = set.get(language) {
            for (key, _) in tree.leaves() {
                keys.entry(key).or_insert(());
            }
        }
    }
    keys.into_keys().collect()
}

pub fn export(set: &LanguageSet, format: Format, separator: &str) -> Result<String, ExchangeError> {
    match format {
        Format::Csv => Ok(export_csv(set, separator)),
        Format::Json => export_json(set, separator),
    }
}

pub fn export_csv(set: &LanguageSet, separator: &str) -> String {
    let languages = set.languages_reference_first();
    let mut out = String::new();

    let mut header = vec![csv_field("key")];
    header.extend(languages.iter().map(|lang| csv_field(lang)));
    out.push_str(&header.join(","));
    out.push('\n');

    for key in row_keys(set) {
        let mut row = vec![csv_field(&key.join(separator))];
        for language in &languages {
            let cell = match set.get(language).map(|tree| tree.get(&key)) {
                Some(Lookup::Leaf(value)) => csv_field(value),
                _ => String::new(),
            };
            row.push(cell);
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote when needed. An empty value is always quoted so it reads back as
/// present.
fn csv_field(value: &str) -> String {
    if value.is_empty() || value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn export_json(set: &LanguageSet, separator: &str) -> Result<String, ExchangeError> {
    let mut root = Map::new();
    for language in set.languages_reference_first() {
        let Some(tree) = set.get(language) else {
            continue;
        };
        let flat: Map<String, Value> = tree
            .leaves()
            .map(|(key, value)| (key.join(separator), Value::String(value.to_string())))
            .collect();
        root.insert(language.to_string(), Value::Object(flat));
    }
    Ok(format!("{}\n", serde_json::to_string_pretty(&Value::Object(root))?))
}

// ============================================================
// Import
// ============================================================

/// Trees read from an exchange file, by language.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Imported {
    pub languages: BTreeMap<String, TranslationTree>,
}

pub fn parse(content: &str, format: Format, separator: &str) -> Result<Imported, ExchangeError> {
    match format {
        Format::Csv => parse_csv(content, separator),
        Format::Json => parse_json(content, separator),
    }
}

pub fn parse_csv(content: &str, separator: &str) -> Result<Imported, ExchangeError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = read_records(content)?.into_iter();
    let Some((_, header)) = records.next() else {
        return Err(ExchangeError::MissingKeyColumn);
    };
    match header.first() {
        Some(Some(name)) if name.trim() == "key" => {}
        _ => return Err(ExchangeError::MissingKeyColumn),
    }
    let mut languages = Vec::with_capacity(header.len() - 1);
    for (index, cell) in header.iter().enumerate().skip(1) {
        match cell.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() => languages.push(lang.to_string()),
            _ => {
                return Err(ExchangeError::Csv {
                    line: 1,
                    message: format!("column {} has no language code", index + 1),
                });
            }
        }
    }

    let mut imported = Imported::default();
    for language in &languages {
        imported.languages.insert(language.clone(), TranslationTree::new());
    }

    for (line, record) in records {
        if record.len() == 1 && record[0].is_none() {
            continue;
        }
        if record.len() != header.len() {
            return Err(ExchangeError::Csv {
                line,
                message: format!("expected {} fields, found {}", header.len(), record.len()),
            });
        }
        let raw_key = record[0].as_deref().unwrap_or_default();
        let key = TranslationKey::parse(raw_key, separator).map_err(|e| ExchangeError::Csv {
            line,
            message: e.to_string(),
        })?;
        for (language, cell) in languages.iter().zip(&record[1..]) {
            let Some(value) = cell else {
                continue;
            };
            if let Some(tree) = imported.languages.get_mut(language) {
                tree.set(&key, value.as_str()).map_err(|source| ExchangeError::Tree {
                    language: language.clone(),
                    source,
                })?;
            }
        }
    }

    Ok(imported)
}

/// One CSV record with the line it starts on. `None` is an unquoted empty
/// field.
type Record = (usize, Vec<Option<String>>);

fn read_records(content: &str) -> Result<Vec<Record>, ExchangeError> {
    let mut records = Vec::new();
    let mut chars = content.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = Vec::new();
        loop {
            let mut field = String::new();
            let mut quoted = false;
            if chars.peek() == Some(&'"') {
                quoted = true;
                chars.next();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            field.push(c);
                        }
                        None => {
                            return Err(ExchangeError::Csv {
                                line: start_line,
                                message: "unterminated quoted field".to_string(),
                            });
                        }
                    }
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if matches!(c, ',' | '\n' | '\r') {
                        break;
                    }
                    if c == '"' {
                        return Err(ExchangeError::Csv {
                            line,
                            message: "unexpected quote in unquoted field".to_string(),
                        });
                    }
                    field.push(c);
                    chars.next();
                }
            }

            fields.push(if quoted || !field.is_empty() {
                Some(field)
            } else {
                None
            });

            match chars.next() {
                Some(',') => continue,
                Some('\r') => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    line += 1;
                    break;
                }
                Some('\n') => {
                    line += 1;
                    break;
                }
                None => break,
                Some(c) => {
                    return Err(ExchangeError::Csv {
                        line,
                        message: format!("unexpected '{}' after quoted field", c),
                    });
                }
            }
        }
        records.push((start_line, fields));
    }

    Ok(records)
}

pub fn parse_json(content: &str, separator: &str) -> Result<Imported, ExchangeError> {
    let raw: IndexMap<String, IndexMap<String, String>> = serde_json::from_str(content)?;
    let mut imported = Imported::default();
    for (language, entries) in raw {
        let mut tree = TranslationTree::new();
        for (raw_key, value) in entries {
            let key = TranslationKey::parse(&raw_key, separator).map_err(|e| ExchangeError::Tree {
                language: language.clone(),
                source: e.into(),
            })?;
            tree.set(&key, value).map_err(|source| ExchangeError::Tree {
                language: language.clone(),
                source,
            })?;
        }
        imported.languages.insert(language, tree);
    }
    Ok(imported)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Set imported leaves on top of the existing trees.
    #[default]
    Merge,
    /// Swap each imported language's tree for the imported one.
    Replace,
}

/// An imported key that clashes with the existing tree's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportConflict {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LanguageImport {
    pub created: bool,
    pub added: usize,
    pub updated: usize,
    pub conflicts: Vec<ImportConflict>,
}

impl LanguageImport {
    pub fn changed(&self) -> bool {
        self.created || self.added > 0 || self.updated > 0
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ImportOutcome {
    pub languages: BTreeMap<String, LanguageImport>,
}

impl ImportOutcome {
    pub fn changed_languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .filter(|(_, outcome)| outcome.changed())
            .map(|(lang, _)| lang.as_str())
    }
}

/// Bring imported trees into `set`.
pub fn import(set: &mut LanguageSet, imported: Imported, mode: ImportMode, separator: &str) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for (language, incoming) in imported.languages {
        let mut report = LanguageImport::default();

        let Some(existing) = set.get_mut(&language) else {
            report.created = true;
            report.added = incoming.leaf_count();
            tracing::debug!(language = %language, leaves = report.added, "new language from import");
            set.insert(language.clone(), incoming);
            outcome.languages.insert(language, report);
            continue;
        };

        match mode {
            ImportMode::Replace => {
                if *existing != incoming {
                    report.updated = incoming.leaf_count();
                    *existing = incoming;
                }
            }
            ImportMode::Merge => {
                for (key, value) in incoming.leaves() {
                    match existing.set(&key, value) {
                        Ok(None) => report.added += 1,
                        Ok(Some(previous)) if previous != value => report.updated += 1,
                        Ok(Some(_)) => {}
                        Err(e) => {
                            tracing::warn!(language = %language, key = %key, error = %e, "import conflict");
                            report.conflicts.push(ImportConflict {
                                key: key.join(separator),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        outcome.languages.insert(language, report);
    }

    outcome
}
