use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{
    analyze::{AnalyzeOptions, DEFAULT_PLURAL_SUFFIXES},
    key::DEFAULT_SEPARATOR,
    report::ReportOptions,
    scan::{DEFAULT_FUNCTIONS, ScanOptions},
    sync::{MismatchPolicy, Placeholder, SyncPolicy},
    utils::KeyPattern,
};

pub const CONFIG_FILE_NAME: &str = ".glotsyncrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &["**/*.test.*", "**/*.spec.*", "**/__tests__/**"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_messages_root", alias = "messagesDir")]
    pub messages_root: String,
    #[serde(default = "default_primary_locale", alias = "referenceLanguage")]
    pub primary_locale: String,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_test_files: bool,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_functions")]
    pub functions: Vec<String>,
    #[serde(default = "default_key_separator")]
    pub key_separator: String,
    #[serde(default = "default_plural_suffixes")]
    pub plural_suffixes: Vec<String>,
    #[serde(default)]
    pub reserved_keys: Vec<String>,
    #[serde(default = "default_true")]
    pub protect_dynamic_prefixes: bool,
    #[serde(default)]
    pub fail_on_orphans: bool,
    /// Entries shown per list in text reports; 0 shows everything.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,
    #[serde(default)]
    pub sort_keys: bool,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderKind {
    #[default]
    Key,
    Empty,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default = "default_true")]
    pub add_missing: bool,
    #[serde(default)]
    pub remove_orphans: bool,
    #[serde(default)]
    pub fix_mismatches: MismatchPolicy,
    #[serde(default)]
    pub placeholder: PlaceholderKind,
    /// Overrides `placeholder`; `{key}` and `{lang}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_template: Option<String>,
    #[serde(default)]
    pub prune_with_dynamic_keys: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            add_missing: true,
            remove_orphans: false,
            fix_mismatches: MismatchPolicy::default(),
            placeholder: PlaceholderKind::default(),
            placeholder_template: None,
            prune_with_dynamic_keys: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_messages_root() -> String {
    "./messages".to_string()
}

fn default_primary_locale() -> String {
    "en".to_string()
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**", "**/build/**"]
        .map(String::from)
        .to_vec()
}

fn default_extensions() -> Vec<String> {
    [
        "js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts", "vue", "svelte", "html",
    ]
    .map(String::from)
    .to_vec()
}

fn default_functions() -> Vec<String> {
    DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_key_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_plural_suffixes() -> Vec<String> {
    DEFAULT_PLURAL_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_report_limit() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            messages_root: default_messages_root(),
            primary_locale: default_primary_locale(),
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: true,
            extensions: default_extensions(),
            functions: default_functions(),
            key_separator: default_key_separator(),
            plural_suffixes: default_plural_suffixes(),
            reserved_keys: Vec::new(),
            protect_dynamic_prefixes: true,
            fail_on_orphans: false,
            report_limit: default_report_limit(),
            sort_keys: false,
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal paths, so `app/[locale]` stays valid
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.functions.is_empty() {
            bail!("'functions' must name at least one translation function");
        }
        if let Some(name) = self.functions.iter().find(|f| f.trim().is_empty()) {
            bail!("Invalid function name in 'functions': \"{}\"", name);
        }

        if self.key_separator.chars().any(char::is_whitespace) {
            bail!(
                "Invalid 'keySeparator': \"{}\" (must not contain whitespace)",
                self.key_separator
            );
        }

        if self.primary_locale.trim().is_empty() {
            bail!("'primaryLocale' must not be empty");
        }

        if self.plural_suffixes.iter().any(String::is_empty) {
            bail!("'pluralSuffixes' must not contain empty entries");
        }

        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            functions: self.functions.clone(),
            separator: self.key_separator.clone(),
        }
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            plural_suffixes: self.plural_suffixes.clone(),
            reserved_keys: self
                .reserved_keys
                .iter()
                .map(|p| KeyPattern::new(p, &self.key_separator))
                .collect(),
            protect_dynamic_prefixes: self.protect_dynamic_prefixes,
            separator: self.key_separator.clone(),
        }
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        let placeholder = match (&self.sync.placeholder_template, self.sync.placeholder) {
            (Some(template), _) => Placeholder::Template(template.clone()),
            (None, PlaceholderKind::Key) => Placeholder::Key,
            (None, PlaceholderKind::Empty) => Placeholder::Empty,
            (None, PlaceholderKind::Reference) => Placeholder::Reference,
        };
        SyncPolicy {
            add_missing: self.sync.add_missing,
            remove_orphans: self.sync.remove_orphans,
            fix_mismatches: self.sync.fix_mismatches,
            placeholder,
            prune_with_dynamic_keys: self.sync.prune_with_dynamic_keys,
            separator: self.key_separator.clone(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            limit: (self.report_limit > 0).then_some(self.report_limit),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    let content =
        serde_json::to_string_pretty(&config).context("Failed to generate default config.")?;
    Ok(format!("{}\n", content))
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the config came from; `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }

    /// Directory that relative paths in the config are resolved against.
    pub fn base_dir<'a>(&'a self, start_dir: &'a Path) -> &'a Path {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(start_dir)
    }
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
