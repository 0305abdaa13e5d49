use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, Result};

use super::args::{CommonArgs, OutputFormat};
use crate::{
    config::{Config, load_config},
    core::{
        analyze::{Analysis, analyze},
        report::ReportOptions,
        scan::{IgnoreRules, ScanResult, Scanner, read_sources, walk_source_files},
        store::{LoadedLanguages, load_languages},
    },
    notices::{Notice, SkippedLanguageNotice},
};

/// Settings shared by every command that touches a project.
///
/// Configuration priority (highest to lowest):
/// 1. CLI arguments (e.g., `--reference de`)
/// 2. `.glotsyncrc.json` found from the source root upwards
/// 3. Built-in defaults
///
/// Relative paths in the config file are resolved against the directory
/// holding it.
pub struct Context {
    pub config: Config,
    pub source_root: PathBuf,
    pub messages_root: PathBuf,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let start_dir = common
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let loaded = load_config(&start_dir)?;
        match &loaded.path {
            Some(path) => tracing::debug!(config = %path.display(), "loaded configuration"),
            None => tracing::debug!("no configuration file found, using defaults"),
        }
        let base_dir = loaded.base_dir(&start_dir).to_path_buf();
        let mut config = loaded.config;

        if let Some(reference) = &common.reference {
            config.primary_locale = reference.clone();
        }
        if let Some(limit) = common.limit {
            config.report_limit = limit;
        }
        config.validate()?;

        let source_root = match &common.source_root {
            Some(root) => root.clone(),
            None => resolve(&base_dir, &config.source_root),
        };
        let messages_root = match &common.messages_root {
            Some(root) => root.clone(),
            None => resolve(&base_dir, &config.messages_root),
        };

        Ok(Self {
            config,
            source_root,
            messages_root,
            format: common.format,
        })
    }

    pub fn reference(&self) -> &str {
        &self.config.primary_locale
    }

    pub fn report_options(&self) -> ReportOptions {
        self.config.report_options()
    }

    /// Walk, read and scan the source files.
    pub fn scan(&self) -> Result<ScanResult> {
        let rules = IgnoreRules::new(&self.config.ignores, self.config.ignore_test_files);
        let walk = walk_source_files(
            &self.source_root,
            &self.config.includes,
            &rules,
            &self.config.extensions,
        );
        if walk.skipped_count > 0 {
            tracing::warn!(count = walk.skipped_count, "paths skipped due to access errors");
        }

        let (sources, read_warnings) = read_sources(&self.source_root, &walk.files);
        let scanner = Scanner::new(&self.config.scan_options())?;
        let mut result = scanner.scan(&sources, |_| false);

        result.warnings.extend(read_warnings);
        result.warnings.sort();
        Ok(result)
    }

    /// Load every language file. Languages that fail to load become notices.
    pub fn load_languages(&self) -> Result<(LoadedLanguages, Vec<Notice>)> {
        let loaded = load_languages(&self.messages_root, self.reference(), &self.config.key_separator)
            .with_context(|| {
                format!("Failed to load translations from {}", self.messages_root.display())
            })?;
        let notices = loaded
            .skipped
            .iter()
            .map(|(language, error)| {
                Notice::from(SkippedLanguageNotice {
                    language: language.clone(),
                    error: error.to_string(),
                })
            })
            .collect();
        Ok((loaded, notices))
    }

    pub fn analyze(&self, scan: &ScanResult, loaded: &LoadedLanguages) -> Result<Analysis> {
        Ok(analyze(scan, &loaded.set, &self.config.analyze_options())?)
    }
}

fn resolve(base_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let is_cur_dir = base_dir.components().all(|c| matches!(c, Component::CurDir));
    if is_cur_dir {
        path.to_path_buf()
    } else {
        let rel = path.strip_prefix(Path::new(".")).unwrap_or(path);
        base_dir.join(rel)
    }
}
