use std::{
    fmt::Write as _,
    fs,
    io::{self, Write},
};

use anyhow::{Context as _, Result, anyhow};
use colored::Colorize;
use serde::Serialize;

use super::super::{
    args::{ImportCommand, OutputFormat},
    context::Context,
    exit_status::ExitStatus,
    report::{FAILURE_MARK, SUCCESS_MARK, print_json_to},
};
use crate::core::{
    exchange::{Format, ImportMode, ImportOutcome, LanguageImport, import as import_languages, parse},
    store::{SaveOptions, save_languages},
};

#[derive(Debug, Serialize)]
struct WriteFailure {
    language: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    dry_run: bool,
    #[serde(flatten)]
    outcome: ImportOutcome,
    write_failures: Vec<WriteFailure>,
}

impl ImportReport {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for (language, result) in &self.outcome.languages {
            let _ = writeln!(out, "{}", language_line(language, result));
            for conflict in &result.conflicts {
                let _ = writeln!(
                    out,
                    "  {} {}: {}",
                    "conflict".bold().yellow(),
                    conflict.key,
                    conflict.reason
                );
            }
        }
        for failure in &self.write_failures {
            let _ = writeln!(
                out,
                "{} failed to write {}: {}",
                FAILURE_MARK.red(),
                failure.language,
                failure.error
            );
        }

        let changed = self.outcome.changed_languages().count();
        let verb = if self.dry_run { "Would update" } else { "Updated" };
        let _ = writeln!(
            out,
            "{} {} {} language(s)",
            SUCCESS_MARK.green(),
            verb,
            changed
        );
        out
    }
}

fn language_line(language: &str, result: &LanguageImport) -> String {
    let mut line = format!(
        "[{}] {} added, {} updated, {} conflict(s)",
        language,
        result.added,
        result.updated,
        result.conflicts.len()
    );
    if result.created {
        line.push_str(" (new language)");
    }
    line
}

pub fn import(cmd: ImportCommand) -> Result<ExitStatus> {
    let ctx = Context::new(&cmd.common)?;
    let (mut loaded, _) = ctx.load_languages()?;

    let format = cmd
        .file_format
        .map(Format::from)
        .or_else(|| Format::from_path(&cmd.input))
        .ok_or_else(|| {
            anyhow!(
                "Cannot tell the format of {}; pass --file-format csv or --file-format json",
                cmd.input.display()
            )
        })?;
    let content = fs::read_to_string(&cmd.input)
        .with_context(|| format!("Failed to read file: {}", cmd.input.display()))?;
    let separator = ctx.config.key_separator.clone();
    let imported = parse(&content, format, &separator)
        .with_context(|| format!("Failed to import {}", cmd.input.display()))?;

    let mode = if cmd.replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };
    let outcome = import_languages(&mut loaded.set, imported, mode, &separator);

    let write_failures = if cmd.dry_run {
        Vec::new()
    } else {
        let options = SaveOptions {
            sort_keys: ctx.config.sort_keys,
        };
        save_languages(
            &ctx.messages_root,
            &loaded,
            outcome.changed_languages(),
            &options,
        )
        .into_iter()
        .map(|(language, error)| WriteFailure {
            language,
            error: error.to_string(),
        })
        .collect()
    };

    let report = ImportReport {
        dry_run: cmd.dry_run,
        outcome,
        write_failures,
    };
    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Text => write!(stdout, "{}", report.to_text())?,
        OutputFormat::Json => print_json_to(&report, &mut stdout)?,
    }

    if report.write_failures.is_empty() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
