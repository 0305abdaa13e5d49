use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::super::{
    args::{OutputFormat, ScanCommand},
    context::Context,
    exit_status::ExitStatus,
    report::print_json_to,
};
use crate::core::scan::{ScanResult, SourceLocation};
use crate::notices::{Describe, Notice, sort_notices};

#[derive(Debug, Serialize)]
struct UsedKeyEntry {
    key: String,
    locations: Vec<SourceLocation>,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    files_scanned: usize,
    keys: Vec<UsedKeyEntry>,
    dynamic_prefixes: Vec<String>,
    notices: Vec<Notice>,
}

impl ScanReport {
    fn new(result: &ScanResult, separator: &str) -> Self {
        let mut notices: Vec<Notice> = result.warnings.iter().map(Notice::from).collect();
        notices.extend(result.unresolved.iter().map(Notice::from));
        sort_notices(&mut notices);

        Self {
            files_scanned: result.files_scanned,
            keys: result
                .used
                .records()
                .map(|record| UsedKeyEntry {
                    key: record.key.join(separator),
                    locations: record.locations.iter().cloned().collect(),
                })
                .collect(),
            dynamic_prefixes: result.dynamic_prefixes(),
            notices,
        }
    }

    fn to_text(&self, limit: Option<usize>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scanned {} {}: {} {} used, {} {}",
            self.files_scanned,
            plural(self.files_scanned, "file", "files"),
            self.keys.len(),
            plural(self.keys.len(), "key", "keys"),
            self.notices.len(),
            plural(self.notices.len(), "notice", "notices"),
        );

        if !self.keys.is_empty() {
            let shown = limit.map_or(self.keys.len(), |l| l.min(self.keys.len()));
            let width = self.keys[..shown]
                .iter()
                .map(|k| UnicodeWidthStr::width(k.key.as_str()))
                .max()
                .unwrap_or(0);

            let _ = writeln!(out);
            let _ = writeln!(out, "{}", format!("Keys ({}):", self.keys.len()).bold());
            for entry in &self.keys[..shown] {
                let padding = " ".repeat(width - UnicodeWidthStr::width(entry.key.as_str()));
                let first = entry
                    .locations
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let more = match entry.locations.len() {
                    0 | 1 => String::new(),
                    n => format!(" (+{})", n - 1),
                };
                let _ = writeln!(out, "  {}{}  {}{}", entry.key, padding, first.dimmed(), more);
            }
            if shown < self.keys.len() {
                let _ = writeln!(out, "  \u{2026} and {} more", self.keys.len() - shown);
            }
        }

        if !self.dynamic_prefixes.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Dynamic prefixes:".bold());
            for prefix in &self.dynamic_prefixes {
                let _ = writeln!(out, "  {}*", prefix);
            }
        }

        if !self.notices.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", format!("Notices ({}):", self.notices.len()).bold());
            for notice in &self.notices {
                let label = format!("{}[{}]", notice.severity(), notice.code());
                let _ = writeln!(
                    out,
                    "  {} {}: {}",
                    label.bold().yellow(),
                    notice.subject(),
                    notice.message()
                );
            }
        }
        out
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

pub fn scan(cmd: ScanCommand) -> Result<ExitStatus> {
    let ctx = Context::new(&cmd.common)?;
    let result = ctx.scan()?;
    let report = ScanReport::new(&result, &ctx.config.key_separator);

    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Text => write!(stdout, "{}", report.to_text(ctx.report_options().limit))?,
        OutputFormat::Json => print_json_to(&report, &mut stdout)?,
    }

    Ok(ExitStatus::Success)
}
