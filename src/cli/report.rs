//! Printing reports to the terminal.
//!
//! The engine renders plain text; this module adds colour and handles the
//! JSON output format.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde::Serialize;

use super::args::OutputFormat;
use crate::core::report::{Report, Style};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Terminal colours. `colored` turns itself off for `NO_COLOR` and pipes.
pub struct Colored;

impl Style for Colored {
    fn heading(&self, text: &str) -> String {
        text.bold().to_string()
    }

    fn error(&self, text: &str) -> String {
        text.bold().red().to_string()
    }

    fn warning(&self, text: &str) -> String {
        text.bold().yellow().to_string()
    }

    fn success(&self, text: &str) -> String {
        text.green().to_string()
    }

    fn dim(&self, text: &str) -> String {
        text.dimmed().to_string()
    }
}

/// Print a report in the requested format to stdout.
pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    print_report_to(report, format, &mut io::stdout().lock())
}

pub fn print_report_to<W: Write>(report: &Report, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let mut text = String::new();
            report
                .write_styled(&mut text, &Colored)
                .context("Failed to render report")?;
            write!(writer, "{}", text)?;
        }
        OutputFormat::Json => print_json_to(report, writer)?,
    }
    Ok(())
}

pub fn print_json_to<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

/// Print a one-line success message.
pub fn print_success_to<W: Write>(message: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} {}", SUCCESS_MARK.green(), message.green())
}

/// Print a one-line failure message.
pub fn print_failure_to<W: Write>(message: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} {}", FAILURE_MARK.red(), message.red())
}
