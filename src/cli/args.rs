//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: List translation keys used in source files
//! - `check`: Report missing, orphan and mismatched keys
//! - `sync`: Reconcile language files with the keys in use
//! - `export`: Write all languages to one CSV or flat JSON file
//! - `import`: Read a CSV or flat JSON file back into the language files
//! - `init`: Write a default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::config::PlaceholderKind;
use crate::core::exchange::Format;
use crate::core::sync::MismatchPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|common| common.verbose)
    }

    pub fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Scan(cmd)) => Some(&cmd.common),
            Some(Command::Check(cmd)) => Some(&cmd.common),
            Some(Command::Sync(cmd)) => Some(&cmd.common),
            Some(Command::Export(cmd)) => Some(&cmd.common),
            Some(Command::Import(cmd)) => Some(&cmd.common),
            Some(Command::Init(_)) | None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Messages directory path (overrides config file)
    #[arg(long)]
    pub messages_root: Option<PathBuf>,

    /// Reference language (overrides config file)
    #[arg(long, alias = "primary-locale")]
    pub reference: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum entries per list in text output (0 shows everything)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Also fail when orphan keys are found
    #[arg(long)]
    pub fail_on_orphans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FixMismatches {
    ReferenceWins,
    Skip,
}

impl From<FixMismatches> for MismatchPolicy {
    fn from(value: FixMismatches) -> Self {
        match value {
            FixMismatches::ReferenceWins => MismatchPolicy::ReferenceWins,
            FixMismatches::Skip => MismatchPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaceholderArg {
    Key,
    Empty,
    Reference,
}

impl From<PlaceholderArg> for PlaceholderKind {
    fn from(value: PlaceholderArg) -> Self {
        match value {
            PlaceholderArg::Key => PlaceholderKind::Key,
            PlaceholderArg::Empty => PlaceholderKind::Empty,
            PlaceholderArg::Reference => PlaceholderKind::Reference,
        }
    }
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Do not add keys that are used in code but missing
    #[arg(long)]
    pub no_add_missing: bool,

    /// Remove keys that are never used in code
    #[arg(long)]
    pub remove_orphans: bool,

    /// How to handle leaf/namespace mismatches with the reference language
    #[arg(long, value_enum)]
    pub fix_mismatches: Option<FixMismatches>,

    /// Value for newly added keys
    #[arg(long, value_enum)]
    pub placeholder: Option<PlaceholderArg>,

    /// Custom value for newly added keys; `{key}` and `{lang}` are substituted
    #[arg(long)]
    pub placeholder_template: Option<String>,

    /// Remove orphans even when some translation calls use dynamic keys
    #[arg(long)]
    pub prune_with_dynamic_keys: bool,

    /// Show the plan without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Csv,
    Json,
}

impl From<FileFormat> for Format {
    fn from(value: FileFormat) -> Self {
        match value {
            FileFormat::Csv => Format::Csv,
            FileFormat::Json => Format::Json,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exchange format (defaults to the output file extension, then csv)
    #[arg(long, value_enum)]
    pub file_format: Option<FileFormat>,
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CSV or flat JSON file to import
    pub input: PathBuf,

    /// Exchange format (defaults to the input file extension)
    #[arg(long, value_enum)]
    pub file_format: Option<FileFormat>,

    /// Replace each imported language instead of merging into it
    #[arg(long)]
    pub replace: bool,

    /// Show what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to create the configuration file in
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List translation keys used in source files
    Scan(ScanCommand),
    /// Report missing, orphan and mismatched translation keys
    Check(CheckCommand),
    /// Add missing keys and fix language files according to the sync policy
    Sync(SyncCommand),
    /// Export all languages to a CSV or flat JSON file
    Export(ExportCommand),
    /// Import translations from a CSV or flat JSON file
    Import(ImportCommand),
    /// Initialize a new .glotsyncrc.json configuration file
    Init(InitCommand),
}
