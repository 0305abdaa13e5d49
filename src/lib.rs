//! glotsync - keep i18n translation files in sync with source code
//!
//! glotsync scans source files for translation-key usage, compares the keys
//! with every language's translation tree, and reconciles the trees under a
//! configurable policy. It can also export and import the trees as CSV or
//! flat JSON for bulk editing.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Synchronization engine (scan, analyze, sync, report)
//! - `notices`: Per-item warnings and errors collected during a run

pub mod cli;
pub mod config;
pub mod core;
pub mod notices;
