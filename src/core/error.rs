//! Error types of the synchronization engine.
//!
//! The engine reports typed errors; the CLI wraps them in `anyhow` with
//! context naming the file or language involved.

use std::path::PathBuf;

use thiserror::Error;

/// A translation key could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("translation key is empty")]
    Empty,
    #[error("translation key '{key}' contains an empty segment")]
    EmptySegment { key: String },
}

/// A tree mutation would break the leaf-xor-namespace invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// `at` is a leaf where a namespace is required, or a namespace where a
    /// leaf is required.
    #[error("shape conflict for '{key}': '{at}' is a {found}")]
    ShapeConflict {
        key: String,
        at: String,
        found: &'static str,
    },
    #[error(transparent)]
    Key(#[from] KeyError),
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("reference language '{reference}' is not loaded (available: {available})")]
    MissingReference {
        reference: String,
        available: String,
    },
}

/// Failure to read or write language files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("messages directory '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{}' must contain a JSON object at the top level", .0.display())]
    NotAnObject(PathBuf),
    #[error("'{}' has conflicting keys: {source}", .path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: TreeError,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("language '{language}' is stored as a directory, so top-level key '{key}' must be a namespace")]
    TopLevelLeaf { language: String, key: String },
    #[error("failed to serialize language '{language}': {source}")]
    Serialize {
        language: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to read or build an export file.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },
    #[error("exchange file has no 'key' column")]
    MissingKeyColumn,
    #[error("invalid JSON exchange file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("language '{language}': {source}")]
    Tree {
        language: String,
        #[source]
        source: TreeError,
    },
    #[error("unsupported exchange format '{0}' (expected csv or json)")]
    UnknownFormat(String),
}
