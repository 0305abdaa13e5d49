//! Translation synchronization engine.
//!
//! Pipeline: [`scan`] finds used keys, [`analyze`] compares them with every
//! language tree, [`sync`] plans and applies fixes, [`report`] renders the
//! result. [`store`] and [`exchange`] move trees to and from disk.

pub mod analyze;
pub mod error;
pub mod exchange;
pub mod key;
pub mod language;
pub mod report;
pub mod scan;
pub mod store;
pub mod sync;
pub mod tree;
pub mod utils;

pub use analyze::{Analysis, AnalyzeOptions, LanguageDiff, ShapeMismatch, analyze};
pub use error::{AnalyzeError, ExchangeError, KeyError, StoreError, TreeError};
pub use key::TranslationKey;
pub use language::LanguageSet;
pub use report::{Report, ReportOptions, render};
pub use scan::{ScanOptions, ScanResult, Scanner, UsedKeys};
pub use sync::{ApplyOutcome, SyncPlan, SyncPolicy, apply, plan};
pub use tree::{Lookup, Node, NodeKind, TranslationTree};
