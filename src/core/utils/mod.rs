//! Utility helpers shared by the engine.
//!
//! - `glob_matcher`: segment-wise key patterns (`errors.*`, `meta.**`)
//! - `line_index`: byte offset → line/column lookups

pub mod glob_matcher;
pub mod line_index;

pub use glob_matcher::*;
pub use line_index::*;
