//! Translation key paths.
//!
//! A [`TranslationKey`] is a non-empty sequence of non-empty segments
//! (`["home", "title"]` for `home.title`). Keys are case-sensitive and
//! ordered segment by segment, which keeps every key list in the crate
//! sorted the same way.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::error::KeyError;

/// Default separator between key segments.
pub const DEFAULT_SEPARATOR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TranslationKey {
    segments: Vec<String>,
}

impl TranslationKey {
    /// Parse a key using the given separator.
    ///
    /// Fails for the empty string and for keys with empty segments
    /// (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(raw: &str, separator: &str) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        if separator.is_empty() {
            return Ok(Self {
                segments: vec![raw.to_string()],
            });
        }
        let segments: Vec<String> = raw.split(separator).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(KeyError::EmptySegment {
                key: raw.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Parse with the default `.` separator.
    pub fn dotted(raw: &str) -> Result<Self, KeyError> {
        Self::parse(raw, DEFAULT_SEPARATOR)
    }

    /// Build a key from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(KeyError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(KeyError::EmptySegment {
                key: segments.join(DEFAULT_SEPARATOR),
            });
        }
        Ok(Self { segments })
    }

    /// Key for a path walked inside a tree, whose entry names are never empty.
    pub(crate) fn from_tree_path(path: &[&str]) -> Self {
        Self {
            segments: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Keys always have at least one segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The last segment (`title` for `home.title`).
    pub fn leaf_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The key one level up, or `None` for a top-level key.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// A new key with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// A sibling key whose last segment is replaced (`items` → `items_one`).
    pub fn with_leaf_name(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = name.into();
        }
        Self { segments }
    }

    /// True if `self` equals `other` or lies inside it (`nav.home` is within `nav`).
    pub fn starts_with(&self, other: &TranslationKey) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// True if one of the two keys is a prefix of (or equal to) the other.
    pub fn overlaps(&self, other: &TranslationKey) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Join segments with an explicit separator.
    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(DEFAULT_SEPARATOR))
    }
}

impl Serialize for TranslationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
