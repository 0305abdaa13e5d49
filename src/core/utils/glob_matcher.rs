use crate::core::key::TranslationKey;

/// A key pattern matched segment by segment.
///
/// - `*` inside a segment matches 0 or more characters without crossing a
///   segment boundary (`errors.*` matches `errors.E001`, not `errors.net.timeout`).
/// - A whole `**` segment matches any number of segments, including none
///   (`meta.**` matches `meta`, `meta.version` and `meta.build.date`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    raw: String,
    segments: Vec<String>,
}

impl KeyPattern {
    pub fn new(pattern: &str, separator: &str) -> Self {
        let segments = if separator.is_empty() {
            vec![pattern.to_string()]
        } else {
            pattern.split(separator).map(str::to_string).collect()
        };
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, key: &TranslationKey) -> bool {
        matches_segments(&self.segments, key.segments())
    }
}

/// True if any of `patterns` matches `key`.
pub fn matches_any(patterns: &[KeyPattern], key: &TranslationKey) -> bool {
    patterns.iter().any(|p| p.matches(key))
}

fn matches_segments(pattern: &[String], key: &[String]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((first, rest)) if first == "**" => {
            (0..=key.len()).any(|skip| matches_segments(rest, &key[skip..]))
        }
        Some((first, rest)) => match key.split_first() {
            Some((key_first, key_rest)) => {
                segment_matches(first, key_first) && matches_segments(rest, key_rest)
            }
            None => false,
        },
    }
}

/// Match a single segment with potential wildcards.
/// `*` matches 0 or more characters (standard glob semantics).
fn segment_matches(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true; // Matches any segment
    }
    if !pattern.contains('*') {
        return pattern == text; // Exact match
    }

    // Partial match with wildcards
    let parts: Vec<&str> = pattern.split('*').collect();

    let mut pos = 0;

    // First part must be a prefix
    if !parts[0].is_empty() {
        if !text.starts_with(parts[0]) {
            return false;
        }
        pos = parts[0].len();
    }

    // Last part must be a suffix
    let last = parts[parts.len() - 1];
    let end = if last.is_empty() {
        text.len()
    } else {
        if !text.ends_with(last) {
            return false;
        }
        // Check for overlap between prefix and suffix
        if pos + last.len() > text.len() {
            return false;
        }
        text.len() - last.len()
    };

    // Middle parts must appear in order
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(found) = text[pos..end].find(part) {
            pos = pos + found + part.len();
        } else {
            return false;
        }
    }

    true
}
