//! Per-item notices collected during a run.
//!
//! Notices never abort a run. The reporter lists them after the per-language
//! sections, errors before warnings.

use enum_dispatch::enum_dispatch;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::core::scan::{ScanWarning, SourceLocation, UnresolvedReference};

// ============================================================
// Severity and Code
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Code {
    WriteFailure,
    SkippedFile,
    SkippedLanguage,
    UnresolvedKey,
    DegenerateScan,
    ShapeConflict,
    DiscardedValue,
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Code::WriteFailure => write!(f, "write-failure"),
            Code::SkippedFile => write!(f, "skipped-file"),
            Code::SkippedLanguage => write!(f, "skipped-language"),
            Code::UnresolvedKey => write!(f, "unresolved-key"),
            Code::DegenerateScan => write!(f, "degenerate-scan"),
            Code::ShapeConflict => write!(f, "shape-conflict"),
            Code::DiscardedValue => write!(f, "discarded-value"),
        }
    }
}

// ============================================================
// Notice structs
// ============================================================

/// A source file the scanner could not read or parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFileNotice {
    pub file_path: String,
    pub error: String,
}

/// A non-reference language file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLanguageNotice {
    pub language: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedKeyNotice {
    pub location: SourceLocation,
    pub reason: String,
    pub static_prefix: Option<String>,
}

/// The scan found no keys at all, so orphan detection was suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegenerateScanNotice {
    pub files_scanned: usize,
    pub orphans_suppressed: usize,
}

/// A change the synchronizer refused or failed to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeConflictNotice {
    pub language: String,
    pub key: String,
    pub reason: String,
}

/// A translated value replaced while fixing a shape mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedValueNotice {
    pub language: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailureNotice {
    pub language: String,
    pub error: String,
}

// ============================================================
// Notice enum
// ============================================================

#[enum_dispatch(Describe)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    WriteFailure(WriteFailureNotice),
    SkippedFile(SkippedFileNotice),
    SkippedLanguage(SkippedLanguageNotice),
    UnresolvedKey(UnresolvedKeyNotice),
    DegenerateScan(DegenerateScanNotice),
    ShapeConflict(ShapeConflictNotice),
    DiscardedValue(DiscardedValueNotice),
}

/// What the reporter needs to print a notice.
#[enum_dispatch]
pub trait Describe {
    fn severity(&self) -> Severity;

    fn code(&self) -> Code;

    /// File, location or `language:key` the notice is about.
    fn subject(&self) -> String;

    fn message(&self) -> String;
}

impl Describe for SkippedFileNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::SkippedFile
    }

    fn subject(&self) -> String {
        self.file_path.clone()
    }

    fn message(&self) -> String {
        self.error.clone()
    }
}

impl Describe for SkippedLanguageNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::SkippedLanguage
    }

    fn subject(&self) -> String {
        self.language.clone()
    }

    fn message(&self) -> String {
        self.error.clone()
    }
}

impl Describe for UnresolvedKeyNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::UnresolvedKey
    }

    fn subject(&self) -> String {
        self.location.to_string()
    }

    fn message(&self) -> String {
        match &self.static_prefix {
            Some(prefix) => format!("{} (prefix \"{}\")", self.reason, prefix),
            None => self.reason.clone(),
        }
    }
}

impl Describe for DegenerateScanNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::DegenerateScan
    }

    fn subject(&self) -> String {
        "scan".to_string()
    }

    fn message(&self) -> String {
        format!(
            "no translation keys found in {} file(s); {} orphan key(s) not reported",
            self.files_scanned, self.orphans_suppressed
        )
    }
}

impl Describe for ShapeConflictNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::ShapeConflict
    }

    fn subject(&self) -> String {
        format!("{}:{}", self.language, self.key)
    }

    fn message(&self) -> String {
        self.reason.clone()
    }
}

impl Describe for DiscardedValueNotice {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn code(&self) -> Code {
        Code::DiscardedValue
    }

    fn subject(&self) -> String {
        format!("{}:{}", self.language, self.key)
    }

    fn message(&self) -> String {
        format!("replaced value \"{}\"", self.value)
    }
}

impl Describe for WriteFailureNotice {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn code(&self) -> Code {
        Code::WriteFailure
    }

    fn subject(&self) -> String {
        self.language.clone()
    }

    fn message(&self) -> String {
        self.error.clone()
    }
}

impl From<&ScanWarning> for Notice {
    fn from(warning: &ScanWarning) -> Self {
        Notice::SkippedFile(SkippedFileNotice {
            file_path: warning.file_path.clone(),
            error: warning.error.clone(),
        })
    }
}

impl From<&UnresolvedReference> for Notice {
    fn from(reference: &UnresolvedReference) -> Self {
        Notice::UnresolvedKey(UnresolvedKeyNotice {
            location: reference.location.clone(),
            reason: reference.reason.to_string(),
            static_prefix: reference.static_prefix.clone(),
        })
    }
}

impl Serialize for Notice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Notice", 4)?;
        state.serialize_field("severity", &self.severity())?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("subject", &self.subject())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Stable order: severity, then code, then subject.
pub fn sort_notices(notices: &mut [Notice]) {
    notices.sort_by(|a, b| {
        a.severity()
            .cmp(&b.severity())
            .then_with(|| a.code().cmp(&b.code()))
            .then_with(|| a.subject().cmp(&b.subject()))
    });
}

#[cfg(test)]
mod tests {
    use crate::notices::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dispatch() {
        let notice = Notice::from(WriteFailureNotice {
            language: "fr".to_string(),
            error: "permission denied".to_string(),
        });

        assert_eq!(notice.severity(), Severity::Error);
        assert_eq!(notice.code().to_string(), "write-failure");
        assert_eq!(notice.subject(), "fr");
        assert_eq!(notice.message(), "permission denied");
    }

    #[test]
    fn test_sort_errors_first() {
        let mut notices = vec![
            Notice::from(ShapeConflictNotice {
                language: "fr".to_string(),
                key: "nav".to_string(),
                reason: "leaf".to_string(),
            }),
            Notice::from(SkippedFileNotice {
                file_path: "b.ts".to_string(),
                error: "x".to_string(),
            }),
            Notice::from(SkippedFileNotice {
                file_path: "a.ts".to_string(),
                error: "x".to_string(),
            }),
            Notice::from(WriteFailureNotice {
                language: "de".to_string(),
                error: "x".to_string(),
            }),
        ];

        sort_notices(&mut notices);
        let subjects: Vec<String> = notices.iter().map(|n| n.subject()).collect();

        assert_eq!(subjects, vec!["de", "a.ts", "b.ts", "fr:nav"]);
    }

    #[test]
    fn test_serialize_flat_fields() {
        let notice = Notice::from(SkippedFileNotice {
            file_path: "bad.vue".to_string(),
            error: "file is not valid UTF-8".to_string(),
        });

        let value = serde_json::to_value(&notice).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "severity": "warning",
                "code": "skipped-file",
                "subject": "bad.vue",
                "message": "file is not valid UTF-8"
            })
        );
    }

    #[test]
    fn test_serialized_codes_match_display() {
        let codes = [
            Code::WriteFailure,
            Code::SkippedFile,
            Code::SkippedLanguage,
            Code::UnresolvedKey,
            Code::DegenerateScan,
            Code::ShapeConflict,
            Code::DiscardedValue,
        ];
        for code in codes {
            assert_eq!(serde_json::to_value(code).unwrap(), code.to_string());
        }
        assert_eq!(serde_json::to_value(Severity::Error).unwrap(), "error");
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), "warning");
    }

    #[test]
    fn test_unresolved_message_includes_prefix() {
        let notice = UnresolvedKeyNotice {
            location: SourceLocation::new("a.ts", 3, 7),
            reason: "template with expression".to_string(),
            static_prefix: Some("errors.".to_string()),
        };

        assert_eq!(notice.subject(), "a.ts:3:7");
        assert_eq!(notice.message(), "template with expression (prefix \"errors.\")");
    }
}
