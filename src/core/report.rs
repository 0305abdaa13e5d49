//! Reporter: turns analysis, plan and apply results into a report.
//!
//! [`Report`] is plain data. `Display` renders deterministic text without
//! escape codes; callers wanting colour pass their own [`Style`] to
//! [`Report::write_styled`]. `Serialize` gives the JSON form, which always
//! carries the full key lists.

use std::fmt;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::core::analyze::{Analysis, LanguageDiff};
use crate::core::sync::{Addition, ApplyOutcome, LanguageOutcome, LanguagePlan, SkippedChange, SyncPlan};
use crate::core::tree::NodeKind;
use crate::notices::{
    DegenerateScanNotice, Describe, DiscardedValueNotice, Notice, Severity, ShapeConflictNotice,
    sort_notices,
};

/// Rendering options derived from the configuration.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Maximum entries per list in text output; `None` shows everything.
    pub limit: Option<usize>,
}

/// Hooks for decorating report text. Every method defaults to no decoration.
pub trait Style {
    fn heading(&self, text: &str) -> String {
        text.to_string()
    }

    fn error(&self, text: &str) -> String {
        text.to_string()
    }

    fn warning(&self, text: &str) -> String {
        text.to_string()
    }

    fn success(&self, text: &str) -> String {
        text.to_string()
    }

    fn dim(&self, text: &str) -> String {
        text.to_string()
    }
}

/// No decoration.
pub struct Plain;

impl Style for Plain {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub used_keys: usize,
    pub unresolved: usize,
    pub languages: usize,
    pub missing: usize,
    pub orphan: usize,
    pub mismatched: usize,
    pub orphan_suppressed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_languages: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub additions: usize,
    pub removals: usize,
    pub restructures: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchEntry {
    pub key: String,
    pub reference: NodeKind,
    pub found: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageReport {
    pub language: String,
    pub is_reference: bool,
    pub missing: Vec<String>,
    pub orphan: Vec<String>,
    pub mismatched: Vec<MismatchEntry>,
    pub orphan_suppressed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<LanguagePlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LanguageOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub reference: String,
    pub summary: Summary,
    pub languages: Vec<LanguageReport>,
    pub notices: Vec<Notice>,
    #[serde(skip)]
    limit: Option<usize>,
}

/// Build a report. Never fails, whatever the input.
pub fn render(
    analysis: &Analysis,
    plan: Option<&SyncPlan>,
    outcome: Option<&ApplyOutcome>,
    options: &ReportOptions,
) -> Report {
    let mut languages: Vec<LanguageReport> = analysis
        .languages
        .iter()
        .map(|(language, diff)| LanguageReport {
            language: language.clone(),
            is_reference: *language == analysis.reference,
            missing: diff.missing.iter().map(ToString::to_string).collect(),
            orphan: diff.orphan.iter().map(ToString::to_string).collect(),
            mismatched: mismatch_entries(diff),
            orphan_suppressed: diff.orphan_suppressed,
            plan: plan.and_then(|p| p.get(language)).cloned(),
            outcome: outcome.and_then(|o| o.languages.get(language)).cloned(),
        })
        .collect();
    // Reference first, the rest by language code
    languages.sort_by(|a, b| {
        b.is_reference
            .cmp(&a.is_reference)
            .then_with(|| a.language.cmp(&b.language))
    });

    let mut notices: Vec<Notice> = Vec::new();
    notices.extend(analysis.scan_warnings.iter().map(Notice::from));
    notices.extend(analysis.unresolved.iter().map(Notice::from));
    if analysis.degenerate {
        notices.push(Notice::from(DegenerateScanNotice {
            files_scanned: analysis.files_scanned,
            orphans_suppressed: analysis.total_orphan_suppressed(),
        }));
    }
    if let Some(outcome) = outcome {
        for (language, result) in &outcome.languages {
            notices.extend(result.discarded.iter().map(|d| {
                Notice::from(DiscardedValueNotice {
                    language: language.clone(),
                    key: d.key.to_string(),
                    value: d.value.clone(),
                })
            }));
            notices.extend(result.conflicts.iter().map(|c| {
                Notice::from(ShapeConflictNotice {
                    language: language.clone(),
                    key: c.key.to_string(),
                    reason: format!("{} failed: {}", c.change, c.reason),
                })
            }));
        }
    }
    sort_notices(&mut notices);

    let summary = Summary {
        files_scanned: analysis.files_scanned,
        used_keys: analysis.used_count,
        unresolved: analysis.unresolved.len(),
        languages: analysis.languages.len(),
        missing: analysis.total_missing(),
        orphan: analysis.total_orphan(),
        mismatched: analysis.total_mismatched(),
        orphan_suppressed: analysis.total_orphan_suppressed(),
        plan: plan.map(|p| PlanSummary {
            additions: p.total_additions(),
            removals: p.total_removals(),
            restructures: p.total_restructures(),
            skipped: p.total_skipped(),
        }),
        applied_languages: outcome.map(|o| o.changed_languages().len()),
    };

    Report {
        reference: analysis.reference.clone(),
        summary,
        languages,
        notices,
        limit: options.limit,
    }
}

fn mismatch_entries(diff: &LanguageDiff) -> Vec<MismatchEntry> {
    diff.mismatched
        .iter()
        .map(|m| MismatchEntry {
            key: m.key.to_string(),
            reference: m.reference,
            found: m.found,
        })
        .collect()
}

impl Report {
    /// Add a notice produced outside the engine (unreadable language files,
    /// failed writes).
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        sort_notices(&mut self.notices);
    }

    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(|n| n.severity() == Severity::Error)
    }

    /// Write the text form, decorated by `style`.
    pub fn write_styled(&self, out: &mut dyn fmt::Write, style: &dyn Style) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            out,
            "{}",
            style.heading(&format!("Reference language: {}", self.reference))
        )?;
        writeln!(
            out,
            "Scanned {} {}: {} {} used, {} unresolved {}",
            s.files_scanned,
            plural(s.files_scanned, "file", "files"),
            s.used_keys,
            plural(s.used_keys, "key", "keys"),
            s.unresolved,
            plural(s.unresolved, "reference", "references"),
        )?;

        if self.languages.is_empty() {
            writeln!(out)?;
            writeln!(out, "No languages loaded")?;
        }

        for language in &self.languages {
            writeln!(out)?;
            self.write_language(out, style, language)?;
        }

        if !self.notices.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", style.heading(&format!("Notices ({}):", self.notices.len())))?;
            let lines: Vec<String> = self
                .notices
                .iter()
                .map(|n| {
                    let label = format!("{}[{}]", n.severity(), n.code());
                    let label = match n.severity() {
                        Severity::Error => style.error(&label),
                        Severity::Warning => style.warning(&label),
                    };
                    format!("{} {}: {}", label, n.subject(), n.message())
                })
                .collect();
            self.write_capped(out, style, "  ", &lines)?;
        }

        writeln!(out)?;
        self.write_totals(out, style)
    }

    fn write_language(
        &self,
        out: &mut dyn fmt::Write,
        style: &dyn Style,
        language: &LanguageReport,
    ) -> fmt::Result {
        let title = if language.is_reference {
            format!("[{}] reference", language.language)
        } else {
            format!("[{}]", language.language)
        };
        writeln!(out, "{}", style.heading(&title))?;

        self.write_section(out, style, "missing", &language.missing)?;
        if language.orphan_suppressed > 0 {
            writeln!(
                out,
                "  orphan: {}",
                style.dim(&format!(
                    "not reported ({} suppressed, no keys found in sources)",
                    language.orphan_suppressed
                ))
            )?;
        } else {
            self.write_section(out, style, "orphan", &language.orphan)?;
        }
        let mismatched: Vec<String> = language
            .mismatched
            .iter()
            .map(|m| format!("{} ({} here, {} in reference)", m.key, m.found, m.reference))
            .collect();
        self.write_section(out, style, "mismatched", &mismatched)?;

        if let Some(plan) = &language.plan {
            let lines = plan_lines(plan);
            if lines.is_empty() {
                writeln!(out, "  plan: {}", style.dim("nothing to do"))?;
            } else {
                writeln!(out, "  plan ({}):", lines.len())?;
                self.write_capped(out, style, "    ", &lines)?;
            }
        }

        if let Some(outcome) = &language.outcome {
            let text = format!(
                "{} added, {} removed, {} restructured, {} {}",
                outcome.added,
                outcome.removed,
                outcome.restructured,
                outcome.conflicts.len(),
                plural(outcome.conflicts.len(), "conflict", "conflicts"),
            );
            let text = if outcome.conflicts.is_empty() {
                style.success(&text)
            } else {
                style.warning(&text)
            };
            writeln!(out, "  applied: {}", text)?;
        }
        Ok(())
    }

    fn write_section(
        &self,
        out: &mut dyn fmt::Write,
        style: &dyn Style,
        name: &str,
        items: &[String],
    ) -> fmt::Result {
        if items.is_empty() {
            return writeln!(out, "  {}: {}", name, style.dim("none"));
        }
        writeln!(out, "  {} ({}):", name, items.len())?;
        self.write_capped(out, style, "    ", items)
    }

    fn write_capped(
        &self,
        out: &mut dyn fmt::Write,
        style: &dyn Style,
        indent: &str,
        items: &[String],
    ) -> fmt::Result {
        let shown = self.limit.map_or(items.len(), |limit| limit.min(items.len()));
        for item in &items[..shown] {
            writeln!(out, "{}{}", indent, item)?;
        }
        if shown < items.len() {
            writeln!(
                out,
                "{}{}",
                indent,
                style.dim(&format!("\u{2026} and {} more", items.len() - shown))
            )?;
        }
        Ok(())
    }

    fn write_totals(&self, out: &mut dyn fmt::Write, style: &dyn Style) -> fmt::Result {
        let s = &self.summary;
        let totals = format!(
            "Total: {} missing, {} orphan, {} mismatched in {} {}",
            s.missing,
            s.orphan,
            s.mismatched,
            s.languages,
            plural(s.languages, "language", "languages"),
        );
        let totals = if s.missing + s.mismatched > 0 {
            style.error(&totals)
        } else if s.orphan > 0 {
            style.warning(&totals)
        } else {
            style.success(&totals)
        };
        writeln!(out, "{}", totals)?;

        if let Some(plan) = &s.plan {
            writeln!(
                out,
                "Plan: {} {}, {} {}, {} {}, {} skipped",
                plan.additions,
                plural(plan.additions, "addition", "additions"),
                plan.removals,
                plural(plan.removals, "removal", "removals"),
                plan.restructures,
                plural(plan.restructures, "restructure", "restructures"),
                plan.skipped,
            )?;
        }
        if let Some(applied) = s.applied_languages {
            writeln!(
                out,
                "Updated {} {}",
                applied,
                plural(applied, "language", "languages")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_styled(f, &Plain)
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// Plan entries in application order; addition keys are padded to a common
/// display width so values line up.
fn plan_lines(plan: &LanguagePlan) -> Vec<String> {
    let mut lines = Vec::new();

    for r in &plan.restructures {
        let discarded = r.discarded.len();
        lines.push(format!(
            "~ {}: {} -> {} ({} {} discarded)",
            r.key,
            r.from,
            r.to,
            discarded,
            plural(discarded, "value", "values")
        ));
    }
    for key in &plan.removals {
        lines.push(format!("- {}", key));
    }

    let width = plan
        .additions
        .iter()
        .map(|a| UnicodeWidthStr::width(a.key.to_string().as_str()))
        .max()
        .unwrap_or(0);
    lines.extend(plan.additions.iter().map(|a| addition_line(a, width)));

    lines.extend(plan.skipped.iter().map(skipped_line));
    lines
}

fn addition_line(addition: &Addition, width: usize) -> String {
    let key = addition.key.to_string();
    let padding = width.saturating_sub(UnicodeWidthStr::width(key.as_str()));
    let value = serde_json::to_string(&addition.value).unwrap_or_default();
    format!("+ {}{} = {}", key, " ".repeat(padding), value)
}

fn skipped_line(skipped: &SkippedChange) -> String {
    format!("! {} {} skipped: {}", skipped.change, skipped.key, skipped.reason)
}

#[cfg(test)]
mod tests {
    use crate::core::analyze::{AnalyzeOptions, analyze};
    use crate::core::key::TranslationKey;
    use crate::core::language::LanguageSet;
    use crate::core::report::*;
    use crate::core::scan::{ScanResult, SourceLocation, UnresolvedReason, UnresolvedReference};
    use crate::core::sync::{MismatchPolicy, SyncPolicy, apply, plan};
    use crate::core::tree::TranslationTree;
    use crate::notices::WriteFailureNotice;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn scan_of(used: &[&str]) -> ScanResult {
        ScanResult {
            used: used
                .iter()
                .map(|k| TranslationKey::dotted(k).unwrap())
                .collect(),
            files_scanned: 2,
            ..Default::default()
        }
    }

    fn languages(trees: Vec<(&str, Value)>) -> LanguageSet {
        let mut set = LanguageSet::new("en");
        for (lang, value) in trees {
            set.insert(lang, TranslationTree::from_json(value.as_object().unwrap()));
        }
        set
    }

    #[test]
    fn test_check_report_text() {
        let mut scan = scan_of(&["home.title", "home.subtitle"]);
        scan.unresolved.push(UnresolvedReference {
            location: SourceLocation::new("src/app.ts", 4, 9),
            reason: UnresolvedReason::Variable,
            static_prefix: None,
        });
        let set = languages(vec![
            ("en", json!({"home": {"title": "Home", "subtitle": "Welcome"}, "old": "Old"})),
            ("fr", json!({"home": {"title": "Accueil"}})),
        ]);
        let analysis = analyze(&scan, &set, &AnalyzeOptions::default()).unwrap();

        let report = render(&analysis, None, None, &ReportOptions::default());

        insta::assert_snapshot!(report.to_string(), @r"
        Reference language: en
        Scanned 2 files: 2 keys used, 1 unresolved reference

        [en] reference
          missing: none
          orphan (1):
            old
          mismatched: none

        [fr]
          missing (1):
            home.subtitle
          orphan: none
          mismatched: none

        Notices (1):
          warning[unresolved-key] src/app.ts:4:9: variable key

        Total: 1 missing, 1 orphan, 0 mismatched in 2 languages
        ");
    }

    #[test]
    fn test_sync_report_text() {
        let scan = scan_of(&["nav.home", "title"]);
        let mut set = languages(vec![
            ("en", json!({"nav": {"home": "Home"}, "title": "Title"})),
            ("fr", json!({"nav": "Navigation"})),
        ]);
        let policy = SyncPolicy {
            fix_mismatches: MismatchPolicy::ReferenceWins,
            ..Default::default()
        };
        let analysis = analyze(&scan, &set, &AnalyzeOptions::default()).unwrap();
        let plan = plan(&analysis, &set, &policy);
        let outcome = apply(&mut set, &plan);

        let report = render(&analysis, Some(&plan), Some(&outcome), &ReportOptions::default());

        insta::assert_snapshot!(report.to_string(), @r#"
        Reference language: en
        Scanned 2 files: 2 keys used, 0 unresolved references

        [en] reference
          missing: none
          orphan: none
          mismatched: none
          plan: nothing to do

        [fr]
          missing (1):
            title
          orphan: none
          mismatched (1):
            nav (leaf here, namespace in reference)
          plan (2):
            ~ nav: leaf -> namespace (1 value discarded)
            + title = "title"
          applied: 1 added, 0 removed, 1 restructured, 0 conflicts

        Notices (1):
          warning[discarded-value] fr:nav: replaced value "Navigation"

        Total: 1 missing, 0 orphan, 1 mismatched in 2 languages
        Plan: 1 addition, 0 removals, 1 restructure, 0 skipped
        Updated 1 language
        "#);
    }

    #[test]
    fn test_limit_caps_lists() {
        let used: Vec<String> = (0..5).map(|i| format!("k{}", i)).collect();
        let used: Vec<&str> = used.iter().map(String::as_str).collect();
        let set = languages(vec![("en", json!({}))]);
        let analysis = analyze(&scan_of(&used), &set, &AnalyzeOptions::default()).unwrap();

        let text = render(&analysis, None, None, &ReportOptions { limit: Some(2) }).to_string();

        assert!(text.contains("  missing (5):\n    k0\n    k1\n    \u{2026} and 3 more\n"));
        assert!(text.contains("Total: 5 missing"));
    }

    #[test]
    fn test_degenerate_scan_is_visible() {
        let set = languages(vec![("en", json!({"a": "A", "b": "B"}))]);
        let analysis = analyze(&scan_of(&[]), &set, &AnalyzeOptions::default()).unwrap();

        let text = render(&analysis, None, None, &ReportOptions::default()).to_string();

        assert!(text.contains("orphan: not reported (2 suppressed, no keys found in sources)"));
        assert!(text.contains("warning[degenerate-scan] scan: no translation keys found in 2 file(s)"));
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyze(&ScanResult::default(), &languages(vec![("en", json!({}))]), &AnalyzeOptions::default()).unwrap();

        let report = render(&analysis, None, None, &ReportOptions::default());

        assert!(report.to_string().ends_with("Total: 0 missing, 0 orphan, 0 mismatched in 1 language\n"));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_json_and_pushed_notices() {
        let set = languages(vec![("en", json!({"a": "A"})), ("de", json!({}))]);
        let analysis = analyze(&scan_of(&["a"]), &set, &AnalyzeOptions::default()).unwrap();
        let mut report = render(&analysis, None, None, &ReportOptions { limit: Some(0) });
        report.push_notice(Notice::from(WriteFailureNotice {
            language: "de".to_string(),
            error: "permission denied".to_string(),
        }));

        let value = serde_json::to_value(&report).unwrap();

        assert!(report.has_errors());
        assert_eq!(value["reference"], json!("en"));
        assert_eq!(value["languages"][0]["language"], json!("en"));
        assert_eq!(value["languages"][1]["missing"], json!(["a"]));
        assert_eq!(value["summary"]["missing"], json!(1));
        assert_eq!(value["notices"][0]["subject"], json!("de"));
        assert_eq!(value["notices"][0]["code"], json!("write-failure"));
        assert!(value["summary"].get("plan").is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        let set = languages(vec![
            ("fr", json!({"x": "1"})),
            ("en", json!({"b": "1", "a": "2"})),
            ("de", json!({})),
        ]);
        let analysis = analyze(&scan_of(&["a", "c"]), &set, &AnalyzeOptions::default()).unwrap();

        let first = render(&analysis, None, None, &ReportOptions::default()).to_string();
        let second = render(&analysis, None, None, &ReportOptions::default()).to_string();

        assert_eq!(first, second);
        assert!(first.find("[en] reference").unwrap() < first.find("[de]").unwrap());
    }
}
