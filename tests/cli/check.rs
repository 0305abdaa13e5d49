use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const APP: &str = r#"
import { t } from "i18next";

export function title() {
    return t("home.title") + " " + t("home.subtitle");
}
"#;

#[test]
fn test_missing_key_in_one_language() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", APP),
        (
            "messages/en.json",
            r#"{"home": {"title": "Home", "subtitle": "Welcome"}}"#,
        ),
        ("messages/fr.json", r#"{"home": {"title": "Accueil"}}"#),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(1));
    insta::assert_snapshot!(run.stdout, @r"
    Reference language: en
    Scanned 1 file: 2 keys used, 0 unresolved references

    [en] reference
      missing: none
      orphan: none
      mismatched: none

    [fr]
      missing (1):
        home.subtitle
      orphan: none
      mismatched: none

    Total: 1 missing, 0 orphan, 0 mismatched in 2 languages
    ");

    Ok(())
}

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", APP),
        (
            "messages/en.json",
            r#"{"home": {"title": "Home", "subtitle": "Welcome"}}"#,
        ),
        (
            "messages/fr.json",
            r#"{"home": {"title": "Accueil", "subtitle": "Bienvenue"}}"#,
        ),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Total: 0 missing, 0 orphan, 0 mismatched in 2 languages"));
    assert_eq!(run.stderr, "");

    Ok(())
}

#[test]
fn test_orphans_fail_only_when_asked() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("home.title")"#),
        ("messages/en.json", r#"{"home": {"title": "Home"}, "old": "Old"}"#),
    ])?;

    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("  orphan (1):\n    old\n"));

    let run = test.run(&["check", "--fail-on-orphans"])?;
    assert_eq!(run.code, Some(1));

    test.write_file(".glotsyncrc.json", r#"{ "failOnOrphans": true }"#)?;
    let run = test.run(&["check"])?;
    assert_eq!(run.code, Some(1));

    Ok(())
}

#[test]
fn test_shape_mismatch_is_reported_once() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/nav.tsx", r#"export const Nav = () => <a>{t("nav.home")}</a>;"#),
        ("messages/en.json", r#"{"nav": {"home": "Home"}}"#),
        ("messages/fr.json", r#"{"nav": "Navigation"}"#),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("  mismatched (1):\n    nav (leaf here, namespace in reference)\n"));
    // nav.home lies under the mismatch, so it is not also missing
    assert!(run.stdout.contains("[fr]\n  missing: none\n"));

    Ok(())
}

#[test]
fn test_json_format() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", APP),
        ("messages/en.json", r#"{"home": {"title": "Home"}}"#),
    ])?;

    let run = test.run(&["check", "--format", "json"])?;
    let report: serde_json::Value = serde_json::from_str(&run.stdout)?;

    assert_eq!(run.code, Some(1));
    assert_eq!(report["reference"], "en");
    assert_eq!(report["summary"]["missing"], 1);
    assert_eq!(report["languages"][0]["missing"][0], "home.subtitle");

    Ok(())
}

#[test]
fn test_limit_caps_lists() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("a"); t("b"); t("c"); t("d");"#),
        ("messages/en.json", "{}"),
    ])?;

    let run = test.run(&["check", "--limit", "2"])?;

    assert!(run.stdout.contains("  missing (4):\n    a\n    b\n    \u{2026} and 2 more\n"));

    Ok(())
}

#[test]
fn test_dynamic_keys_protect_prefix() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "src/errors.ts",
            "export const message = (code: string) => t(`errors.${code}`);\n",
        ),
        ("src/app.ts", r#"t("home.title")"#),
        (
            "messages/en.json",
            r#"{"home": {"title": "Home"}, "errors": {"E1": "Oops"}, "old": "Old"}"#,
        ),
    ])?;

    let run = test.run(&["check"])?;

    assert!(run.stdout.contains("  orphan (1):\n    old\n"));
    assert!(run.stdout.contains(
        "warning[unresolved-key] src/errors.ts:1:42: template with expression (prefix \"errors.\")"
    ));

    Ok(())
}

#[test]
fn test_degenerate_scan_suppresses_orphans() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", "export const x = 1;\n"),
        ("messages/en.json", r#"{"a": "A", "b": "B"}"#),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("  orphan: not reported (2 suppressed, no keys found in sources)"));
    assert!(run.stdout.contains("warning[degenerate-scan]"));

    Ok(())
}

#[test]
fn test_broken_language_is_skipped() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("a")"#),
        ("messages/en.json", r#"{"a": "A"}"#),
        ("messages/fr.json", "{ broken"),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("warning[skipped-language] fr: failed to parse"));

    Ok(())
}

#[test]
fn test_missing_messages_root() -> Result<()> {
    let test = CliTest::with_files(&[("src/app.ts", r#"t("a")"#)])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("does not exist"));

    Ok(())
}

#[test]
fn test_missing_reference_language() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("a")"#),
        ("messages/fr.json", r#"{"a": "A"}"#),
    ])?;

    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("reference language 'en' is not loaded (available: fr)"));

    Ok(())
}

#[test]
fn test_reference_override() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("a")"#),
        ("messages/fr.json", r#"{"a": "A"}"#),
    ])?;

    let run = test.run(&["check", "--primary-locale", "fr"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.starts_with("Reference language: fr\n"));

    Ok(())
}
