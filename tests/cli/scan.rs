use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_scan_lists_keys() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "src/app.tsx",
            r#"export const App = () => <p>{t("home.title")}</p>;
export const Other = () => <p>{t("home.title")}{t("nav.about")}</p>;
"#,
        ),
        (
            "src/Footer.vue",
            r#"<template><footer>{{ $t('footer.copyright') }}</footer></template>"#,
        ),
    ])?;

    let run = test.run(&["scan"])?;

    assert_eq!(run.code, Some(0));
    insta::assert_snapshot!(run.stdout, @r"
    Scanned 2 files: 3 keys used, 0 notices

    Keys (3):
      footer.copyright  src/Footer.vue:1:22
      home.title        src/app.tsx:1:30 (+1)
      nav.about         src/app.tsx:2:49
    ");

    Ok(())
}

#[test]
fn test_scan_reports_unresolved_and_parse_errors() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/ok.ts", "t(`errors.${code}`);\n"),
        ("src/broken.ts", "export const = ;\n"),
    ])?;

    let run = test.run(&["scan"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Dynamic prefixes:\n  errors.*\n"));
    assert!(run.stdout.contains("warning[skipped-file] src/broken.ts: failed to parse"));
    assert!(run.stdout.contains("warning[unresolved-key] src/ok.ts:1:1: template with expression"));

    Ok(())
}

#[test]
fn test_scan_ignores_test_files_and_config_ignores() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("kept")"#),
        ("src/app.test.ts", r#"t("from.test")"#),
        ("src/generated/api.ts", r#"t("generated")"#),
        ("node_modules/lib/index.js", r#"t("vendor")"#),
        (".glotsyncrc.json", r#"{ "ignores": ["**/node_modules/**", "src/generated"] }"#),
    ])?;

    let run = test.run(&["scan", "--format", "json"])?;
    let report: serde_json::Value = serde_json::from_str(&run.stdout)?;

    assert_eq!(report["files_scanned"], 1);
    assert_eq!(report["keys"][0]["key"], "kept");
    assert_eq!(report["keys"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[test]
fn test_custom_functions() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"translate("a.b"); t("not.counted");"#),
        (".glotsyncrc.json", r#"{ "functions": ["translate"] }"#),
    ])?;

    let run = test.run(&["scan", "--format", "json"])?;
    let report: serde_json::Value = serde_json::from_str(&run.stdout)?;

    assert_eq!(report["keys"][0]["key"], "a.b");
    assert_eq!(report["keys"][0]["locations"][0]["line"], 1);
    assert_eq!(report["keys"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_files(&[(".glotsyncrc.json", r#"{ "functions": [] }"#)])?;

    let run = test.run(&["scan"])?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("Invalid config file"));
    assert!(run.stderr.contains("'functions' must name at least one translation function"));

    Ok(())
}
