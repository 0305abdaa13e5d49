use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::CliTest;

const APP: &str = r#"
export function Header() {
    return <h1 title={t("home.subtitle")}>{t("home.title")}</h1>;
}
"#;

fn project() -> Result<CliTest> {
    CliTest::with_files(&[
        ("src/header.tsx", APP),
        (
            "messages/en.json",
            r#"{"home": {"title": "Home", "subtitle": "Welcome"}}"#,
        ),
        ("messages/fr.json", r#"{"home": {"title": "Accueil"}}"#),
    ])
}

#[test]
fn test_sync_adds_missing_key() -> Result<()> {
    let test = project()?;

    let run = test.run(&["sync"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        "{\n  \"home\": {\n    \"title\": \"Accueil\",\n    \"subtitle\": \"home.subtitle\"\n  }\n}\n"
    );
    assert!(run.stdout.contains("    + home.subtitle = \"home.subtitle\"\n"));
    assert!(run.stdout.contains("Updated 1 language\n"));

    // Nothing left to do
    assert_eq!(test.run(&["check"])?.code, Some(0));
    let again = test.run(&["sync"])?;
    assert!(again.stdout.contains("[fr]\n  missing: none\n  orphan: none\n  mismatched: none\n  plan: nothing to do\n"));
    assert!(again.stdout.contains("Updated 0 languages\n"));

    Ok(())
}

#[test]
fn test_reference_language_is_not_rewritten_when_unchanged() -> Result<()> {
    let test = project()?;
    let before = r#"{"home": {"title": "Home", "subtitle": "Welcome"}}"#;

    test.run(&["sync"])?;

    assert_eq!(test.read_file("messages/en.json")?, before);

    Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
    let test = project()?;

    let run = test.run(&["sync", "--dry-run"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("  plan (1):\n    + home.subtitle = \"home.subtitle\"\n"));
    assert!(!run.stdout.contains("applied:"));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );

    Ok(())
}

#[test]
fn test_placeholder_options() -> Result<()> {
    let test = project()?;
    test.run(&["sync", "--placeholder", "reference"])?;
    assert_eq!(test.read_json("messages/fr.json")?["home"]["subtitle"], "Welcome");

    let test = project()?;
    test.run(&["sync", "--placeholder", "empty"])?;
    assert_eq!(test.read_json("messages/fr.json")?["home"]["subtitle"], "");

    let test = project()?;
    test.run(&["sync", "--placeholder-template", "TODO({lang}) {key}"])?;
    assert_eq!(
        test.read_json("messages/fr.json")?["home"]["subtitle"],
        "TODO(fr) home.subtitle"
    );

    Ok(())
}

#[test]
fn test_mismatch_skipped_by_default() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/nav.ts", r#"t("nav.home")"#),
        ("messages/en.json", r#"{"nav": {"home": "Home"}}"#),
        ("messages/fr.json", r#"{"nav": "Navigation"}"#),
    ])?;

    let run = test.run(&["sync"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("    ! restructure nav skipped: leaf in this language, namespace in the reference\n"));
    assert_eq!(test.read_json("messages/fr.json")?, json!({"nav": "Navigation"}));

    Ok(())
}

#[test]
fn test_mismatch_reference_wins() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/nav.ts", r#"t("nav.home")"#),
        ("messages/en.json", r#"{"nav": {"home": "Home"}}"#),
        ("messages/fr.json", r#"{"nav": "Navigation"}"#),
    ])?;

    let run = test.run(&["sync", "--fix-mismatches", "reference-wins"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        test.read_json("messages/fr.json")?,
        json!({"nav": {"home": "nav.home"}})
    );
    assert!(run.stdout.contains("warning[discarded-value] fr:nav: replaced value \"Navigation\""));
    assert_eq!(test.run(&["check"])?.code, Some(0));

    Ok(())
}

#[test]
fn test_remove_orphans() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("home.title")"#),
        ("messages/en.json", r#"{"home": {"title": "Home"}, "old": {"gone": "Gone"}}"#),
    ])?;

    let run = test.run(&["sync", "--remove-orphans"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("    - old.gone\n"));
    assert_eq!(test.read_json("messages/en.json")?, json!({"home": {"title": "Home"}}));

    Ok(())
}

#[test]
fn test_remove_orphans_refused_with_dynamic_keys() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", "t(\"home.title\");\nconst key = pick();\nt(key);\n"),
        ("messages/en.json", r#"{"home": {"title": "Home"}, "old": "Old"}"#),
    ])?;

    let run = test.run(&["sync", "--remove-orphans"])?;
    assert!(run.stdout.contains("! remove old skipped: 1 dynamic key reference(s) could use this key"));
    assert_eq!(test.read_json("messages/en.json")?["old"], "Old");

    test.run(&["sync", "--remove-orphans", "--prune-with-dynamic-keys"])?;
    assert_eq!(test.read_json("messages/en.json")?, json!({"home": {"title": "Home"}}));

    Ok(())
}

#[test]
fn test_no_add_missing() -> Result<()> {
    let test = project()?;

    let run = test.run(&["sync", "--no-add-missing"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );

    Ok(())
}

#[test]
fn test_directory_layout() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("common.ok"); t("auth.login");"#),
        ("messages/en/common.json", r#"{"ok": "OK"}"#),
        ("messages/en/auth.json", r#"{"login": "Log in"}"#),
        ("messages/de/common.json", r#"{"ok": "OK"}"#),
    ])?;

    let run = test.run(&["sync"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(test.read_json("messages/de/auth.json")?, json!({"login": "auth.login"}));
    assert_eq!(test.read_json("messages/de/common.json")?, json!({"ok": "OK"}));
    assert!(!test.root().join("messages/de.json").exists());

    Ok(())
}

#[test]
fn test_sort_keys_config() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("b"); t("a");"#),
        ("messages/en.json", r#"{"b": "B"}"#),
        (".glotsyncrc.json", r#"{ "sortKeys": true }"#),
    ])?;

    test.run(&["sync"])?;

    assert_eq!(
        test.read_file("messages/en.json")?,
        "{\n  \"a\": \"a\",\n  \"b\": \"B\"\n}\n"
    );

    Ok(())
}

#[test]
fn test_flat_dotted_keys_are_not_orphans() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("home.title");"#),
        ("messages/en.json", r#"{"home.title": "Home", "home.old": "Old"}"#),
        ("messages/fr.json", r#"{"home": {"title": "Accueil"}}"#),
    ])?;

    let run = test.run(&["sync", "--remove-orphans"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(test.read_json("messages/en.json")?, json!({"home": {"title": "Home"}}));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );
    assert_eq!(test.run(&["check"])?.code, Some(0));

    Ok(())
}

#[test]
fn test_write_failure_keeps_other_languages() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("title"); t("home.a"); t("home.b");"#),
        ("messages/en.json", r#"{"title": "T", "home": {"a": "A", "b": "B"}}"#),
        ("messages/de/home.json", r#"{"a": "A", "b": "B"}"#),
        ("messages/fr.json", r#"{"home": {"a": "A"}}"#),
    ])?;

    let run = test.run(&["sync"])?;

    assert_eq!(run.code, Some(1));
    assert!(run.stdout.contains("error[write-failure] de: "));
    assert!(run.stdout.contains("top-level key 'title' must be a namespace"));
    assert_eq!(
        test.read_json("messages/fr.json")?,
        json!({"home": {"a": "A", "b": "home.b"}, "title": "title"})
    );
    assert!(!test.root().join("messages/de/title.json").exists());

    Ok(())
}
