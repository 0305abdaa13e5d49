use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::CliTest;

fn project() -> Result<CliTest> {
    CliTest::with_files(&[
        (
            "messages/en.json",
            r#"{"home": {"title": "Home", "intro": "Hi, there"}}"#,
        ),
        ("messages/fr.json", r#"{"home": {"title": "Accueil"}}"#),
    ])
}

#[test]
fn test_export_csv_to_stdout() -> Result<()> {
    let test = project()?;

    let run = test.run(&["export"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        run.stdout,
        "key,en,fr\nhome.title,Home,Accueil\nhome.intro,\"Hi, there\",\n"
    );

    Ok(())
}

#[test]
fn test_export_json_file() -> Result<()> {
    let test = project()?;

    let run = test.run(&["export", "-o", "out/translations.json"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Exported 2 language(s) to out/translations.json"));
    assert_eq!(
        test.read_json("out/translations.json")?,
        json!({
            "en": {"home.title": "Home", "home.intro": "Hi, there"},
            "fr": {"home.title": "Accueil"}
        })
    );

    Ok(())
}

#[test]
fn test_export_then_import_changes_nothing() -> Result<()> {
    let test = project()?;

    test.run(&["export", "-o", "translations.csv"])?;
    let run = test.run(&["import", "translations.csv"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Updated 0 language(s)"));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );

    Ok(())
}

#[test]
fn test_import_merges_and_creates_languages() -> Result<()> {
    let test = project()?;
    test.write_file(
        "translations.csv",
        "key,en,fr,de\nhome.title,Home,Bienvenue,Startseite\nhome.intro,\"Hi, there\",,\n",
    )?;

    let run = test.run(&["import", "translations.csv"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("[de] 1 added, 0 updated, 0 conflict(s) (new language)\n"));
    assert!(run.stdout.contains("[fr] 0 added, 1 updated, 0 conflict(s)\n"));
    assert!(run.stdout.contains("Updated 2 language(s)"));
    assert_eq!(
        test.read_json("messages/fr.json")?,
        json!({"home": {"title": "Bienvenue"}})
    );
    assert_eq!(
        test.read_json("messages/de.json")?,
        json!({"home": {"title": "Startseite"}})
    );

    Ok(())
}

#[test]
fn test_import_conflict_is_reported() -> Result<()> {
    let test = project()?;
    test.write_file("translations.csv", "key,fr\nhome.title.short,Acc.\n")?;

    let run = test.run(&["import", "translations.csv"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("[fr] 0 added, 0 updated, 1 conflict(s)\n"));
    assert!(run.stdout.contains("  conflict home.title.short: "));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );

    Ok(())
}

#[test]
fn test_import_replace() -> Result<()> {
    let test = project()?;
    test.write_file("translations.json", r#"{"en": {"home.title": "Start"}}"#)?;

    let run = test.run(&["import", "translations.json", "--replace"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(
        test.read_json("messages/en.json")?,
        json!({"home": {"title": "Start"}})
    );

    Ok(())
}

#[test]
fn test_import_dry_run() -> Result<()> {
    let test = project()?;
    test.write_file("translations.csv", "key,fr\nhome.intro,Salut\n")?;

    let run = test.run(&["import", "translations.csv", "--dry-run"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("[fr] 1 added, 0 updated, 0 conflict(s)\n"));
    assert!(run.stdout.contains("Would update 1 language(s)"));
    assert_eq!(
        test.read_file("messages/fr.json")?,
        r#"{"home": {"title": "Accueil"}}"#
    );

    Ok(())
}

#[test]
fn test_import_format_flag_and_unknown_extension() -> Result<()> {
    let test = project()?;
    test.write_file("translations.txt", "key,fr\nhome.intro,Salut\n")?;

    let run = test.run(&["import", "translations.txt"])?;
    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("--file-format"));

    let run = test.run(&["import", "translations.txt", "--file-format", "csv"])?;
    assert_eq!(run.code, Some(0));
    assert_eq!(test.read_json("messages/fr.json")?["home"]["intro"], "Salut");

    Ok(())
}

#[test]
fn test_import_malformed_csv() -> Result<()> {
    let test = project()?;
    test.write_file("translations.csv", "key,fr\nhome.title,\"Acc\n")?;

    let run = test.run(&["import", "translations.csv"])?;

    assert_eq!(run.code, Some(2));
    assert!(run.stderr.contains("unterminated quoted field"));

    Ok(())
}
