use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::CliTest;

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["messagesRoot"], "./messages");
    assert_eq!(parsed["primaryLocale"], "en");
    assert_eq!(parsed["keySeparator"], ".");
    assert!(parsed["functions"].as_array().is_some_and(|f| !f.is_empty()));
    assert_eq!(parsed["sync"]["addMissing"], true);

    assert!(content.contains("\n  \""), "Config should use 2-space indentation");
    assert!(content.ends_with("}\n"), "Config should end with a newline");

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let run = test.run(&["init"])?;

    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("Created .glotsyncrc.json"));
    assert_config_content(&test.read_file(".glotsyncrc.json")?)?;

    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::with_files(&[(".glotsyncrc.json", r#"{ "primaryLocale": "de" }"#)])?;

    let run = test.run(&["init"])?;

    assert_eq!(run.code, Some(1));
    assert!(run.stderr.contains("already exists"));
    assert_eq!(
        test.read_file(".glotsyncrc.json")?,
        r#"{ "primaryLocale": "de" }"#
    );

    Ok(())
}

#[test]
fn test_init_config_is_loadable() -> Result<()> {
    let test = CliTest::with_files(&[
        ("src/app.ts", r#"t("a")"#),
        ("messages/en.json", r#"{"a": "A"}"#),
    ])?;

    assert_eq!(test.run(&["init"])?.code, Some(0));
    let run = test.run(&["check"])?;

    assert_eq!(run.code, Some(0));
    assert_eq!(run.stderr, "");

    Ok(())
}
