//! Regex-based extraction for template languages and anything swc can't parse
//! (`.vue`, `.svelte`, `.html`, `.rs`, ...).
//!
//! Recognises `name(`, `obj.name(`, `this.name(` and macro-style `name!(`
//! calls, then reads the first argument by hand.

use anyhow::Result;
use regex::Regex;

use crate::core::scan::{KeyArgument, KeyExtractor, RawReference, UnresolvedReason};
use crate::core::utils::LineIndex;

pub struct PatternExtractor {
    call_regex: Option<Regex>,
}

impl PatternExtractor {
    pub fn new(functions: &[String]) -> Result<Self> {
        if functions.is_empty() {
            return Ok(Self { call_regex: None });
        }

        // Longest names first so `i18n.t` wins over `t`
        let mut names: Vec<&String> = functions.iter().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternatives: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
        let pattern = format!(r"(?:{})\s*!?\s*\(", alternatives.join("|"));

        Ok(Self {
            call_regex: Some(Regex::new(&pattern)?),
        })
    }
}

impl KeyExtractor for PatternExtractor {
    fn extract(&self, _path: &str, source: &str) -> Result<Vec<RawReference>> {
        let Some(regex) = &self.call_regex else {
            return Ok(Vec::new());
        };

        let index = LineIndex::new(source);
        let mut references = Vec::new();

        for m in regex.find_iter(source) {
            if !is_call_boundary(&source[..m.start()]) {
                continue;
            }
            let (line, col) = index.position(source, m.start());
            references.push(RawReference {
                line,
                col,
                argument: read_argument(&source[m.end()..]),
            });
        }

        Ok(references)
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// A match only counts when the name isn't the tail of a longer identifier
/// or member chain (`get(` must not match `t(`). `this.` is allowed.
fn is_call_boundary(before: &str) -> bool {
    match before.chars().next_back() {
        None => true,
        Some('.') => {
            let head = &before[..before.len() - 1];
            head.ends_with("this")
                && !head[..head.len() - 4]
                    .chars()
                    .next_back()
                    .is_some_and(|c| is_identifier_char(c) || c == '.')
        }
        Some(c) => !is_identifier_char(c),
    }
}

/// Read the first call argument from the text after the opening paren.
fn read_argument(rest: &str) -> KeyArgument {
    let rest = rest.trim_start();
    let mut chars = rest.chars();
    let quote = match chars.next() {
        None => return KeyArgument::dynamic(UnresolvedReason::Expression, None),
        Some(')') => return KeyArgument::dynamic(UnresolvedReason::MissingArgument, None),
        Some(q @ ('"' | '\'' | '`')) => q,
        Some(c) if is_identifier_char(c) => {
            let word: String = rest.chars().take_while(|c| is_identifier_char(*c) || *c == '.').collect();
            let after = rest[word.len()..].trim_start();
            return if after.starts_with(',') || after.starts_with(')') {
                KeyArgument::dynamic(UnresolvedReason::Variable, None)
            } else {
                KeyArgument::dynamic(UnresolvedReason::Expression, None)
            };
        }
        Some(_) => return KeyArgument::dynamic(UnresolvedReason::Expression, None),
    };

    let mut value = String::new();
    let mut consumed = quote.len_utf8();
    let mut closed = false;
    while let Some(c) = chars.next() {
        consumed += c.len_utf8();
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else { break };
                consumed += escaped.len_utf8();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            '$' if quote == '`' && chars.clone().next() == Some('{') => {
                return KeyArgument::dynamic(UnresolvedReason::TemplateWithExpr, Some(value));
            }
            '\n' if quote != '`' => break,
            c if c == quote => {
                closed = true;
                break;
            }
            c => value.push(c),
        }
    }

    if !closed {
        return KeyArgument::dynamic(UnresolvedReason::Expression, None);
    }

    let after = rest[consumed..].trim_start();
    match after.chars().next() {
        Some(',' | ')') => KeyArgument::Literal(value),
        Some('+') => KeyArgument::dynamic(UnresolvedReason::Concatenation, Some(value)),
        _ => KeyArgument::dynamic(UnresolvedReason::Expression, None),
    }
}
