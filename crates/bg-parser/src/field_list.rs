use std::sync::OnceLock;

use bg_core::{FieldSet, FieldValue, Warning, WarningKind};
use regex::Regex;

/// Result of scanning one docstring for `:name: value` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub fields: FieldSet,
    /// Docstring text with every field block removed.
    pub prose: String,
    pub warnings: Vec<Warning>,
}

/// Extracts the field list of a cleaned docstring. `scope` only labels
/// warnings.
pub fn extract_fields(docstring: &str, scope: &str) -> Extraction {
    let mut extraction = Extraction::default();
    let lines = docstring.lines().collect::<Vec<_>>();
    let mut prose = Vec::new();
    let mut index = 0usize;

    while index < lines.len() {
        let line = lines[index];
        let Some(opener) = parse_opener(line) else {
            if is_malformed_marker(line) {
                extraction.warnings.push(Warning::new(
                    WarningKind::MalformedField,
                    scope,
                    format!(
                        "Line {} looks like a field marker but has no closing colon: \"{}\".",
                        index + 1,
                        line.trim()
                    ),
                ));
            }
            prose.push(line);
            index += 1;
            continue;
        };

        let mut end = index + 1;
        while end < lines.len() {
            let next = lines[end];
            if !next.trim().is_empty() && indentation(next) <= opener.indent {
                break;
            }
            end += 1;
        }
        let value = parse_value(opener.inline, &lines[index + 1..end]);
        if !extraction.fields.insert_first(opener.name.clone(), value) {
            extraction.warnings.push(Warning::new(
                WarningKind::DuplicateField,
                scope,
                format!(
                    "Field \"{}\" is declared more than once; keeping the first value.",
                    opener.name
                ),
            ));
        }
        index = end;
    }

    extraction.prose = trim_blank_lines(&prose).join("\n");
    extraction
}

/// Docstring text without its field list.
pub fn docstring_prose(docstring: &str) -> String {
    extract_fields(docstring, "").prose
}

struct Opener<'a> {
    indent: usize,
    name: String,
    inline: &'a str,
}

fn parse_opener(line: &str) -> Option<Opener<'_>> {
    let captures = opener_regex().captures(line)?;
    let indent = captures.get(1).map_or(0, |m| m.as_str().len());
    let name = captures.get(2)?.as_str().to_lowercase();
    let inline = captures.get(3).map_or("", |m| m.as_str().trim());
    Some(Opener {
        indent,
        name,
        inline,
    })
}

fn is_malformed_marker(line: &str) -> bool {
    malformed_regex().is_match(line)
}

fn parse_value(inline: &str, continuation: &[&str]) -> FieldValue {
    let block = dedent(continuation);
    let block = trim_blank_lines(&block);

    if inline.is_empty() {
        if let Some(items) = parse_numbered_list(&block) {
            return FieldValue::List(items);
        }
    }

    let mut text_lines = Vec::new();
    if !inline.is_empty() {
        text_lines.push(inline.to_string());
    }
    text_lines.extend(block.iter().map(|line| line.to_string()));
    FieldValue::Text(text_lines.join("\n"))
}

/// Items of a `1. …` list, or `None` when any line breaks the list shape.
fn parse_numbered_list(block: &[&str]) -> Option<Vec<String>> {
    let mut items: Vec<String> = Vec::new();
    for line in block {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(captures) = list_item_regex().captures(line) {
            let content = captures.get(1).map_or("", |m| m.as_str().trim());
            items.push(content.to_string());
            continue;
        }
        // Wrapped item text must sit under an already opened item.
        let current = items.last_mut()?;
        if indentation(line) == 0 {
            return None;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line.trim());
    }

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn dedent(lines: &[&str]) -> Vec<String> {
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indentation(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.get(margin..)
                    .unwrap_or_else(|| line.trim_start())
                    .trim_end()
                    .to_string()
            }
        })
        .collect()
}

fn trim_blank_lines<S: AsRef<str>>(lines: &[S]) -> Vec<&str> {
    let start = lines
        .iter()
        .position(|line| !line.as_ref().trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.as_ref().trim().is_empty())
        .map_or(start, |position| position + 1);
    lines[start..end].iter().map(AsRef::as_ref).collect()
}

fn opener_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^([ \t]*):([^:\s]+):(?:[ \t]+(.*)|[ \t]*)$").expect("field opener regex")
    })
}

fn malformed_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[ \t]*:[A-Za-z_][\w-]*(?:[ \t]|$)").expect("malformed field regex")
    })
}

fn list_item_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\d+\.(?:[ \t]+(.*)|[ \t]*)$").expect("list item regex"))
}
