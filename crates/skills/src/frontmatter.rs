//! Line-oriented front-matter reader for `SKILL.md` files.
//!
//! Skill front matter in the wild is only loosely YAML: descriptions often
//! carry unquoted `: ` sequences and tool lists mix bracket, comma and
//! space syntax. This reader accepts that subset leniently:
//!
//! - `key: value` scalars, with matching surrounding quotes removed;
//! - block scalars (`key: |` or `key: >`, optional `-`/`+` chomping), whose
//!   indented lines are dedented and joined with newlines;
//! - plain continuation lines (indented lines after a scalar), also
//!   newline-joined;
//! - `[a, b]` bracket lists (a value whose opening bracket closes at the
//!   end of the value, anything else such as `[WIP] notes` stays a scalar);
//! - `- item` block lists under an empty value, indented or at column 0;
//! - blank lines and `#` comment lines.

use std::path::Path;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::error::{Error, Result};

const DELIMITER: &str = "---";

/// A front-matter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

/// Ordered front-matter fields. A key declared twice keeps its last value
/// at the position of its first declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: Vec<(String, FieldValue)>,
}

impl FrontMatter {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar value of `key`, trimmed; `None` if absent or a list.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_scalar).map(str::trim)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of these fields minus `keys`.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .cloned()
                .collect(),
        }
    }

    fn insert(&mut self, key: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }
}

impl Serialize for FrontMatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Split a `SKILL.md` into its raw metadata lines and the trimmed body.
///
/// Returns the 1-based line number of the first metadata line alongside the
/// lines so parse errors can point into the file.
pub fn split<'a>(content: &'a str, path: &Path) -> Result<(Vec<&'a str>, usize, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().enumerate().skip_while(|(_, l)| l.trim().is_empty());

    match lines.next() {
        Some((_, first)) if first.trim_end() == DELIMITER => {},
        _ => {
            return Err(Error::malformed(
                path,
                "must start with front matter delimited by ---",
            ));
        },
    }

    let mut metadata = Vec::new();
    let mut first_line = None;
    while let Some((idx, line)) = lines.next() {
        if line.trim_end() == DELIMITER {
            let body = lines.by_ref().map(|(_, l)| l).collect::<Vec<_>>().join("\n");
            let first_line = first_line.unwrap_or(idx + 1);
            return Ok((metadata, first_line, body.trim().to_string()));
        }
        first_line.get_or_insert(idx + 1);
        metadata.push(line);
    }

    Err(Error::malformed(path, "missing closing --- for front matter"))
}

/// Parse the metadata lines produced by [`split`].
pub fn parse_fields(lines: &[&str], first_line: usize, path: &Path) -> Result<FrontMatter> {
    let mut fm = FrontMatter::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }
        let line_no = first_line + i;
        if indent(line) > 0 {
            return Err(Error::malformed(
                path,
                format!("line {line_no}: indented line does not belong to any key"),
            ));
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(Error::malformed(
                path,
                format!("line {line_no}: expected `key: value`, found `{trimmed}`"),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::malformed(path, format!("line {line_no}: empty key")));
        }
        let value = value.trim();

        let mut end = i + 1;
        while end < lines.len() && belongs_to_value(lines[end], value) {
            end += 1;
        }
        let continuation = trim_trailing_blank(&lines[i + 1..end]);

        let bracketed = value
            .starts_with('[')
            .then(|| {
                let mut joined = value.to_string();
                for l in continuation {
                    joined.push(' ');
                    joined.push_str(l.trim());
                }
                bracket_list(&joined)
            })
            .flatten();

        let parsed = if is_block_indicator(value) {
            FieldValue::Scalar(block_scalar(continuation))
        } else if let Some(items) = bracketed {
            FieldValue::List(items)
        } else if value.is_empty() && is_dash_list(continuation) {
            FieldValue::List(
                continuation
                    .iter()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| unquote(l.trim().trim_start_matches('-').trim()))
                    .collect(),
            )
        } else {
            let parts: Vec<&str> = std::iter::once(value)
                .chain(continuation.iter().map(|l| l.trim()))
                .filter(|s| !s.is_empty())
                .collect();
            FieldValue::Scalar(unquote(&parts.join("\n")))
        };

        fm.insert(key.to_string(), parsed);
        i = end;
    }

    Ok(fm)
}

/// Split into fields and body in one step.
pub fn parse(content: &str, path: &Path) -> Result<(FrontMatter, String)> {
    let (lines, first_line, body) = split(content, path)?;
    let fm = parse_fields(&lines, first_line, path)?;
    Ok((fm, body))
}

/// Split `s` on `sep` characters that sit outside parentheses, brackets and
/// quotes. Empty pieces are dropped.
pub(crate) fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in s.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {},
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && is_sep(c) => {
                push_piece(&mut out, &current);
                current.clear();
                continue;
            },
            _ => {},
        }
        current.push(c);
    }
    push_piece(&mut out, &current);
    out
}

fn push_piece(out: &mut Vec<String>, piece: &str) {
    let piece = unquote(piece.trim());
    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Leading whitespace, in characters.
fn indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Whether `line` continues the value of the key above it. Column-0 dash
/// items only continue an empty value.
fn belongs_to_value(line: &str, value: &str) -> bool {
    line.trim().is_empty() || indent(line) > 0 || (value.is_empty() && is_dash_item(line))
}

fn is_dash_item(line: &str) -> bool {
    let t = line.trim();
    t == "-" || t.starts_with("- ")
}

fn trim_trailing_blank<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let keep = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |p| p + 1);
    &lines[..keep]
}

fn is_block_indicator(value: &str) -> bool {
    matches!(value, "|" | ">" | "|-" | "|+" | ">-" | ">+")
}

fn is_dash_list(lines: &[&str]) -> bool {
    let mut items = lines.iter().filter(|l| !l.trim().is_empty());
    let mut any = false;
    let all = items.all(|l| {
        any = true;
        is_dash_item(l)
    });
    any && all
}

fn block_scalar(lines: &[&str]) -> String {
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            l.char_indices()
                .nth(min_indent)
                .map_or("", |(at, _)| &l[at..])
                .trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Items of `[a, b]`, or `None` unless the opening bracket closes on the
/// last character.
fn bracket_list(s: &str) -> Option<Vec<String>> {
    let s = s.trim();
    let close = matching_close(s)?;
    (close == s.len() - 1).then(|| split_top_level(&s[1..close], |c| c == ','))
}

/// Byte offset of the `]` closing the `[` that starts `s`.
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (at, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {},
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(at);
                }
            },
            _ => {},
        }
    }
    None
}

fn unquote(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == b'"' && last == b'"' {
            return s[1..s.len() - 1].replace("\\\"", "\"").replace("\\\\", "\\");
        }
        if first == b'\'' && last == b'\'' {
            return s[1..s.len() - 1].replace("''", "'");
        }
    }
    s.to_string()
}
