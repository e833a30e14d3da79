use std::path::Path;

use crate::{
    error::{Error, Result},
    frontmatter::{self, FieldValue, FrontMatter, split_top_level},
};

/// Maximum skill name length.
pub const MAX_NAME_LEN: usize = 64;

/// Keys with a dedicated field on [`ParsedSkill`]; everything else lands in `extra`.
const KNOWN_KEYS: &[&str] = &[
    "name",
    "description",
    "allowed-tools",
    "allowed_tools",
    "license",
    "compatibility",
];

/// Validated front matter plus body of one `SKILL.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSkill {
    pub name: String,
    pub description: String,
    pub allowed_tools: Vec<String>,
    pub license: Option<String>,
    pub compatibility: Option<String>,
    pub extra: FrontMatter,
    pub body: String,
}

/// Validate a skill name: lowercase ASCII, hyphens, 1-64 chars.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == ':')
        && !name.starts_with(['-', ':'])
        && !name.ends_with(['-', ':'])
        && !name.contains("--")
        && !name.contains("::")
}

/// Split an `allowed-tools` scalar into tool identifiers.
///
/// Commas separate entries when present; otherwise whitespace does. Separators
/// inside parentheses (`Bash(git add:*)`) or quotes never split.
pub fn parse_tool_list(raw: &str) -> Vec<String> {
    let has_top_level_comma = split_top_level(raw, |c| c == ',').len() > 1
        || raw.trim().ends_with(',')
        || raw.trim().starts_with(',');
    if has_top_level_comma {
        split_top_level(raw, |c| c == ',')
    } else {
        split_top_level(raw, char::is_whitespace)
    }
}

/// Parse and validate a `SKILL.md`.
///
/// `skill_md` only labels errors. With `check_name` set, names must pass
/// [`validate_name`].
pub fn parse_skill(content: &str, skill_md: &Path, check_name: bool) -> Result<ParsedSkill> {
    let (fm, body) = frontmatter::parse(content, skill_md)?;

    let name = required_scalar(&fm, "name", skill_md)?;
    let description = required_scalar(&fm, "description", skill_md)?;
    if check_name && !validate_name(&name) {
        return Err(Error::InvalidName {
            path: skill_md.to_path_buf(),
            name,
        });
    }

    let allowed_tools = match fm.get("allowed-tools").or_else(|| fm.get("allowed_tools")) {
        None => Vec::new(),
        Some(FieldValue::Scalar(raw)) => dedup(parse_tool_list(raw)),
        Some(FieldValue::List(items)) => dedup(
            items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ),
    };

    Ok(ParsedSkill {
        name,
        description,
        allowed_tools,
        license: optional_scalar(&fm, "license"),
        compatibility: optional_scalar(&fm, "compatibility"),
        extra: fm.without(KNOWN_KEYS),
        body,
    })
}

fn required_scalar(fm: &FrontMatter, field: &'static str, path: &Path) -> Result<String> {
    match fm.get(field) {
        Some(FieldValue::List(_)) => Err(Error::malformed(
            path,
            format!("'{field}' must be a single value, not a list"),
        )),
        _ => fm
            .scalar(field)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::missing_field(path, field)),
    }
}

fn optional_scalar(fm: &FrontMatter, field: &str) -> Option<String> {
    fm.scalar(field)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
