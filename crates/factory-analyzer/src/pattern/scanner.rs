use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DefinitionOccurrence, UsageOccurrence};

/// `factory :user` or `factory(:user`. Whitespace never crosses a newline.
static DEFINITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"factory(?:[ \t]+|[ \t]*\([ \t]*):([a-zA-Z0-9_]+)").expect("valid definition regex"));

/// `create(:user)`, `create :user`, `build(:user, name: "x")`, `build :user, name: "x"`.
///
/// Group 1 is the clickable `:user` token. Nothing after it is consumed, so a
/// call nested in the arguments is matched on its own. Whitespace may span
/// lines.
static USAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:create|build)\s*(?:\(\s*)?(:[a-zA-Z0-9_]+)").expect("valid usage regex"));

/// Every factory definition in `text`, in document order.
///
/// Repeated names are all reported; deduplication is the index's job.
pub fn find_definitions(text: &str) -> Vec<DefinitionOccurrence> {
    DEFINITION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(DefinitionOccurrence {
                name: name.as_str().to_string(),
                offset: whole.start(),
            })
        })
        .collect()
}

/// Every `create`/`build` call site in `text`, in document order.
pub fn find_usages(text: &str) -> Vec<UsageOccurrence> {
    USAGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let token = caps.get(1)?;
            Some(UsageOccurrence {
                name: token.as_str()[1..].to_string(),
                range: token.range(),
            })
        })
        .collect()
}

/// The usage whose `:name` token contains `offset`.
///
/// The end is inclusive so a cursor resting right after the token still hits.
pub fn usage_at(
    text: &str,
    offset: usize,
) -> Option<UsageOccurrence> {
    find_usages(text).into_iter().find(|usage| usage.range.start <= offset && offset <= usage.range.end)
}

/// Zero-based line of `offset`: the number of `\n` bytes before it.
pub fn line_of_offset(
    text: &str,
    offset: usize,
) -> u32 {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u32
}

#[cfg(test)]
#[path = "../../tests/src/pattern/scanner_tests.rs"]
mod tests;
