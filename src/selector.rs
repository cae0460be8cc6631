//! Parsing of include directive options into a typed region selector.
//!
//! A directive carries at most one selector. `lines` takes precedence over
//! tag options whenever it yields a selection (even an empty one); a `tag`
//! key shadows `tags` entirely, even when its own value is unusable.

use std::collections::BTreeMap;

/// Options attached to an include directive. Recognized keys are `lines`,
/// `tag`, and `tags`; anything else is preserved opaquely in `extra` and
/// never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeOptions {
    /// Unrecognized options, passed through untouched.
    pub extra: BTreeMap<String, String>,
    /// Raw `lines` option value.
    pub lines: Option<String>,
    /// Raw `tag` option value.
    pub tag: Option<String>,
    /// Raw `tags` option value.
    pub tags: Option<String>,
}

impl IncludeOptions {
    /// Parse a directive attribute list such as `lines="1..3,7..",indent=0`.
    /// Pairs are comma-separated; double-quoted values may contain commas.
    /// A pair without `=` becomes a key with an empty value.
    pub fn from_attrlist(raw: &str) -> Self {
        let mut options = Self::default();
        for pair in split_attrlist(raw) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), unquote(value.trim())),
                None => (pair.trim(), String::new()),
            };
            match key {
                "" => {},
                "lines" => options.lines = Some(value),
                "tag" => options.tag = Some(value),
                "tags" => options.tags = Some(value),
                other => {
                    options.extra.insert(other.to_string(), value);
                },
            }
        }
        options
    }
}

/// Split an attribute list on commas, honoring double quotes.
fn split_attrlist(raw: &str) -> Vec<String> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in raw.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => pairs.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        pairs.push(current);
    }
    pairs
}

/// Strip one pair of surrounding double quotes, if present.
fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// The typed representation of which lines of a target file to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelector {
    /// Select by explicit line numbers.
    Lines(LineSelection),
    /// Select by named tag regions.
    Tags(TagSelection),
}

/// Line numbers to select: ascending, de-duplicated. `open_ended` selects
/// every line after the last explicit number. Empty with `open_ended`
/// false means "select nothing" — distinct from having no selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSelection {
    /// Requested line numbers, sorted ascending without duplicates.
    pub numbers: Vec<u32>,
    /// Select to end of file once the last number is consumed.
    pub open_ended: bool,
}

/// Tag inclusion rules: `true` includes a region, `false` excludes it.
/// The meta-names `**` (default for untagged lines plus unknown-tag
/// fallback) and `*` (unknown-tag fallback only) stay in `rules` until the
/// filter interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelection {
    /// Requested tag names mapped to include/exclude.
    pub rules: BTreeMap<String, bool>,
}

/// Classify directive options into a selector, or `None` to include the
/// whole file.
pub fn selector(options: &IncludeOptions) -> Option<RegionSelector> {
    if let Some(raw) = &options.lines
        && let Some(selection) = parse_line_selection(raw)
    {
        return Some(RegionSelector::Lines(selection));
    }
    if let Some(raw) = &options.tag {
        return parse_single_tag(raw).map(RegionSelector::Tags);
    }
    if let Some(raw) = &options.tags {
        return parse_tag_list(raw).map(RegionSelector::Tags);
    }
    None
}

/// Parse a `lines` value: comma- or semicolon-separated tokens, each a
/// positive integer or an `A..B` range. Returns `None` when the value holds
/// no tokens at all; returns an empty selection when tokens were present
/// but every one was dropped.
fn parse_line_selection(raw: &str) -> Option<LineSelection> {
    let tokens: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split(';').collect()
    };

    let mut numbers: Vec<u32> = Vec::new();
    let mut open_ended = false;
    let mut any_token = false;
    for token in tokens.into_iter().filter(|t| !t.is_empty()) {
        any_token = true;
        if let Some((from_raw, to_raw)) = token.split_once("..") {
            let Some(from) = parse_positive(from_raw) else {
                continue;
            };
            match to_raw.parse::<i64>() {
                Ok(to) if to > 0 => {
                    let to = u32::try_from(to).unwrap_or(u32::MAX);
                    if to >= from {
                        numbers.extend(from..=to);
                    }
                },
                // Zero, empty, and non-numeric bounds all mean "to end".
                Ok(0) | Err(_) => {
                    numbers.push(from);
                    open_ended = true;
                },
                // A negative bound discards the range.
                Ok(_) => {},
            }
        } else if let Some(number) = parse_positive(token) {
            numbers.push(number);
        }
    }

    if !numbers.is_empty() {
        numbers.sort_unstable();
        numbers.dedup();
        return Some(LineSelection { numbers, open_ended });
    }
    any_token.then(|| LineSelection {
        numbers: Vec::new(),
        open_ended: false,
    })
}

/// Parse a token as a strictly positive integer.
fn parse_positive(token: &str) -> Option<u32> {
    token.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parse a single `tag` value. The bare value `!` means "no selector".
fn parse_single_tag(raw: &str) -> Option<TagSelection> {
    if raw.is_empty() || raw == "!" {
        return None;
    }
    let mut rules = BTreeMap::new();
    insert_rule(&mut rules, raw);
    Some(TagSelection { rules })
}

/// Parse a `tags` list: comma- or semicolon-separated, per-token negation;
/// tokens equal to `!` are ignored. `None` when every token is ignored.
fn parse_tag_list(raw: &str) -> Option<TagSelection> {
    let tokens: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split(';').collect()
    };

    let mut rules = BTreeMap::new();
    for token in tokens {
        if token.is_empty() || token == "!" {
            continue;
        }
        insert_rule(&mut rules, token);
    }
    if rules.is_empty() {
        return None;
    }
    Some(TagSelection { rules })
}

/// Record one tag rule; a leading `!` negates. Later entries override
/// earlier ones for the same name.
fn insert_rule(rules: &mut BTreeMap<String, bool>, token: &str) {
    match token.strip_prefix('!') {
        Some(name) => rules.insert(name.to_string(), false),
        None => rules.insert(token.to_string(), true),
    };
}
