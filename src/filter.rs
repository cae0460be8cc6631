//! Pure line filters for included files.
//!
//! Both filters take the raw contents of the target file and produce the
//! selected lines plus the one-based number of the first selected line.
//! The tag filter additionally returns its warnings as values; the caller
//! owns logging, so the state machine stays testable on its own.

use regex::Regex;

use crate::selector::{LineSelection, TagSelection};
use crate::types::IncludedContent;

/// Split on any line-ending convention. A trailing newline yields a final
/// empty line, so line numbers stay stable across rewrites.
pub fn split_lines(contents: &str) -> Vec<&str> {
    let newline = Regex::new(r"\r\n?|\n").expect("valid regex");
    newline.split(contents).collect()
}

/// Include the whole file, unfiltered.
pub fn whole_file(contents: &str) -> IncludedContent {
    IncludedContent {
        lines: split_lines(contents).into_iter().map(String::from).collect(),
        start_line: 1,
    }
}

/// Select lines by number. Once the requested numbers are exhausted the
/// scan stops early, unless the selection is open-ended, in which case
/// every remaining line is selected.
pub fn by_line_numbers(contents: &str, selection: &LineSelection) -> IncludedContent {
    let mut remaining = selection.numbers.iter().copied().peekable();
    let mut lines: Vec<String> = Vec::new();
    let mut start_line: Option<u32> = None;
    let mut select_rest = false;
    let mut line_number = 0u32;

    for line in split_lines(contents) {
        line_number = line_number.saturating_add(1);
        if select_rest {
            start_line.get_or_insert(line_number);
            lines.push(line.to_string());
            continue;
        }
        match remaining.peek() {
            Some(&next) if next == line_number => {
                remaining.next();
                start_line.get_or_insert(line_number);
                lines.push(line.to_string());
            },
            Some(_) => {},
            None => {
                if !selection.open_ended {
                    break;
                }
                select_rest = true;
                start_line.get_or_insert(line_number);
                lines.push(line.to_string());
            },
        }
    }

    IncludedContent {
        lines,
        start_line: start_line.unwrap_or(1),
    }
}

/// A recoverable problem noticed while scanning tag regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWarning {
    /// An end marker closed a requested tag that was not the active one.
    MismatchedEnd {
        /// Tag that was active when the marker appeared.
        expected: String,
        /// Tag named by the end marker.
        found: String,
        /// Line of the end marker in the included file.
        line: u32,
    },
    /// Requested tags that never appeared in the file.
    NotFound {
        /// The missing tag names.
        tags: Vec<String>,
    },
    /// A tag region was still open at end of file.
    Unclosed {
        /// Line of the start marker in the included file.
        line: u32,
        /// The unclosed tag name.
        tag: String,
    },
    /// An end marker for a requested tag that was never opened.
    UnexpectedEnd {
        /// Line of the end marker in the included file.
        line: u32,
        /// Tag named by the end marker.
        tag: String,
    },
}

impl TagWarning {
    /// Render the warning for the log, naming the included file.
    pub fn message(&self, file: &str) -> String {
        match self {
            TagWarning::MismatchedEnd { expected, found, line } => format!(
                "mismatched end tag (expected '{expected}' but found '{found}') \
                 at line {line} of include file: {file}"
            ),
            TagWarning::NotFound { tags } => format!(
                "tag{} '{}' not found in include file: {file}",
                if tags.len() > 1 { "s" } else { "" },
                tags.join(", ")
            ),
            TagWarning::Unclosed { line, tag } => format!(
                "detected unclosed tag '{tag}' starting at line {line} of include file: {file}"
            ),
            TagWarning::UnexpectedEnd { line, tag } => {
                format!("unexpected end tag '{tag}' at line {line} of include file: {file}")
            },
        }
    }
}

/// Select lines by tag region. Marker lines are never part of the output.
///
/// Setup: `**` sets the default state for untagged lines and, absent an
/// explicit `*`, the unknown-tag fallback as well. Without `**`, untagged
/// lines default to included only when the caller named no inclusions —
/// "exclude these tags, keep everything else" works without naming every
/// other tag.
pub fn by_tags(contents: &str, selection: &TagSelection) -> (IncludedContent, Vec<TagWarning>) {
    let mut rules = selection.rules.clone();
    let selecting_default;
    let wildcard: Option<bool>;
    if let Some(all) = rules.remove("**") {
        selecting_default = all;
        wildcard = Some(rules.remove("*").unwrap_or(all));
    } else {
        selecting_default = !rules.values().any(|&include| include);
        wildcard = rules.remove("*");
    }

    // Cheap pre-filter: a marker line must contain both `::` and `[]`.
    let marker = Regex::new(r"\b(?:tag|(end))::(\S+?)\[\](?: |\r|$)").expect("valid regex");

    let mut lines: Vec<String> = Vec::new();
    let mut warnings: Vec<TagWarning> = Vec::new();
    // Innermost entry last: (tag, selecting, start line).
    let mut stack: Vec<(String, bool, u32)> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut selecting = selecting_default;
    let mut start_line: Option<u32> = None;
    let mut line_number = 0u32;

    for line in split_lines(contents) {
        line_number = line_number.saturating_add(1);
        let captures = if line.contains("::") && line.contains("[]") {
            marker.captures(line)
        } else {
            None
        };
        let Some(captures) = captures else {
            if selecting {
                start_line.get_or_insert(line_number);
                lines.push(line.to_string());
            }
            continue;
        };

        let this_tag = &captures[2];
        if captures.get(1).is_some() {
            // End marker.
            if stack.last().is_some_and(|(name, _, _)| name == this_tag) {
                stack.pop();
                selecting = stack.last().map_or(selecting_default, |&(_, state, _)| state);
            } else if rules.contains_key(this_tag) {
                // A requested tag ended out of order; selection state is
                // left untouched either way.
                if let Some(index) = stack.iter().rposition(|(name, _, _)| name == this_tag) {
                    let expected = stack.last().map(|(name, _, _)| name.clone()).unwrap_or_default();
                    stack.remove(index);
                    warnings.push(TagWarning::MismatchedEnd {
                        expected,
                        found: this_tag.to_string(),
                        line: line_number,
                    });
                } else {
                    warnings.push(TagWarning::UnexpectedEnd {
                        line: line_number,
                        tag: this_tag.to_string(),
                    });
                }
            }
        } else if let Some(&rule) = rules.get(this_tag) {
            seen.push(this_tag.to_string());
            selecting = rule;
            stack.push((this_tag.to_string(), rule, line_number));
        } else if let Some(wildcard) = wildcard {
            // Nesting under an excluded region stays excluded regardless
            // of the wildcard value.
            selecting = if !stack.is_empty() && !selecting { false } else { wildcard };
            stack.push((this_tag.to_string(), selecting, line_number));
        }
    }

    for (tag, _, line) in stack.iter().rev() {
        warnings.push(TagWarning::Unclosed {
            line: *line,
            tag: tag.clone(),
        });
    }

    let missing: Vec<String> = rules
        .keys()
        .filter(|name| !seen.iter().any(|s| s == *name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        warnings.push(TagWarning::NotFound { tags: missing });
    }

    (
        IncludedContent {
            lines,
            start_line: start_line.unwrap_or(1),
        },
        warnings,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::selector::{LineSelection, TagSelection};

    fn numbered_file(count: u32) -> String {
        (1..=count).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n")
    }

    fn line_selection(numbers: &[u32], open_ended: bool) -> LineSelection {
        LineSelection {
            numbers: numbers.to_vec(),
            open_ended,
        }
    }

    fn tag_selection(rules: &[(&str, bool)]) -> TagSelection {
        let mut map = BTreeMap::new();
        for (name, include) in rules {
            map.insert((*name).to_string(), *include);
        }
        TagSelection { rules: map }
    }

    #[test]
    fn range_selects_exact_lines_in_order() {
        let content = by_line_numbers(&numbered_file(6), &line_selection(&[2, 3, 4], false));
        assert_eq!(content.lines, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(content.start_line, 2);
    }

    #[test]
    fn open_ended_selects_through_end_of_file() {
        let content = by_line_numbers(&numbered_file(7), &line_selection(&[5], true));
        assert_eq!(content.lines, vec!["line 5", "line 6", "line 7"]);
        assert_eq!(content.start_line, 5);
    }

    #[test]
    fn combined_ranges_on_ten_line_file() {
        let content =
            by_line_numbers(&numbered_file(10), &line_selection(&[1, 2, 3, 7], true));
        let expected: Vec<String> = [1, 2, 3, 7, 8, 9, 10]
            .iter()
            .map(|n| format!("line {n}"))
            .collect();
        assert_eq!(content.lines, expected);
        assert_eq!(content.start_line, 1);
    }

    #[test]
    fn empty_selection_selects_nothing() {
        let content = by_line_numbers(&numbered_file(4), &line_selection(&[], false));
        assert!(content.lines.is_empty());
        assert_eq!(content.start_line, 1);
    }

    #[test]
    fn numbers_past_end_of_file_select_nothing() {
        let content = by_line_numbers(&numbered_file(3), &line_selection(&[9], false));
        assert!(content.lines.is_empty());
        assert_eq!(content.start_line, 1);
    }

    #[test]
    fn splits_on_carriage_returns_too() {
        let content = by_line_numbers("a\r\nb\rc\nd", &line_selection(&[2, 3], false));
        assert_eq!(content.lines, vec!["b", "c"]);
    }

    const TAGGED: &str = "\
untagged head
// tag::intro[]
intro one
intro two
// end::intro[]
// tag::setup[]
setup body
// end::setup[]
untagged tail";

    #[test]
    fn single_tag_selects_region_without_markers() {
        let (content, warnings) = by_tags(TAGGED, &tag_selection(&[("intro", true)]));
        assert_eq!(content.lines, vec!["intro one", "intro two"]);
        assert_eq!(content.start_line, 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn exclusions_only_keep_untagged_lines() {
        // Only exclusions named: unmarked lines default to included.
        let (content, warnings) = by_tags(TAGGED, &tag_selection(&[("setup", false)]));
        assert_eq!(
            content.lines,
            vec!["untagged head", "intro one", "intro two", "untagged tail"]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn mixed_inclusion_and_exclusion() {
        // An inclusion was named, so untagged lines default to excluded.
        let (content, _) = by_tags(TAGGED, &tag_selection(&[("intro", true), ("setup", false)]));
        assert_eq!(content.lines, vec!["intro one", "intro two"]);
        assert_eq!(content.start_line, 3);
    }

    #[test]
    fn default_all_meta_tag_includes_untagged_lines() {
        let (content, _) = by_tags(TAGGED, &tag_selection(&[("**", true), ("setup", false)]));
        assert_eq!(
            content.lines,
            vec!["untagged head", "intro one", "intro two", "untagged tail"]
        );
    }

    #[test]
    fn explicit_wildcard_overrides_the_default_all_fallback() {
        // `**` keeps untagged lines while `*` drops unknown tag regions.
        let mixed = "\
untagged head
// tag::extra[]
extra line
// end::extra[]
untagged tail";
        let (content, warnings) = by_tags(mixed, &tag_selection(&[("**", true), ("*", false)]));
        assert_eq!(content.lines, vec!["untagged head", "untagged tail"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn wildcard_fallback_under_excluded_ancestor_stays_excluded() {
        let nested = "\
// tag::outer[]
outer line
// tag::inner[]
inner line
// end::inner[]
// end::outer[]";
        let (content, _) =
            by_tags(nested, &tag_selection(&[("outer", false), ("*", true)]));
        assert!(content.lines.is_empty());
    }

    #[test]
    fn wildcard_selects_unknown_tags_at_top_level() {
        let nested = "\
// tag::inner[]
inner line
// end::inner[]
loose line";
        let (content, _) = by_tags(nested, &tag_selection(&[("other", true), ("*", true)]));
        assert_eq!(content.lines, vec!["inner line"]);
    }

    #[test]
    fn unclosed_tag_warns_once_per_open_entry() {
        let unclosed = "\
// tag::a[]
a line
// tag::b[]
b line";
        let (content, warnings) =
            by_tags(unclosed, &tag_selection(&[("a", true), ("b", true)]));
        assert_eq!(content.lines, vec!["a line", "b line"]);
        // Innermost first.
        assert_eq!(
            warnings,
            vec![
                TagWarning::Unclosed { line: 3, tag: "b".to_string() },
                TagWarning::Unclosed { line: 1, tag: "a".to_string() },
            ]
        );
    }

    #[test]
    fn mismatched_end_tag_warns_and_keeps_selecting_state() {
        let crossed = "\
// tag::a[]
a line
// tag::b[]
b line
// end::a[]
still b
// end::b[]";
        let (content, warnings) =
            by_tags(crossed, &tag_selection(&[("a", true), ("b", true)]));
        assert_eq!(content.lines, vec!["a line", "b line", "still b"]);
        assert_eq!(
            warnings,
            vec![TagWarning::MismatchedEnd {
                expected: "b".to_string(),
                found: "a".to_string(),
                line: 5,
            }]
        );
    }

    #[test]
    fn unexpected_end_tag_warns() {
        let stray = "body\n// end::ghost[]\ntail";
        let (content, warnings) = by_tags(stray, &tag_selection(&[("ghost", false)]));
        assert_eq!(content.lines, vec!["body", "tail"]);
        assert_eq!(
            warnings,
            vec![TagWarning::UnexpectedEnd { line: 2, tag: "ghost".to_string() }]
        );
    }

    #[test]
    fn missing_tags_reported_once_pluralized() {
        let (content, warnings) = by_tags("plain\n", &tag_selection(&[("a", true), ("b", true)]));
        assert!(content.lines.is_empty());
        let Some(TagWarning::NotFound { tags }) = warnings.last() else {
            panic!("expected a not-found warning");
        };
        assert_eq!(tags, &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            warnings.last().map(|w| w.message("f.adoc")),
            Some("tags 'a, b' not found in include file: f.adoc".to_string())
        );
    }

    #[test]
    fn unknown_end_tags_are_ignored_silently() {
        let content = "\
// tag::keep[]
kept
// end::keep[]
// end::other[]";
        let (filtered, warnings) = by_tags(content, &tag_selection(&[("keep", true)]));
        assert_eq!(filtered.lines, vec!["kept"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn repeated_runs_share_no_state() {
        let selection = tag_selection(&[("intro", true)]);
        let (first, first_warnings) = by_tags(TAGGED, &selection);
        let (second, second_warnings) = by_tags(TAGGED, &selection);
        assert_eq!(first, second);
        assert_eq!(first_warnings, second_warnings);
    }
}
