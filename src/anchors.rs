//! Per-document anchor bookkeeping for inlined page fragments.
//!
//! One registry lives for one top-level document's full inclusion tree.
//! When a page is inlined, the fragment gets an anchor — an explicit
//! leading `[[id]]` when the content already carries one, otherwise a
//! synthetic `xref-<n>` prepended to the fragment — and the page's
//! signature is recorded so later references can link to the fragment
//! instead of the unreachable original page.

use std::collections::HashMap;

use regex::Regex;

/// Build-scoped map from a file's location signature to the anchor it was
/// given when inlined. Entries are added only, never removed; the last
/// write wins when the same signature recurs.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    counter: u32,
    entries: HashMap<String, String>,
}

impl AnchorRegistry {
    /// An empty registry for a fresh top-level document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an anchor to an inlined fragment and record it under the
    /// target's signature. An explicit `[[id]]` at the very start of the
    /// fragment is reused; otherwise a synthetic id is prepended as a new
    /// first line. The counter advances on every synthesis, so including
    /// the same page twice yields two distinct anchors.
    pub fn assign(&mut self, signature: String, lines: &mut Vec<String>) -> String {
        let anchor = match lines.first().and_then(|line| leading_anchor_id(line)) {
            Some(explicit) => explicit,
            None => {
                let synthetic = format!("xref-{}", self.counter);
                self.counter = self.counter.saturating_add(1);
                lines.insert(0, format!("[[{synthetic}]]"));
                synthetic
            },
        };
        self.entries.insert(signature, anchor.clone());
        anchor
    }

    /// Anchor recorded for a signature, if that file was inlined somewhere
    /// in the current document.
    pub fn lookup(&self, signature: &str) -> Option<&str> {
        self.entries.get(signature).map(String::as_str)
    }
}

/// Extract the identifier from an explicit `[[id]]` marker at the start of
/// a line.
fn leading_anchor_id(line: &str) -> Option<String> {
    let marker = Regex::new(r"^\[\[(.*?)\]\]").expect("valid regex");
    marker.captures(line).map(|captures| captures[1].to_string())
}
