//! Core domain types for resolved targets, page references, and link results.

/// Content family a resolved file belongs to. Only `Page` participates in
/// anchor assignment; the other families are spliced without bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    /// Reusable snippets under `examples/`.
    Example,
    /// Publishable documents under `pages/`.
    Page,
    /// Include-only fragments under `partials/`.
    Partial,
}

/// Logical location of a resolved file, independent of its disk path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    /// Component the file belongs to.
    pub component: String,
    /// Content family of the file.
    pub family: FamilyKind,
    /// Module the file belongs to.
    pub module: String,
    /// Path relative to the family directory, `/`-separated.
    pub relative: String,
    /// Component version.
    pub version: String,
}

impl TargetContext {
    /// Short human-readable label used in diagnostics.
    pub fn label(&self) -> String {
        format!("{}:{}", self.module, self.relative)
    }

    /// Composite key identifying this file in the anchor registry.
    pub fn signature(&self) -> String {
        format!(
            "{}@{}:{}:{}",
            self.version, self.component, self.module, self.relative
        )
    }
}

/// A file resolved from an include target: raw contents plus its context.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Raw text of the file.
    pub contents: String,
    /// Logical location of the file.
    pub context: TargetContext,
    /// Display path of the file, used in filter warnings.
    pub path: String,
}

/// The lines selected from an included file, and where they started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedContent {
    /// Selected lines, in file order.
    pub lines: Vec<String>,
    /// One-based line number of the first selected line (1 if none).
    pub start_line: u32,
}

/// A page reference split into its page ID and optional fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    /// Fragment identifier after the first `#`, when present and non-empty.
    pub fragment: Option<String>,
    /// Page ID portion before the first `#`.
    pub page_id: String,
}

impl ReferenceSpec {
    /// Split a raw reference on the first `#`. An empty fragment counts
    /// as no fragment.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('#') {
            Some((page_id, fragment)) => Self {
                fragment: (!fragment.is_empty()).then(|| fragment.to_string()),
                page_id: page_id.to_string(),
            },
            None => Self {
                fragment: None,
                page_id: raw.to_string(),
            },
        }
    }
}

/// Everything needed to build a link for a page reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefLink {
    /// Link text.
    pub content: String,
    /// True when the link points into the current composite document.
    pub internal: bool,
    /// The href.
    pub target: String,
    /// True when the reference could not be resolved.
    pub unresolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_without_fragment() {
        let spec = ReferenceSpec::parse("setup.adoc");
        assert_eq!(spec.page_id, "setup.adoc");
        assert_eq!(spec.fragment, None);
    }

    #[test]
    fn reference_with_fragment() {
        let spec = ReferenceSpec::parse("setup.adoc#install");
        assert_eq!(spec.page_id, "setup.adoc");
        assert_eq!(spec.fragment, Some("install".to_string()));
    }

    #[test]
    fn fragment_splits_on_first_hash_only() {
        let spec = ReferenceSpec::parse("setup.adoc#a#b");
        assert_eq!(spec.page_id, "setup.adoc");
        assert_eq!(spec.fragment, Some("a#b".to_string()));
    }

    #[test]
    fn empty_fragment_is_none() {
        let spec = ReferenceSpec::parse("setup.adoc#");
        assert_eq!(spec.fragment, None);
    }

    #[test]
    fn signature_format() {
        let context = TargetContext {
            component: "handbook".to_string(),
            family: FamilyKind::Page,
            module: "ROOT".to_string(),
            relative: "guides/setup.adoc".to_string(),
            version: "1.0".to_string(),
        };
        assert_eq!(context.signature(), "1.0@handbook:ROOT:guides/setup.adoc");
    }
}
