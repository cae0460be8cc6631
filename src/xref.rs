//! Cross-reference resolution against the per-document anchor registry.
//!
//! A reference to a page that was inlined somewhere in the current
//! composite document is redirected to the fragment's local anchor; an
//! explicit fragment always wins over that redirection. Everything else
//! links to the published page on the site.

use crate::anchors::AnchorRegistry;
use crate::diagnostics::{Location, Logger, Severity};
use crate::types::{ReferenceSpec, TargetContext, XrefLink};

/// A page resolved from a page ID.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    /// Logical location of the page.
    pub context: TargetContext,
    /// Root-relative publish path, when the page is publishable.
    pub publish_url: Option<String>,
}

/// The page ID could not even be parsed — distinct from "page not found"
/// so authors can tell a typo in the ID syntax from a missing page.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidPageId(pub String);

/// Resolves a page ID to a page, relative to the referencing file.
pub trait PageResolver {
    /// `Ok(None)` signals "no such page"; `Err` signals malformed syntax.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageId` when the ID cannot be interpreted at all.
    fn resolve_page(
        &self,
        page_id: &str,
        from: &TargetContext,
    ) -> Result<Option<ResolvedPage>, InvalidPageId>;
}

/// Convert a page reference into link data.
///
/// `content` is the explicitly supplied link text, if any. Link text
/// falls back, in order, to the fragment, the registry anchor, and the
/// final href. Failures degrade to a placeholder href and are logged;
/// the build continues.
#[allow(clippy::too_many_arguments, reason = "mirrors the reference conversion contract")]
pub fn convert_page_ref(
    ref_spec: &str,
    content: Option<&str>,
    from: &TargetContext,
    registry: &AnchorRegistry,
    resolver: &dyn PageResolver,
    site_url: &str,
    logger: &dyn Logger,
    location: &Location,
) -> XrefLink {
    let spec = ReferenceSpec::parse(ref_spec);
    let hash = spec
        .fragment
        .as_ref()
        .map(|fragment| format!("#{fragment}"))
        .unwrap_or_default();

    let resolved = match resolver.resolve_page(&spec.page_id, from) {
        Ok(Some(page)) if page.publish_url.is_some() => page,
        Ok(_) => {
            logger.log(
                Severity::Error,
                &format!("unresolved page ID: {ref_spec}"),
                location,
            );
            return unresolved_link(&spec, &hash, content);
        },
        Err(err) => {
            logger.log(
                Severity::Error,
                &format!("invalid page ID syntax: {ref_spec} ({err})"),
                location,
            );
            return unresolved_link(&spec, &hash, content);
        },
    };

    let publish_url = resolved.publish_url.unwrap_or_default();
    let signature = resolved.context.signature();
    let mapped = registry.lookup(&signature).map(String::from);
    let (internal, target) = match &mapped {
        // The fragment always wins over anchor redirection.
        Some(_) if spec.fragment.is_some() => (true, hash.clone()),
        Some(anchor) => (true, format!("#{anchor}")),
        None => (false, format!("{site_url}{publish_url}{hash}")),
    };

    let content = content
        .filter(|text| !text.is_empty())
        .map(String::from)
        .or(spec.fragment)
        .or(mapped)
        .unwrap_or_else(|| target.clone());

    XrefLink {
        content,
        internal,
        target,
        unresolved: false,
    }
}

/// Placeholder link for a reference that could not be resolved.
fn unresolved_link(spec: &ReferenceSpec, hash: &str, content: Option<&str>) -> XrefLink {
    let target = format!("#{}.adoc{hash}", spec.page_id);
    let content = content
        .filter(|text| !text.is_empty())
        .map(String::from)
        .or(spec.fragment.clone())
        .unwrap_or_else(|| target.clone());
    XrefLink {
        content,
        internal: false,
        target,
        unresolved: true,
    }
}
