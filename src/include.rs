//! Inclusion directive resolution.
//!
//! Owns the side effects around the pure filters in [`crate::filter`]:
//! resolving the target through the file resolver, logging filter
//! warnings, assigning anchors to inlined pages, and degrading failures
//! to visible placeholders instead of aborting the document build.

use crate::anchors::AnchorRegistry;
use crate::diagnostics::{Location, Logger, Severity};
use crate::filter;
use crate::selector::{self, IncludeOptions, RegionSelector};
use crate::types::{FamilyKind, IncludedContent, ResolvedTarget, TargetContext};

/// One `include::target[options]` occurrence in a source document.
#[derive(Debug, Clone)]
pub struct IncludeDirective {
    /// Parsed directive options.
    pub options: IncludeOptions,
    /// Raw include target.
    pub target: String,
}

/// Resolves an include target to raw contents and context. Returning
/// `None` signals "not found".
pub trait FileResolver {
    /// Resolve `target` relative to the including file's context.
    fn resolve(&self, target: &str, from: &TargetContext) -> Option<ResolvedTarget>;
}

/// Outcome of resolving one directive.
#[derive(Debug, Clone)]
pub enum IncludeResolution {
    /// Target resolved; these lines replace the directive.
    Expanded {
        /// The selected lines and their start line in the target.
        content: IncludedContent,
        /// Context of the resolved target, for nested resolution.
        context: TargetContext,
    },
    /// Include depth exceeded; the directive contributes nothing.
    Skipped,
    /// Target missing; this placeholder line replaces the directive.
    Unresolved {
        /// Visible inline error marker.
        placeholder: String,
    },
}

/// Resolves directives for one top-level document, owning that document's
/// anchor registry.
pub struct Includer<'a> {
    logger: &'a dyn Logger,
    max_depth: u32,
    registry: AnchorRegistry,
    resolver: &'a dyn FileResolver,
}

impl<'a> Includer<'a> {
    /// An includer with a fresh registry for a new top-level document.
    pub fn new(resolver: &'a dyn FileResolver, logger: &'a dyn Logger, max_depth: u32) -> Self {
        Self {
            logger,
            max_depth,
            registry: AnchorRegistry::new(),
            resolver,
        }
    }

    /// The anchor registry filled so far, for reference resolution.
    pub fn registry(&self) -> &AnchorRegistry {
        &self.registry
    }

    /// Resolve one directive found at `location`, `depth` levels below the
    /// top-level document.
    pub fn resolve_directive(
        &mut self,
        directive: &IncludeDirective,
        from: &TargetContext,
        location: &Location,
        depth: u32,
    ) -> IncludeResolution {
        if depth >= self.max_depth {
            // Always reported, independent of how the depth was configured.
            self.logger.log(
                Severity::Error,
                &format!("maximum include depth of {} exceeded", self.max_depth),
                location,
            );
            return IncludeResolution::Skipped;
        }

        let Some(resolved) = self.resolver.resolve(&directive.target, from) else {
            self.logger.log(
                Severity::Error,
                &format!("include target not found: {}", directive.target),
                location,
            );
            return IncludeResolution::Unresolved {
                placeholder: format!(
                    "Unresolved include directive in {} - include::{}[]",
                    location.file, directive.target
                ),
            };
        };

        let mut content = self.filter_target(directive, &resolved, location);
        if resolved.context.family == FamilyKind::Page {
            self.registry
                .assign(resolved.context.signature(), &mut content.lines);
        }
        IncludeResolution::Expanded {
            content,
            context: resolved.context,
        }
    }

    /// Apply the directive's region selector to the resolved contents,
    /// logging any tag-scan warnings against the directive's location.
    fn filter_target(
        &self,
        directive: &IncludeDirective,
        resolved: &ResolvedTarget,
        location: &Location,
    ) -> IncludedContent {
        match selector::selector(&directive.options) {
            Some(RegionSelector::Lines(selection)) => {
                filter::by_line_numbers(&resolved.contents, &selection)
            },
            Some(RegionSelector::Tags(selection)) => {
                let (content, warnings) = filter::by_tags(&resolved.contents, &selection);
                for warning in &warnings {
                    self.logger
                        .log(Severity::Warn, &warning.message(&resolved.path), location);
                }
                content
            },
            None => filter::whole_file(&resolved.contents),
        }
    }
}
