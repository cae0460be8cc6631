//! CLI commands: expand one document, or check every page in the catalog.
//!
//! The expansion walk is depth-first: each `include::` line is replaced by
//! the resolved content, which is itself re-scanned for directives. Xref
//! macros are rewritten in a second pass, after the document's anchor
//! registry has been filled by all inclusions.

use std::path::Path;
use std::process::ExitCode;

use regex::{Captures, Regex};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::diagnostics::{CountingLogger, Location, Logger as _, Severity};
use crate::error::Error;
use crate::filter;
use crate::include::{IncludeDirective, IncludeResolution, Includer};
use crate::selector::IncludeOptions;
use crate::types::TargetContext;
use crate::xref;

/// Expand one document and write the result to stdout or a file.
///
/// # Errors
///
/// Returns errors from config loading, catalog scanning, or writing the
/// output. Broken includes and references inside the document degrade to
/// placeholders and only affect the exit code.
pub fn expand(root: &Path, file: &Path, output: Option<&Path>) -> Result<ExitCode, Error> {
    let config = Config::load(root)?;
    let catalog = Catalog::scan(root, &config)?;
    let Some(context) = catalog.context_for_path(file) else {
        return Err(Error::DocumentNotInCatalog { path: file.to_path_buf() });
    };

    let logger = CountingLogger::new();
    let expanded = expand_document(&catalog, &config, &context, &logger);
    let text = expanded.join("\n");
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n"))?,
        None => println!("{text}"),
    }
    Ok(exit_code(&logger))
}

/// Expand every page in the catalog, reporting broken includes and
/// references without writing any output.
///
/// # Errors
///
/// Returns errors from config loading or catalog scanning.
pub fn check(root: &Path) -> Result<ExitCode, Error> {
    let config = Config::load(root)?;
    let catalog = Catalog::scan(root, &config)?;

    let logger = CountingLogger::new();
    let pages = catalog.pages();
    for page in &pages {
        let _ = expand_document(&catalog, &config, page, &logger);
    }

    let total = pages.len();
    if logger.errors() > 0 || logger.warnings() > 0 {
        println!(
            "{} errors, {} warnings across {total} pages",
            logger.errors(),
            logger.warnings()
        );
    } else {
        println!("All {total} pages expand cleanly");
    }
    Ok(exit_code(&logger))
}

/// Exit code priority: errors (2) > warnings (1) > clean (0).
fn exit_code(logger: &CountingLogger) -> ExitCode {
    if logger.errors() > 0 {
        ExitCode::from(2)
    } else if logger.warnings() > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Fully expand one top-level document: includes first (filling the
/// anchor registry), then xref rewriting against that registry.
fn expand_document(
    catalog: &Catalog,
    config: &Config,
    context: &TargetContext,
    logger: &CountingLogger,
) -> Vec<String> {
    let Some(source) = catalog.read(context) else {
        logger.log(
            Severity::Error,
            &format!("cannot read source file: {}", context.label()),
            &Location { file: context.label(), line: None },
        );
        return Vec::new();
    };

    let mut expander = Expander::new(catalog, config, logger);
    let lines: Vec<String> = filter::split_lines(&source).into_iter().map(String::from).collect();
    let mut out = Vec::new();
    expander.walk(&lines, 1, context, &context.label(), 0, &mut out);
    expander.rewrite_xrefs(&out, context)
}

/// Walk state for one top-level document.
struct Expander<'a> {
    catalog: &'a Catalog,
    include_rx: Regex,
    includer: Includer<'a>,
    logger: &'a CountingLogger,
    site_url: &'a str,
    xref_rx: Regex,
}

impl<'a> Expander<'a> {
    fn new(catalog: &'a Catalog, config: &'a Config, logger: &'a CountingLogger) -> Self {
        Self {
            catalog,
            include_rx: Regex::new(r"^include::([^\s\[\]]+)\[(.*)\]$").expect("valid regex"),
            includer: Includer::new(catalog, logger, config.max_include_depth),
            logger,
            site_url: &config.site_url,
            xref_rx: Regex::new(r"xref:([^\s\[\]]+)\[([^\]]*)\]").expect("valid regex"),
        }
    }

    /// Replace include directives in `lines` depth-first, appending the
    /// result to `out`. `start_line` is the number of the first line
    /// within its source file, so nested diagnostics point at real lines.
    fn walk(
        &mut self,
        lines: &[String],
        start_line: u32,
        from: &TargetContext,
        file_label: &str,
        depth: u32,
        out: &mut Vec<String>,
    ) {
        for (offset, line) in lines.iter().enumerate() {
            let offset = u32::try_from(offset).unwrap_or(u32::MAX);
            let line_number = start_line.saturating_add(offset);
            let Some(captures) = self.include_rx.captures(line) else {
                out.push(line.clone());
                continue;
            };

            let directive = IncludeDirective {
                options: IncludeOptions::from_attrlist(&captures[2]),
                target: captures[1].to_string(),
            };
            let location = Location::at(file_label, line_number);
            match self
                .includer
                .resolve_directive(&directive, from, &location, depth)
            {
                IncludeResolution::Expanded { content, context } => {
                    let label = context.label();
                    self.walk(
                        &content.lines,
                        content.start_line,
                        &context,
                        &label,
                        depth.saturating_add(1),
                        out,
                    );
                },
                IncludeResolution::Skipped => {},
                IncludeResolution::Unresolved { placeholder } => out.push(placeholder),
            }
        }
    }

    /// Rewrite `xref:target[text]` macros into `link:href[text]`, routing
    /// each through the resolver and this document's anchor registry.
    fn rewrite_xrefs(&self, lines: &[String], from: &TargetContext) -> Vec<String> {
        let location = Location { file: from.label(), line: None };
        lines
            .iter()
            .map(|line| {
                if !line.contains("xref:") {
                    return line.clone();
                }
                self.xref_rx
                    .replace_all(line, |captures: &Captures<'_>| {
                        let text = &captures[2];
                        let link = xref::convert_page_ref(
                            &captures[1],
                            (!text.is_empty()).then_some(text),
                            from,
                            self.includer.registry(),
                            self.catalog,
                            self.site_url,
                            self.logger,
                            &location,
                        );
                        format!("link:{}[{}]", link.target, link.content)
                    })
                    .into_owned()
            })
            .collect()
    }
}
