//! Filesystem content catalog.
//!
//! Scans a docs root laid out as `modules/<module>/{pages,partials,examples}`
//! and resolves include targets and page IDs against the scanned files. This
//! is the concrete collaborator behind both resolver contracts when running
//! from the command line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::include::FileResolver;
use crate::types::{FamilyKind, ResolvedTarget, TargetContext};
use crate::xref::{InvalidPageId, PageResolver, ResolvedPage};

/// All content files found under one docs root, keyed by logical location.
pub struct Catalog {
    component: String,
    files: HashMap<(String, FamilyKind, String), PathBuf>,
    version: String,
}

impl Catalog {
    /// Scan `<root>/modules/` and index every file under a family
    /// directory. Files outside `pages/`, `partials/`, and `examples/`
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotADocsRoot` when `modules/` is missing.
    pub fn scan(root: &Path, config: &Config) -> Result<Self, Error> {
        let modules_dir = root.join("modules");
        if !modules_dir.is_dir() {
            return Err(Error::NotADocsRoot { path: root.to_path_buf() });
        }

        let mut files = HashMap::new();
        for entry in WalkDir::new(&modules_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let Ok(rel) = entry.path().strip_prefix(&modules_dir) else {
                continue;
            };
            let Some((module, family, relative)) = classify(rel) else {
                continue;
            };
            files.insert((module, family, relative), entry.path().to_path_buf());
        }

        Ok(Self {
            component: config.component.clone(),
            files,
            version: config.version.clone(),
        })
    }

    /// Map a filesystem path back into the catalog, for documents named on
    /// the command line.
    pub fn context_for_path(&self, path: &Path) -> Option<TargetContext> {
        let canonical = path.canonicalize().ok()?;
        self.files.iter().find_map(|((module, family, relative), file)| {
            let matches = file.canonicalize().is_ok_and(|f| f == canonical);
            matches.then(|| self.context(module.clone(), *family, relative.clone()))
        })
    }

    /// Contexts of every page in the catalog, in a stable order.
    pub fn pages(&self) -> Vec<TargetContext> {
        let mut pages: Vec<TargetContext> = self
            .files
            .keys()
            .filter(|(_, family, _)| *family == FamilyKind::Page)
            .map(|(module, family, relative)| {
                self.context(module.clone(), *family, relative.clone())
            })
            .collect();
        pages.sort_by(|a, b| a.label().cmp(&b.label()));
        pages
    }

    /// Disk path of a cataloged file.
    pub fn path_of(&self, context: &TargetContext) -> Option<&PathBuf> {
        self.files.get(&(
            context.module.clone(),
            context.family,
            context.relative.clone(),
        ))
    }

    /// Raw contents of a cataloged file.
    pub fn read(&self, context: &TargetContext) -> Option<String> {
        let path = self.path_of(context)?;
        std::fs::read_to_string(path).ok()
    }

    fn context(&self, module: String, family: FamilyKind, relative: String) -> TargetContext {
        TargetContext {
            component: self.component.clone(),
            family,
            module,
            relative,
            version: self.version.clone(),
        }
    }
}

/// Split a path under `modules/` into (module, family, relative).
fn classify(rel: &Path) -> Option<(String, FamilyKind, String)> {
    let mut parts = rel.iter().filter_map(|part| part.to_str());
    let module = parts.next()?.to_string();
    let family = match parts.next()? {
        "examples" => FamilyKind::Example,
        "pages" => FamilyKind::Page,
        "partials" => FamilyKind::Partial,
        _ => return None,
    };
    let relative = parts.collect::<Vec<_>>().join("/");
    if relative.is_empty() {
        return None;
    }
    Some((module, family, relative))
}

/// Parse an include target `[module:][family$]relative`. The module
/// defaults to the including file's module; the family defaults to
/// partials, matching how fragments are usually pulled in.
fn parse_include_target(target: &str, from: &TargetContext) -> Option<(String, FamilyKind, String)> {
    if target.is_empty() || target.chars().any(char::is_whitespace) {
        return None;
    }
    let (module, rest) = match target.split_once(':') {
        Some((module, rest)) => (module.to_string(), rest),
        None => (from.module.clone(), target),
    };
    let (family, relative) = match rest.split_once('$') {
        Some(("example", relative)) => (FamilyKind::Example, relative),
        Some(("page", relative)) => (FamilyKind::Page, relative),
        Some(("partial", relative)) => (FamilyKind::Partial, relative),
        Some(_) => return None,
        None => (FamilyKind::Partial, rest),
    };
    if relative.is_empty() {
        return None;
    }
    Some((module, family, relative.to_string()))
}

impl FileResolver for Catalog {
    fn resolve(&self, target: &str, from: &TargetContext) -> Option<ResolvedTarget> {
        let (module, family, relative) = parse_include_target(target, from)?;
        let path = self.files.get(&(module.clone(), family, relative.clone()))?;
        let contents = std::fs::read_to_string(path).ok()?;
        Some(ResolvedTarget {
            contents,
            context: self.context(module, family, relative),
            path: path.display().to_string(),
        })
    }
}

impl PageResolver for Catalog {
    /// Resolve `[module:]relative` into the pages family. The `.adoc`
    /// extension is optional in the ID.
    fn resolve_page(
        &self,
        page_id: &str,
        from: &TargetContext,
    ) -> Result<Option<ResolvedPage>, InvalidPageId> {
        if page_id.is_empty() || page_id.chars().any(char::is_whitespace) {
            return Err(InvalidPageId(format!("empty or malformed page ID: '{page_id}'")));
        }
        if page_id.contains('$') {
            return Err(InvalidPageId(format!(
                "family segment not allowed in a page ID: '{page_id}'"
            )));
        }

        let (module, relative) = match page_id.split_once(':') {
            Some((module, relative)) => (module.to_string(), relative.to_string()),
            None => (from.module.clone(), page_id.to_string()),
        };
        if relative.is_empty() {
            return Err(InvalidPageId(format!("page ID has no path: '{page_id}'")));
        }
        let relative = if relative.ends_with(".adoc") {
            relative
        } else {
            format!("{relative}.adoc")
        };

        if !self
            .files
            .contains_key(&(module.clone(), FamilyKind::Page, relative.clone()))
        {
            return Ok(None);
        }

        let publish_url = format!(
            "/{}/{}/{module}/{}.html",
            self.component,
            self.version,
            relative.trim_end_matches(".adoc")
        );
        Ok(Some(ResolvedPage {
            context: self.context(module, FamilyKind::Page, relative),
            publish_url: Some(publish_url),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    fn sample_catalog(root: &Path) -> Catalog {
        write(root, "modules/ROOT/pages/index.adoc", "= Index\n");
        write(root, "modules/ROOT/pages/guides/setup.adoc", "== Setup\n");
        write(root, "modules/ROOT/partials/note.adoc", "a note\n");
        write(root, "modules/extra/examples/run.sh", "echo hi\n");
        let config = Config::load(root).expect("config");
        Catalog::scan(root, &config).expect("scan")
    }

    fn root_page(catalog: &Catalog) -> TargetContext {
        catalog
            .pages()
            .into_iter()
            .find(|page| page.relative == "index.adoc")
            .expect("index page")
    }

    #[test]
    fn missing_modules_dir_is_not_a_docs_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(dir.path()).expect("config");
        assert!(matches!(
            Catalog::scan(dir.path(), &config),
            Err(Error::NotADocsRoot { .. })
        ));
    }

    #[test]
    fn scan_indexes_families_and_nested_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let pages = catalog.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].relative, "guides/setup.adoc");
        assert_eq!(pages[1].relative, "index.adoc");
    }

    #[test]
    fn include_target_defaults_to_partials_in_current_module() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let from = root_page(&catalog);
        let resolved = catalog.resolve("note.adoc", &from).expect("resolved");
        assert_eq!(resolved.contents, "a note\n");
        assert_eq!(resolved.context.family, FamilyKind::Partial);
    }

    #[test]
    fn include_target_with_family_and_module_segments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let from = root_page(&catalog);
        let resolved = catalog
            .resolve("extra:example$run.sh", &from)
            .expect("resolved");
        assert_eq!(resolved.context.module, "extra");
        assert_eq!(resolved.context.family, FamilyKind::Example);
        assert!(catalog
            .resolve("page$guides/setup.adoc", &from)
            .is_some_and(|r| r.context.family == FamilyKind::Page));
    }

    #[test]
    fn unknown_include_target_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let from = root_page(&catalog);
        assert!(catalog.resolve("ghost.adoc", &from).is_none());
        assert!(catalog.resolve("bogus$note.adoc", &from).is_none());
    }

    #[test]
    fn page_id_resolves_with_or_without_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let from = root_page(&catalog);
        let page = catalog
            .resolve_page("guides/setup", &from)
            .expect("no syntax error")
            .expect("page");
        assert_eq!(
            page.publish_url.as_deref(),
            Some("/docs/main/ROOT/guides/setup.html")
        );
        assert!(catalog
            .resolve_page("guides/setup.adoc", &from)
            .expect("no syntax error")
            .is_some());
    }

    #[test]
    fn page_id_syntax_errors_are_distinct_from_missing_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let from = root_page(&catalog);
        assert!(catalog.resolve_page("page$index.adoc", &from).is_err());
        assert!(catalog.resolve_page("bad id", &from).is_err());
        assert!(catalog.resolve_page("ghost", &from).expect("well-formed").is_none());
    }

    #[test]
    fn context_for_path_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = sample_catalog(dir.path());
        let context = catalog
            .context_for_path(&dir.path().join("modules/ROOT/pages/index.adoc"))
            .expect("context");
        assert_eq!(context.relative, "index.adoc");
        assert_eq!(context.family, FamilyKind::Page);
    }
}
