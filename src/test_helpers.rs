//! Shared test utilities for the codewalk test suite.
//!
//! Provides fixture setup, small builders for on-disk example trees, and
//! lookup helpers over the assembled [`SiteManifest`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_catalog(tmp.path(), &[("Basics", &["hello", "values"])]);
//! write_step(tmp.path(), "hello", "1", &[("hello.js", "// Hi\nhi();")]);
//!
//! let (manifest, _) = collect(&config, &BracketHighlighter).unwrap();
//! let page = find_page(&manifest, "hello");
//! assert_eq!(page_slugs(&manifest), vec!["hello"]);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::catalog::CatalogEntry;
use crate::highlight::Highlighter;
use crate::render::SiteManifest;
use crate::types::PageContent;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Builders
// =========================================================================

/// A catalog entry whose dir and slug are `slug` and whose title is
/// `slug.to_uppercase()`.
pub fn entry(slug: &str) -> CatalogEntry {
    CatalogEntry {
        dir: slug.to_string(),
        slug: slug.to_string(),
        title: slug.to_uppercase(),
        description: String::new(),
        extra: BTreeMap::new(),
    }
}

/// Write `root/catalog.json` with one category per `(name, slugs)` pair.
///
/// Items are built with [`entry`].
pub fn write_catalog(root: &Path, categories: &[(&str, &[&str])]) {
    let categories: Vec<serde_json::Value> = categories
        .iter()
        .map(|(name, slugs)| {
            let items: Vec<CatalogEntry> = slugs.iter().map(|s| entry(s)).collect();
            serde_json::json!({ "name": name, "items": items })
        })
        .collect();
    let doc = serde_json::json!({ "categories": categories });
    fs::write(
        root.join("catalog.json"),
        serde_json::to_string_pretty(&doc).unwrap(),
    )
    .unwrap();
}

/// Create `root/examples/<example>/<step>/` and write `files` into it.
pub fn write_step(root: &Path, example: &str, step: &str, files: &[(&str, &str)]) {
    let dir = root.join("examples").join(example).join(step);
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

/// Highlighter that makes its inputs visible: `[language|code]`.
pub struct BracketHighlighter;

impl Highlighter for BracketHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        format!("[{language}|{code}]")
    }
}

// =========================================================================
// Manifest lookups (panic with a clear message on miss)
// =========================================================================

/// Find a rendered page by slug. Panics if not found.
pub fn find_page<'a>(manifest: &'a SiteManifest, slug: &str) -> &'a PageContent {
    manifest
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            panic!(
                "page '{slug}' not found; pages: {:?}",
                page_slugs(manifest)
            )
        })
}

/// All page slugs in render order.
pub fn page_slugs(manifest: &SiteManifest) -> Vec<&str> {
    manifest.pages.iter().map(|p| p.slug.as_str()).collect()
}
